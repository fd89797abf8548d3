use std::fmt;

/// Index of a participant. Ids are contiguous from zero in the order participants were read.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ParticipantId(pub usize);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display names of participants, indexed by `ParticipantId`.
///
/// The core algorithms never look at names; they only exist for input and output.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Roster(Vec<String>);

impl Roster {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self(names.into_iter().collect())
    }

    /// Add a participant, returning its freshly allocated id.
    pub fn push(&mut self, name: impl Into<String>) -> ParticipantId {
        self.0.push(name.into());
        ParticipantId(self.0.len() - 1)
    }

    pub fn name(&self, id: ParticipantId) -> Option<&str> {
        self.0.get(id.0).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + use<> {
        (0..self.0.len()).map(ParticipantId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, &str)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, name)| (ParticipantId(i), name.as_str()))
    }
}
