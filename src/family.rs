//! Turn a family, given as a list of households, into forbidden pairs.
use crate::forbidden::ForbiddenPairSet;
use crate::types::{ParticipantId, Roster};

/// A family split into disjoint groups whose members may not give to each other.
#[derive(Clone, PartialEq, Debug)]
pub struct Family {
    pub roster: Roster,
    pub groups: Vec<Vec<ParticipantId>>,
    pub forbidden: ForbiddenPairSet,
}

impl Family {
    pub fn new<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster = Roster::default();
        let groups: Vec<Vec<ParticipantId>> = groups
            .into_iter()
            .map(|group| group.into_iter().map(|name| roster.push(name)).collect())
            .collect();

        let forbidden = ForbiddenPairSet::from_groups(roster.len(), &groups);

        Family {
            roster,
            groups,
            forbidden,
        }
    }

    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }
}

/// Allocate an id for every name, in the order encountered, and forbid every within-group pair.
///
/// Names are not deduplicated: the same name in two groups yields two participants. Empty groups
/// and singleton groups contribute no pairs.
pub fn build_constraints<G, S>(groups: impl IntoIterator<Item = G>) -> (Roster, ForbiddenPairSet)
where
    G: IntoIterator<Item = S>,
    S: Into<String>,
{
    let Family {
        roster, forbidden, ..
    } = Family::new(groups);
    (roster, forbidden)
}
