use crate::forbidden::ForbiddenPairSet;
use crate::permutation::Permutation;
use crate::types::ParticipantId;

use thiserror::Error;

/// Reasons an `Assignment` does not fit a `ForbiddenPairSet`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("assignment covers {assignment} participants but the forbidden pairs cover {forbidden}")]
    SizeMismatch { assignment: usize, forbidden: usize },
    #[error("participant {0} gives to themselves")]
    SelfLoop(ParticipantId),
    #[error("participant {0} gives to {1}, who is in the same group")]
    ForbiddenEdge(ParticipantId, ParticipantId),
}

/// Who gives to whom. Always a permutation: every participant gives exactly once and receives
/// exactly once.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assignment {
    gives_to: Permutation,
    receives_from: Permutation,
}

impl Assignment {
    /// `None` unless `gives_to` is a permutation of the participant ids.
    pub fn new(gives_to: impl IntoIterator<Item = ParticipantId>) -> Option<Self> {
        let gives_to = Permutation::new(gives_to.into_iter().map(|p| p.0))?;
        let receives_from = gives_to.inverse();
        Some(Assignment {
            gives_to,
            receives_from,
        })
    }

    pub fn len(&self) -> usize {
        self.gives_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gives_to.is_empty()
    }

    pub fn gives_to(&self, giver: ParticipantId) -> Option<ParticipantId> {
        self.gives_to.get(giver.0).copied().map(ParticipantId)
    }

    pub fn receives_from(&self, receiver: ParticipantId) -> Option<ParticipantId> {
        self.receives_from.get(receiver.0).copied().map(ParticipantId)
    }

    /// `(giver, receiver)` for every participant, in giver order.
    pub fn edges(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.gives_to
            .iter()
            .enumerate()
            .map(|(giver, &receiver)| (ParticipantId(giver), ParticipantId(receiver)))
    }

    /// Gift cycles, each starting at its smallest participant id.
    pub fn cycles(&self) -> Vec<Vec<ParticipantId>> {
        self.gives_to
            .cycles()
            .into_iter()
            .map(|cycle| cycle.into_iter().map(ParticipantId).collect())
            .collect()
    }

    /// Check there are no self gifts and no gifts within a group.
    pub fn validate(&self, forbidden: &ForbiddenPairSet) -> Result<(), Violation> {
        if self.len() != forbidden.participant_count() {
            return Err(Violation::SizeMismatch {
                assignment: self.len(),
                forbidden: forbidden.participant_count(),
            });
        }

        if let Some(p) = self.gives_to.fixed_points().next() {
            return Err(Violation::SelfLoop(ParticipantId(p)));
        }

        for (giver, receiver) in self.edges() {
            if forbidden.is_forbidden(giver, receiver) {
                return Err(Violation::ForbiddenEdge(giver, receiver));
            }
        }

        Ok(())
    }
}
