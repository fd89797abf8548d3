//! Symmetric "may not give to each other" relation over participants.
use crate::types::ParticipantId;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("participant {id} is out of range for {count} participants")]
pub struct OutOfRange {
    pub id: ParticipantId,
    pub count: usize,
}

/// Forbidden pairs stored as one adjacency bitset row per participant.
///
/// Rows are `words` u64s wide; bit `b` of row `a` is set iff `a` and `b` may not be paired. The
/// relation is symmetric and never contains `(a, a)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ForbiddenPairSet {
    count: usize,
    words: usize,
    rows: Vec<u64>,
}

impl ForbiddenPairSet {
    /// No forbidden pairs among `count` participants.
    pub fn empty(count: usize) -> Self {
        let words = count.div_ceil(64);
        Self {
            count,
            words,
            rows: vec![0; count * words],
        }
    }

    /// Every pair of distinct members of the same group is forbidden.
    ///
    /// # Panics
    /// Panics if a group holds an id not below `count`. `Family::new` allocates the ids itself, so
    /// this cannot happen there; use `from_pairs` for ids from untrusted input.
    pub fn from_groups<G: AsRef<[ParticipantId]>>(
        count: usize,
        groups: impl IntoIterator<Item = G>,
    ) -> Self {
        let mut set = Self::empty(count);
        for group in groups {
            let group = group.as_ref();
            for &id in group {
                assert!(id.0 < count, "participant {id} is out of range for {count} participants");
            }
            for (i, &a) in group.iter().enumerate() {
                for &b in &group[i + 1..] {
                    set.insert(a, b);
                }
            }
        }
        set
    }

    /// Build from explicit unordered pairs. Self pairs are ignored.
    pub fn from_pairs(
        count: usize,
        pairs: impl IntoIterator<Item = (ParticipantId, ParticipantId)>,
    ) -> Result<Self, OutOfRange> {
        let mut set = Self::empty(count);
        for (a, b) in pairs {
            set.check(a)?;
            set.check(b)?;
            set.insert(a, b);
        }
        Ok(set)
    }

    fn check(&self, id: ParticipantId) -> Result<(), OutOfRange> {
        if id.0 < self.count {
            Ok(())
        } else {
            Err(OutOfRange {
                id,
                count: self.count,
            })
        }
    }

    fn insert(&mut self, a: ParticipantId, b: ParticipantId) {
        if a == b {
            return;
        }
        self.rows[a.0 * self.words + b.0 / 64] |= 1 << (b.0 % 64);
        self.rows[b.0 * self.words + a.0 / 64] |= 1 << (a.0 % 64);
    }

    fn row(&self, a: ParticipantId) -> &[u64] {
        &self.rows[a.0 * self.words..(a.0 + 1) * self.words]
    }

    /// Number of participants the relation is defined over.
    pub fn participant_count(&self) -> usize {
        self.count
    }

    /// True iff `a` and `b` are distinct and belong together. Out-of-range ids are never forbidden.
    #[inline]
    pub fn is_forbidden(&self, a: ParticipantId, b: ParticipantId) -> bool {
        if a.0 >= self.count || b.0 >= self.count {
            return false;
        }
        (self.rows[a.0 * self.words + b.0 / 64] >> (b.0 % 64)) & 1 == 1
    }

    /// True iff `a` may give to `b`.
    #[inline]
    pub fn is_allowed(&self, a: ParticipantId, b: ParticipantId) -> bool {
        a != b && !self.is_forbidden(a, b)
    }

    /// Number of participants `a` may not be paired with.
    pub fn degree(&self, a: ParticipantId) -> usize {
        self.row(a).iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn neighbours(&self, a: ParticipantId) -> impl Iterator<Item = ParticipantId> + '_ {
        self.row(a).iter().enumerate().flat_map(|(w, &word)| {
            (0..64)
                .filter(move |bit| (word >> bit) & 1 == 1)
                .map(move |bit| ParticipantId(w * 64 + bit))
        })
    }

    /// Each forbidden pair once, as `(smaller, larger)`, in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        (0..self.count).map(ParticipantId).flat_map(move |a| {
            self.neighbours(a)
                .filter(move |&b| a < b)
                .map(move |b| (a, b))
        })
    }

    /// Number of unordered forbidden pairs.
    pub fn pair_count(&self) -> usize {
        self.rows.iter().map(|w| w.count_ones() as usize).sum::<usize>() / 2
    }
}
