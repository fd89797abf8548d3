//! Secret Santa draws: everyone gives to exactly one other family member, never to someone from
//! their own household.
pub mod assignment;
pub mod config;
pub mod family;
pub mod forbidden;
pub mod generate;
pub mod io;
pub mod permutation;
pub mod types;

// fast nogood checks
mod nogood;

pub use assignment::Assignment;
pub use config::GeneratorConfig;
pub use family::{Family, build_constraints};
pub use forbidden::ForbiddenPairSet;
pub use generate::{generate, generate_once, race, solve};
pub use permutation::Permutation;
pub use types::{ParticipantId, Roster};
