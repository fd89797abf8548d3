//! Family files: `{"family": [["Alice", "Bob"], ["Carol"]]}`.
use super::Error;
use crate::family::Family;

use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FamilyFile {
    pub family: Vec<Vec<String>>,
}

impl FamilyFile {
    pub fn into_family(self) -> Family {
        Family::new(self.family)
    }
}

pub fn from_str(input: &str) -> Result<FamilyFile, Error> {
    Ok(serde_json::from_str(input)?)
}

pub fn to_string(file: &FamilyFile) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(file)?)
}
