/// Family files as nested lists of names
pub mod json;

/// Forbidden-pair graphs in GML, for reuse across runs
pub mod gml;

/// Console output of an assignment
pub mod render;

use crate::family::Family;
use crate::forbidden::{ForbiddenPairSet, OutOfRange};
use crate::types::Roster;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid family file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GML syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("GML document has no graph")]
    MissingGraph,
    #[error("GML {block} is missing its {attribute}")]
    MissingAttribute {
        block: &'static str,
        attribute: &'static str,
    },
    #[error("GML node id {0} appears more than once")]
    DuplicateNode(i64),
    #[error("GML edge refers to unknown node {0}")]
    UnknownNode(i64),
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
    #[error("unsupported input {0:?}: expected a .json or .gml file")]
    UnsupportedExtension(PathBuf),
}

/// Participant names with the pairs that may not give to each other.
#[derive(Clone, PartialEq, Debug)]
pub struct FamilyGraph {
    pub roster: Roster,
    pub forbidden: ForbiddenPairSet,
}

impl FamilyGraph {
    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }
}

impl From<Family> for FamilyGraph {
    fn from(family: Family) -> Self {
        FamilyGraph {
            roster: family.roster,
            forbidden: family.forbidden,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Format {
    Json,
    Gml,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Format, Error> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("gml") => Ok(Format::Gml),
            _ => Err(Error::UnsupportedExtension(path.to_path_buf())),
        }
    }
}

pub fn read_family(path: &Path) -> Result<Family, Error> {
    let text = fs::read_to_string(path)?;
    let family = json::from_str(&text)?.into_family();
    info!(path = %path.display(), participants = family.participant_count(), "read family");
    Ok(family)
}

pub fn read_graph(path: &Path) -> Result<FamilyGraph, Error> {
    let text = fs::read_to_string(path)?;
    let graph = gml::from_str(&text)?;
    info!(path = %path.display(), participants = graph.participant_count(), "read graph");
    Ok(graph)
}

pub fn write_graph(path: &Path, graph: &FamilyGraph) -> Result<(), Error> {
    fs::write(path, gml::to_string(graph))?;
    info!(path = %path.display(), "wrote graph");
    Ok(())
}

/// Where the graph built from `input` is saved: `<output_dir>/<input stem>.gml`.
pub fn graph_path(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".gml");
    output_dir.join(name)
}
