//! Error Taxonomy - Every Failure Is Fatal
//!
//! Nothing here is retried. The first error aborts the build before any
//! output file is created.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which catalog a name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Group,
    Action,
    Match,
    Signal,
    Handler,
    Precondition,
    Condition,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Group => "group",
            CatalogKind::Action => "action",
            CatalogKind::Match => "match",
            CatalogKind::Signal => "signal",
            CatalogKind::Handler => "handler",
            CatalogKind::Precondition => "precondition",
            CatalogKind::Condition => "zone condition",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Missing required input: {0}")]
    MissingRequiredInput(&'static str),

    #[error("Unresolved {kind} reference: {name}")]
    UnresolvedReference { kind: CatalogKind, name: String },

    #[error("Didn't find any fans in zone {zone}")]
    EmptyFanSelection { zone: u64 },

    #[error("Missing fan zone number in {document}")]
    MissingZoneNumber { document: String },

    #[error("No zone_conditions YAML file but zone_conditions used in zone YAML")]
    MissingConditionsDocument,

    #[error("{owner} '{name}' requires parameter '{parameter}' which was not given")]
    MissingParameter {
        owner: &'static str,
        name: String,
        parameter: String,
    },

    #[error("Unknown member field '{field}' requested by {context}")]
    UnknownMemberField { field: String, context: String },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenError {
    pub fn unresolved(kind: CatalogKind, name: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
