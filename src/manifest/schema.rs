//! Makefile YAML schema type definitions

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Root structure of a makefile document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// One rule entry from a makefile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Regex pattern matched against the whole target name
    pub target: String,
    /// Templates for children whose timestamps gate a rebuild
    #[serde(default)]
    pub depends: ListOrString,
    /// Templates for children that only need to exist
    #[serde(default)]
    pub prerequisites: ListOrString,
    /// Whether the target is a task name rather than a file
    #[serde(default)]
    pub phony: bool,
    /// Shell commands run in order when the target is remade
    #[serde(default)]
    pub commands: ListOrString,
}

/// A field that must be a list but also parses from a bare string, so the
/// loader can point out the mistake instead of surfacing a type error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListOrString {
    List(Vec<String>),
    String(String),
}

impl Default for ListOrString {
    fn default() -> Self {
        ListOrString::List(Vec::new())
    }
}

impl ListOrString {
    /// Unwrap the list form; a bare string is a usage error naming the fix.
    pub(crate) fn into_list(self, field: &str) -> Result<Vec<String>, Error> {
        match self {
            ListOrString::List(items) => Ok(items),
            ListOrString::String(text) => Err(Error::MakefileUsage(format!(
                "{field} must be a list, not a string: did you mean [\"{text}\"]?"
            ))),
        }
    }
}
