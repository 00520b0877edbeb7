//! Build errors

use thiserror::Error;

/// Errors raised by rule registration, graph construction, or a build run.
#[derive(Debug, Error)]
pub enum Error {
    /// No rule matched the name and no file with that name exists on disk.
    #[error("No rule for target: '{0}'")]
    MissingTarget(String),

    /// More than one registered rule fully resolved the same target name.
    #[error("Multiple matching definitions for target: '{0}'")]
    DuplicateTarget(String),

    /// A dependency chain reached back into its own ancestry.
    #[error("A circular dependency is formed: target '{target}' depends on ancestor '{ancestor}'")]
    CircularDependency { target: String, ancestor: String },

    /// A rule that is not phony ran its recipe without producing the target file.
    #[error("Rule for target '{0}' did not produce the expected file, consider declaring it phony")]
    PhonyUsage(String),

    /// Malformed rule registration, makefile, or run parameters.
    #[error("{0}")]
    MakefileUsage(String),

    /// A recipe returned a non-build error or panicked.
    #[error("Recipe for target '{0}' failed")]
    RecipeFailed(String),
}
