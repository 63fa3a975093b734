use std::path::PathBuf;

/// Failures that abort a pruning run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configured path is missing or unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A class found under a local root could not be read back through the classpath.
    #[error("class {class_name} (from {}) could not be read through the classpath: {reason}", .root.display())]
    Consistency {
        class_name: String,
        root: PathBuf,
        reason: String,
    },

    #[error("could not find any classes to keep in {roots} local classpath root(s). Have you run a build?")]
    EmptyReferenceSet { roots: usize },

    #[error("failed to create exclusion directory {}: {source}", .path.display())]
    ExclusionRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
