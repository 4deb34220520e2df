//! Per-entity error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while resolving, transforming or writing one asset.
///
/// None of these abort a build: the entity is skipped, its reference is left
/// as it was, and the error is reported under [`AssetError::id`].
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("`{uri}` referenced from {} not found in any root", from.display())]
    Missing { uri: String, from: PathBuf },

    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("minifier rejected {}: {message}", path.display())]
    Minify { path: PathBuf, message: String },

    #[error("module bundler failed on {}: {message}", path.display())]
    Bundle { path: PathBuf, message: String },

    #[error("{} contains the placeholder delimiter", path.display())]
    InvalidSource { path: PathBuf },

    #[error("tag id `{0}` cannot be encoded as a placeholder")]
    InvalidTag(String),

    #[error("target for {} falls outside the output tree", path.display())]
    BadTarget { path: PathBuf },
}

impl AssetError {
    /// Stable identifier used in log lines.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing-asset",
            Self::Read { .. } => "read-failed",
            Self::Write { .. } => "write-failed",
            Self::Minify { .. } => "minify-failed",
            Self::Bundle { .. } => "bundle-failed",
            Self::InvalidSource { .. } => "invalid-source",
            Self::InvalidTag(_) => "invalid-tag",
            Self::BadTarget { .. } => "bad-target",
        }
    }

    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Filesystem failures end the current document's pass.
    pub const fn is_fatal_for_document(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

/// Result type alias for per-entity operations
pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        let missing = AssetError::Missing {
            uri: "./a.css".into(),
            from: PathBuf::from("index.html"),
        };
        assert_eq!(missing.id(), "missing-asset");
        assert!(missing.to_string().contains("./a.css"));

        let write = AssetError::write("out/a.css", io::Error::other("disk full"));
        assert_eq!(write.id(), "write-failed");
        assert!(write.is_fatal_for_document());
        assert!(!missing.is_fatal_for_document());
    }
}
