use std::path::{Path, PathBuf};

/// Errors raised while loading, rendering or building the site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front matter in {}: {message}", .path.display())]
    FrontMatter { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("failed to serialize route index: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SiteError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;
