//! Error types for the screenshot tool

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for screenshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, resolving, or rendering
#[derive(Error, Debug)]
pub enum Error {
    /// Bad, missing, or unknown command-line argument
    #[error("{0}")]
    Usage(String),

    /// The input HTML file does not exist
    #[error("Input HTML file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The output extension does not map to a supported image format
    #[error("Unsupported output extension: {0}. Use .png, .jpg, or .jpeg.")]
    UnsupportedExtension(String),

    /// The output path escapes the project root
    #[error("Output path must be inside this repository. Received: {}", .0.display())]
    OutsideRoot(PathBuf),

    /// File-system failure on a specific path
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to launch the browser or open a page
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Failed to navigate to the page
    #[error("Failed to load page: {0}")]
    Load(String),

    /// Failed to capture the page
    #[error("Capture failed: {0}")]
    Render(String),

    /// Failed to evaluate a page script
    #[error("Script execution failed: {0}")]
    Script(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// The browser worker exited before answering
    #[error("Browser session closed unexpectedly")]
    Disconnected,

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    Cdp(String),
}

impl Error {
    pub fn usage(msg: impl Into<String>) -> Self {
        Error::Usage(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Cdp(err.to_string())
    }
}
