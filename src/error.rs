//! Serve pipeline error taxonomy.
//!
//! A read failure on the primary document and a transform failure both abort
//! the render for that request and surface as a structured error response.
//! A read failure on an include file is recoverable: the include is skipped
//! and its tag left untouched.

use thiserror::Error;

/// Error produced while rendering a single request.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The file could not be read (missing or unreadable).
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A minifier rejected its input (parse error in the source text).
    #[error("failed to transform {name}")]
    Transform { name: String },
}

impl ServeError {
    pub fn read(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            name: name.into(),
            source,
        }
    }

    pub fn transform(name: impl Into<String>) -> Self {
        Self::Transform { name: name.into() }
    }
}
