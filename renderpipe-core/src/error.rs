use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    #[error("{} does not look like a template file", .0.display())]
    WrongExtension(PathBuf),

    #[error("{} does not extend a layout", .0.display())]
    NoLayout(PathBuf),

    #[error("failed to render {}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("IO error on `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{name}` is not valid JSON")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk source tree")]
    Walk(#[from] walkdir::Error),

    #[error("failed to listen on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the outcome the request renderer treats as "not handled here".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// This error and its causes on one line, outermost first.
    ///
    /// tera keeps the useful part of a failure (missing variable, helper
    /// error) in the source chain, so the top message alone is rarely enough.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.report()).into_response()
    }
}
