//! Serving rendered pages over HTTP.
//!
//! The request renderer is a middleware rather than a route: a request whose
//! path does not name an existing file is handed on to whatever sits behind
//! it, so a pipeline can be stacked in front of other handlers.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::template::{OUTPUT_EXTENSION, TEMPLATE_EXTENSION};

pub(crate) fn layer(pipeline: Pipeline, router: Router) -> Router {
    router
        .layer(middleware::from_fn_with_state(pipeline, render_request))
        .layer(TraceLayer::new_for_http())
}

pub(crate) async fn not_handled() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn render_request(
    State(pipeline): State<Pipeline>,
    request: Request,
    next: Next,
) -> Response {
    let Some(path) = source_path(pipeline.root(), request.uri().path()) else {
        return next.run(request).await;
    };

    let renderer = pipeline.clone();
    let rendered = tokio::task::spawn_blocking(move || renderer.render_file(path)).await;

    match rendered {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(err)) if err.is_not_found() => {
            tracing::debug!("{err}, passing request on");
            next.run(request).await
        }
        Ok(Err(err)) => {
            tracing::error!(uri = %request.uri(), "{err}");
            err.into_response()
        }
        Err(join) => {
            tracing::error!(uri = %request.uri(), "render task failed: {join}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Maps a request path onto a file under `root`, turning a trailing `.html`
/// into the template extension. `None` for paths that cannot name a file
/// under the root.
pub(crate) fn source_path(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(uri_path).ok()?;

    let mut path = root.to_path_buf();
    for component in Path::new(decoded.as_ref()).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return None,
        }
    }

    let html_suffix = format!(".{OUTPUT_EXTENSION}");
    match path.to_str().and_then(|p| p.strip_suffix(&html_suffix)) {
        Some(stem) => Some(PathBuf::from(format!("{stem}.{TEMPLATE_EXTENSION}"))),
        None => Some(path),
    }
}

pub(crate) async fn spawn(addr: SocketAddr, app: Router) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;
    let addr = listener
        .local_addr()
        .map_err(|source| Error::Bind { addr, source })?;

    tracing::info!("Serving at http://{addr}");

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("server error: {e}");
        }
    });

    Ok((addr, task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_maps_to_template() {
        let root = Path::new("site");
        assert_eq!(
            source_path(root, "/blog/post.html"),
            Some(PathBuf::from("site/blog/post.tera"))
        );
    }

    #[test]
    fn test_other_paths_join_as_is() {
        let root = Path::new("site");
        assert_eq!(source_path(root, "/style.css"), Some(PathBuf::from("site/style.css")));
        assert_eq!(source_path(root, "/"), Some(PathBuf::from("site")));
    }

    #[test]
    fn test_path_is_percent_decoded() {
        let root = Path::new("site");
        assert_eq!(
            source_path(root, "/about%20us.html"),
            Some(PathBuf::from("site/about us.tera"))
        );
    }

    #[test]
    fn test_parent_components_are_rejected() {
        let root = Path::new("site");
        assert_eq!(source_path(root, "/../secret.html"), None);
        assert_eq!(source_path(root, "/a/%2e%2e/b.html"), None);
    }
}
