use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::assets::{AssetCache, AssetSource, FsSource};
use crate::error::Result;
use crate::export::{self, ExportSummary};
use crate::server;
use crate::template::{self, RenderOptions};

/// Port used by [`Pipeline::listen`] when none is given.
pub const DEFAULT_PORT: u16 = 3000;

/// A render pipeline bound to one source directory.
///
/// Cloning is cheap and every clone shares the same caches and listener, so
/// several roots can live side by side in one process without interfering.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

struct Inner {
    root: PathBuf,
    assets: AssetCache,
    listener: Mutex<Option<Listener>>,
}

struct Listener {
    addr: SocketAddr,
    _task: JoinHandle<()>,
}

impl Pipeline {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_source(root, Arc::new(FsSource))
    }

    /// Like [`Pipeline::new`], with assets read through `source`.
    pub fn with_source<P: AsRef<Path>>(root: P, source: Arc<dyn AssetSource>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            inner: Arc::new(Inner {
                assets: AssetCache::new(&root, source),
                root,
                listener: Mutex::new(None),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn assets(&self) -> &AssetCache {
        &self.inner.assets
    }

    pub fn read_asset(&self, name: &str) -> Result<Arc<str>> {
        self.inner.assets.read(name)
    }

    pub fn read_json_asset(&self, name: &str) -> Result<Value> {
        self.inner.assets.read_json(name)
    }

    pub fn flush_cache(&self) {
        self.inner.assets.flush();
    }

    /// Renders the page at `path`. Fails with [`crate::Error::NoLayout`] for
    /// templates that do not extend a layout.
    pub fn render_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        template::render_template(self, path.as_ref(), true, RenderOptions::default())
    }

    /// Renders any template under the root, page or partial, pretty-printed.
    ///
    /// A template that includes itself, directly or through others, recurses
    /// until the stack runs out.
    pub fn render_include<P: AsRef<Path>>(&self, relative: P) -> Result<String> {
        let path = self.inner.root.join(relative);
        template::render_template(self, &path, false, RenderOptions::pretty())
    }

    /// Renders every page under the root into a mirrored tree under `out`.
    pub fn render_static<P: AsRef<Path>>(&self, out: P) -> Result<ExportSummary> {
        export::export_all(self, out.as_ref())
    }

    /// The request renderer in front of a router that answers 404.
    pub fn router(&self) -> Router {
        self.layer(Router::new().fallback(server::not_handled))
    }

    /// Puts the request renderer in front of `router`; requests that do not
    /// map to an existing file reach `router` untouched.
    pub fn layer(&self, router: Router) -> Router {
        server::layer(self.clone(), router)
    }

    /// Serves on `0.0.0.0:port`. See [`Pipeline::listen_on`].
    pub async fn listen(&self, port: Option<u16>) -> Result<SocketAddr> {
        let port = port.unwrap_or(DEFAULT_PORT);
        self.listen_on(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
            .await
    }

    /// Starts serving [`Pipeline::router`] on `addr` in a background task and
    /// returns the bound address. Once listening, further calls return the
    /// existing address and bind nothing.
    pub async fn listen_on(&self, addr: SocketAddr) -> Result<SocketAddr> {
        let mut listener = self.inner.listener.lock().await;
        if let Some(existing) = listener.as_ref() {
            return Ok(existing.addr);
        }

        let (addr, task) = server::spawn(addr, self.router()).await?;
        *listener = Some(Listener { addr, _task: task });
        Ok(addr)
    }

    /// Address of the running listener, if any.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.listener.lock().await.as_ref().map(|l| l.addr)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.inner.root)
            .field("assets", &self.inner.assets)
            .finish_non_exhaustive()
    }
}
