pub mod assets;
mod context;
pub mod error;
pub mod export;
pub mod pipeline;
mod server;
pub mod template;

// Re-export main types
pub use assets::{AssetCache, AssetSource, FsSource};
pub use error::{Error, Result};
pub use export::ExportSummary;
pub use pipeline::{DEFAULT_PORT, Pipeline};
pub use template::{OUTPUT_EXTENSION, RenderOptions, TEMPLATE_EXTENSION, has_layout_marker};
