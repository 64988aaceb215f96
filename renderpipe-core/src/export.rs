use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::template::{OUTPUT_EXTENSION, is_template};

/// What a static export produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Output files written, in walk order (sorted by file name per directory).
    pub written: Vec<PathBuf>,
    /// Templates skipped because they do not extend a layout.
    pub skipped: Vec<PathBuf>,
}

/// Walks the pipeline root and renders every page to `out`.
///
/// `site/blog/post.tera` lands at `out/blog/post.html`. The output directory
/// for a template is created before it is rendered, so a directory holding
/// only partials still shows up, empty. Any failure other than a missing
/// layout stops the walk and is returned; nothing after it is rendered.
pub(crate) fn export_all(pipeline: &Pipeline, out: &Path) -> Result<ExportSummary> {
    let root = pipeline.root();
    let mut summary = ExportSummary::default();

    tracing::info!(source = %root.display(), output = %out.display(), "exporting");

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_template(entry.path()) {
            continue;
        }

        let source = entry.path();
        let out_path = output_path(root, out, source);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        match pipeline.render_file(source) {
            Ok(html) => {
                std::fs::write(&out_path, html).map_err(|e| Error::io(&out_path, e))?;
                tracing::debug!(page = %out_path.display(), "wrote");
                summary.written.push(out_path);
            }
            Err(Error::NoLayout(partial)) => {
                tracing::debug!(template = %partial.display(), "skipping partial");
                summary.skipped.push(partial);
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        "export finished"
    );
    Ok(summary)
}

/// Mirror of `source` under `out` with the output extension.
fn output_path(root: &Path, out: &Path, source: &Path) -> PathBuf {
    let relative = source.strip_prefix(root).unwrap_or(source);
    out.join(relative).with_extension(OUTPUT_EXTENSION)
}
