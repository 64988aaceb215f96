use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tera::Tera;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;

/// Extension of source templates.
pub const TEMPLATE_EXTENSION: &str = "tera";
/// Extension given to rendered pages.
pub const OUTPUT_EXTENSION: &str = "html";

// The `extends` directive opening a line, bare or inside a `{%`/`{%-` tag.
static LAYOUT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:\{%-?[ \t]*)?extends").unwrap());

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\{%-?\s*(?:extends|include|import)\s+)["'`]([^"'`]+)["'`]"#).unwrap()
});

// Comments and raw blocks; tera never resolves references inside them.
static VERBATIM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{#.*?#\}|\{%-?\s*raw\s*-?%\}.*?\{%-?\s*endraw\s*-?%\}").unwrap()
});

/// Options handed through to the engine for one render.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Drop the whitespace-only lines that block tags leave in the output.
    pub pretty: bool,
}

impl RenderOptions {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

pub fn is_template(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == TEMPLATE_EXTENSION)
        .unwrap_or(false)
}

/// Whether `source` is a page, i.e. some line starts with `extends`.
pub fn has_layout_marker(source: &str) -> bool {
    LAYOUT_MARKER.is_match(source)
}

/// Renders the template at `path`.
///
/// Checks run in a fixed order: existence, extension, read, layout marker
/// (only when `require_layout`), then compile and evaluate. The file itself is
/// read straight from disk, never through the asset cache.
pub(crate) fn render_template(
    pipeline: &Pipeline,
    path: &Path,
    require_layout: bool,
    options: RenderOptions,
) -> Result<String> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    if !is_template(path) {
        return Err(Error::WrongExtension(path.to_path_buf()));
    }

    let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    if require_layout && !has_layout_marker(&source) {
        return Err(Error::NoLayout(path.to_path_buf()));
    }

    let (mut tera, name) = compile(pipeline.root(), path, source)?;
    let context = RenderContext::new(pipeline, path).install(&mut tera);

    tracing::debug!(template = %path.display(), "rendering");
    let rendered = tera
        .render(&name, &context)
        .map_err(|source| Error::Template {
            path: path.to_path_buf(),
            source,
        })?;

    if options.pretty {
        Ok(prettify(&rendered))
    } else {
        Ok(rendered)
    }
}

/// Builds a `Tera` holding the template at `path` plus everything it
/// transitively extends, includes or imports. Returns it with the name the
/// page was registered under.
///
/// Every file is registered under its root-relative name and references are
/// rewritten to that name, so two templates using the same reference can
/// still reach different files.
fn compile(root: &Path, path: &Path, source: String) -> Result<(Tera, String)> {
    let name = template_name(root, path);

    let mut queued = HashSet::from([path.to_path_buf()]);
    let mut pending = vec![(name.clone(), path.to_path_buf(), source)];
    let mut templates = Vec::new();

    while let Some((file_name, file, text)) = pending.pop() {
        let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut targets = Vec::new();
        // Left unresolved, tera reports the missing template itself.
        let text = rewrite_references(&text, |reference| {
            let target = resolve_reference(root, &dir, reference)?;
            let target_name = template_name(root, &target);
            targets.push((target_name.clone(), target));
            Some(target_name)
        });

        for (target_name, target) in targets {
            if !queued.insert(target.clone()) {
                continue;
            }
            let text = std::fs::read_to_string(&target).map_err(|e| Error::Template {
                path: path.to_path_buf(),
                source: tera::Error::chain(format!("failed to read {}", target.display()), e),
            })?;
            pending.push((target_name, target, text));
        }

        templates.push((file_name, text));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates)
        .map_err(|source| Error::Template {
            path: path.to_path_buf(),
            source,
        })?;

    Ok((tera, name))
}

/// Replaces every `extends`/`include`/`import` name outside comments and raw
/// blocks with what `rename` returns, keeping names it returns `None` for.
fn rewrite_references<F>(source: &str, mut rename: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for verbatim in VERBATIM.find_iter(source) {
        out.push_str(&rewrite_span(&source[last..verbatim.start()], &mut rename));
        out.push_str(verbatim.as_str());
        last = verbatim.end();
    }
    out.push_str(&rewrite_span(&source[last..], &mut rename));
    out
}

fn rewrite_span<F>(span: &str, rename: &mut F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    REFERENCE
        .replace_all(span, |caps: &regex::Captures| match rename(&caps[2]) {
            Some(name) => format!("{}\"{}\"", &caps[1], name),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Looks a referenced template name up next to the referencing file first,
/// then under the root.
fn resolve_reference(root: &Path, dir: &Path, reference: &str) -> Option<PathBuf> {
    [dir.join(reference), root.join(reference)]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

fn template_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn prettify(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len());
    for line in rendered.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    if !rendered.ends_with('\n') {
        out.pop();
    }
    out
}
