//! The helpers a template sees while it renders.
//!
//! Every render gets `filename` (base name of the file being rendered) and
//! three functions bound to the owning pipeline:
//!
//! ```text
//! {{ read(name="snippets/footer.txt") }}
//! {% set data = read_json(name="data/team.json") %}
//! {{ render(path="partials/nav.tera") }}
//! ```
//!
//! Only the wrapper is per render; the caches behind the helpers belong to
//! the pipeline.

use std::collections::HashMap;
use std::path::Path;

use tera::{Context, Function, Tera, Value};

use crate::pipeline::Pipeline;

pub(crate) struct RenderContext {
    pipeline: Pipeline,
    filename: String,
}

impl RenderContext {
    pub(crate) fn new(pipeline: &Pipeline, path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            pipeline: pipeline.clone(),
            filename,
        }
    }

    /// Registers the helper functions on `tera` and returns the variables.
    pub(crate) fn install(self, tera: &mut Tera) -> Context {
        tera.register_function("read", ReadAsset(self.pipeline.clone()));
        tera.register_function("read_json", ReadJsonAsset(self.pipeline.clone()));
        tera.register_function("render", RenderInclude(self.pipeline));

        let mut context = Context::new();
        context.insert("filename", &self.filename);
        context
    }
}

struct ReadAsset(Pipeline);

impl Function for ReadAsset {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = string_arg("read", "name", args)?;
        let text = self
            .0
            .read_asset(name)
            .map_err(|e| tera::Error::chain(format!("read(name={name:?}) failed"), e))?;
        Ok(Value::String(text.to_string()))
    }
}

struct ReadJsonAsset(Pipeline);

impl Function for ReadJsonAsset {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let name = string_arg("read_json", "name", args)?;
        self.0
            .read_json_asset(name)
            .map_err(|e| tera::Error::chain(format!("read_json(name={name:?}) failed"), e))
    }
}

struct RenderInclude(Pipeline);

impl Function for RenderInclude {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = string_arg("render", "path", args)?;
        let html = self
            .0
            .render_include(path)
            .map_err(|e| tera::Error::chain(format!("render(path={path:?}) failed"), e))?;
        Ok(Value::String(html))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

fn string_arg<'a>(
    function: &str,
    key: &str,
    args: &'a HashMap<String, Value>,
) -> tera::Result<&'a str> {
    match args.get(key) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(tera::Error::msg(format!(
            "`{function}`: `{key}` must be a string, got {other}"
        ))),
        None => Err(tera::Error::msg(format!(
            "`{function}` requires a `{key}` argument"
        ))),
    }
}
