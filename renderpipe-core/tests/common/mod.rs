#![allow(dead_code)]

use std::path::Path;

use tempfile::TempDir;

pub const LAYOUT: &str =
    "<html><body>{% block content %}{% endblock content %}</body></html>";

/// Writes `files` (path relative to the tree, contents) into a fresh temp dir.
pub fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        write(dir.path(), path, contents);
    }
    dir
}

pub fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// A small site: two pages, a nested page, a partial, a layout and assets.
pub fn site() -> TempDir {
    tree(&[
        ("layout.tera", LAYOUT),
        (
            "index.tera",
            r#"{% extends "layout.tera" %}
{% block content %}<h1>Home</h1>{{ render(path="partials/nav.tera") }}{% endblock content %}"#,
        ),
        (
            "about.tera",
            r#"{% extends "layout.tera" %}
{% block content %}<p>{{ read(name="data/about.txt") }}</p>{% endblock content %}"#,
        ),
        (
            "blog/post.tera",
            r#"{% extends "layout.tera" %}
{% block content %}{% set team = read_json(name="data/team.json") %}{% for member in team %}<li>{{ member.name }}</li>{% endfor %}{% endblock content %}"#,
        ),
        ("partials/nav.tera", "<nav>{{ filename }}</nav>"),
        ("data/about.txt", "About us"),
        ("data/team.json", r#"[{"name": "Ada"}, {"name": "Grace"}]"#),
    ])
}
