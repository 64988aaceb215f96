mod common;

use renderpipe_core::{Error, Pipeline};

use common::{LAYOUT, site, tree};

#[test]
fn test_export_writes_pages_and_skips_partials() {
    let dir = tree(&[
        ("_layout.tera", LAYOUT),
        (
            "a.tera",
            r#"{% extends "_layout.tera" %}{% block content %}a{% endblock content %}"#,
        ),
        (
            "b.tera",
            r#"{% extends "_layout.tera" %}{% block content %}b{% endblock content %}"#,
        ),
    ]);
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());

    let summary = pipeline.render_static(out.path()).unwrap();

    assert_eq!(
        std::fs::read_to_string(out.path().join("a.html")).unwrap(),
        "<html><body>a</body></html>"
    );
    assert_eq!(
        std::fs::read_to_string(out.path().join("b.html")).unwrap(),
        "<html><body>b</body></html>"
    );
    assert!(!out.path().join("_layout.html").exists());
    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.skipped, vec![dir.path().join("_layout.tera")]);
}

#[test]
fn test_export_mirrors_directories() {
    let dir = site();
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());

    pipeline.render_static(out.path()).unwrap();

    for page in ["index.html", "about.html", "blog/post.html"] {
        assert!(out.path().join(page).is_file(), "missing {page}");
    }
    assert!(!out.path().join("partials/nav.html").exists());
    assert!(!out.path().join("data").exists());

    let post = std::fs::read_to_string(out.path().join("blog/post.html")).unwrap();
    assert!(post.contains("<li>Grace</li>"));
}

#[test]
fn test_export_aborts_on_template_error() {
    let dir = tree(&[
        ("layout.tera", LAYOUT),
        (
            "good.tera",
            r#"{% extends "layout.tera" %}{% block content %}ok{% endblock content %}"#,
        ),
        (
            "bad.tera",
            r#"{% extends "layout.tera" %}{% block content %}{{ undefined_thing }}{% endblock content %}"#,
        ),
    ]);
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());

    let err = pipeline.render_static(out.path()).unwrap_err();

    match err {
        Error::Template { path, .. } => assert_eq!(path, dir.path().join("bad.tera")),
        other => panic!("expected a template error, got {other}"),
    }
    assert!(!out.path().join("bad.html").exists());
}

#[test]
fn test_export_ignores_non_templates() {
    let dir = tree(&[("style.css", "body {}"), ("readme.txt", "hi")]);
    let out = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path());

    let summary = pipeline.render_static(out.path()).unwrap();

    assert!(summary.written.is_empty());
    assert!(summary.skipped.is_empty());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_export_of_missing_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(dir.path().join("absent"));

    let err = pipeline.render_static(dir.path().join("out")).unwrap_err();
    assert!(matches!(err, Error::Walk(_)));
}

#[test]
fn test_export_aborts_when_output_dir_cannot_be_created() {
    let dir = tree(&[
        ("layout.tera", LAYOUT),
        (
            "blog/post.tera",
            r#"{% extends "layout.tera" %}{% block content %}post{% endblock content %}"#,
        ),
        (
            "zz.tera",
            r#"{% extends "layout.tera" %}{% block content %}last{% endblock content %}"#,
        ),
    ]);
    let out = tempfile::tempdir().unwrap();
    std::fs::write(out.path().join("blog"), "not a directory").unwrap();
    let pipeline = Pipeline::new(dir.path());

    let err = pipeline.render_static(out.path()).unwrap_err();

    match err {
        Error::Io { path, .. } => assert_eq!(path, out.path().join("blog")),
        other => panic!("expected an IO error, got {other}"),
    }
    assert!(!out.path().join("zz.html").exists());
}

#[test]
fn test_export_aborts_when_page_cannot_be_written() {
    let dir = tree(&[
        ("layout.tera", LAYOUT),
        (
            "page.tera",
            r#"{% extends "layout.tera" %}{% block content %}page{% endblock content %}"#,
        ),
        (
            "zz.tera",
            r#"{% extends "layout.tera" %}{% block content %}last{% endblock content %}"#,
        ),
    ]);
    let out = tempfile::tempdir().unwrap();
    std::fs::create_dir(out.path().join("page.html")).unwrap();
    let pipeline = Pipeline::new(dir.path());

    let err = pipeline.render_static(out.path()).unwrap_err();

    match err {
        Error::Io { path, .. } => assert_eq!(path, out.path().join("page.html")),
        other => panic!("expected an IO error, got {other}"),
    }
    assert!(!out.path().join("zz.html").exists());
}
