//! Index page rendering.
//!
//! Turns a directory's [`IndexLocals`] into HTML. Rendering is a pure
//! function of the locals; writing the result is the walker's job.
//!
//! ## Templates
//!
//! - [`IndexTemplate::TopLevel`]: the tree root. No breadcrumb row.
//! - [`IndexTemplate::Subtree`]: every other directory. Breadcrumb row with
//!   the site root, each ancestor, then the current directory.
//!
//! ## Page Layout
//!
//! ```text
//! header   site name · breadcrumbs
//! nav      sibling directories (current one marked active)
//! main     one list item per entry, classed by kind
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolated names are escaped automatically.

use crate::types::{Breadcrumb, NavRef, WebRef};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Which index layout to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTemplate {
    /// The tree root: no breadcrumbs.
    TopLevel,
    /// Any directory below the root.
    Subtree,
}

/// Site-wide options shared by every index page.
#[derive(Debug, Clone, Serialize)]
pub struct SiteOptions {
    pub site_name: String,
    pub web_root: String,
    pub index_name: String,
    /// Hrefs of staged stylesheets, linked from every page.
    pub stylesheets: Vec<String>,
    /// Hrefs of staged scripts, loaded deferred on every page.
    pub scripts: Vec<String>,
}

/// Everything one index page is rendered from.
#[derive(Debug, Clone, Serialize)]
pub struct IndexLocals<'a> {
    pub dir_name: &'a str,
    pub breadcrumbs: &'a [Breadcrumb],
    pub nav_refs: &'a [NavRef],
    pub dir_refs: &'a [WebRef],
    pub site: &'a SiteOptions,
}

/// Render a directory index with the given template.
pub fn render_index(template: IndexTemplate, locals: &IndexLocals) -> Markup {
    let title = format!("{} - {}", locals.dir_name, locals.site.site_name);

    let breadcrumb = match template {
        IndexTemplate::TopLevel => None,
        IndexTemplate::Subtree => Some(render_breadcrumbs(locals)),
    };

    let content = html! {
        header.site-header {
            span.site-name { (locals.site.site_name) }
            @if let Some(trail) = breadcrumb {
                nav.breadcrumb { (trail) }
            }
        }
        @if !locals.nav_refs.is_empty() {
            (render_nav(locals.nav_refs))
        }
        main.index-page {
            h1 { (locals.dir_name) }
            (render_entries(locals.dir_refs))
        }
    };

    base_document(&title, locals.site, content)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, site: &SiteOptions, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS_STATIC)) }
                @for href in &site.stylesheets {
                    link rel="stylesheet" href=(href);
                }
                @for src in &site.scripts {
                    script src=(src) defer {}
                }
            }
            body {
                (content)
            }
        }
    }
}

/// Breadcrumb row: site root, each ancestor, then the current name unlinked.
fn render_breadcrumbs(locals: &IndexLocals) -> Markup {
    let root_href = crate::naming::join_url(&locals.site.web_root, &locals.site.index_name);
    html! {
        a href=(root_href) { "/" }
        @for crumb in locals.breadcrumbs {
            " › "
            a href=(crumb.href) { (crumb.title) }
        }
        " › "
        span.current { (locals.dir_name) }
    }
}

/// Sibling directories at the current level.
fn render_nav(nav_refs: &[NavRef]) -> Markup {
    html! {
        nav.siblings {
            ul {
                @for nav in nav_refs {
                    li class=[nav.active.then_some("active")] {
                        @if nav.active {
                            span { (nav.title) }
                        } @else {
                            a href=(nav.href) { (nav.title) }
                        }
                    }
                }
            }
        }
    }
}

/// Entry list; broken entries keep their slot but are marked.
fn render_entries(dir_refs: &[WebRef]) -> Markup {
    html! {
        ul.entries {
            @for entry in dir_refs {
                li class=(entry_class(entry)) {
                    a href=(entry.href) { (entry.title) }
                }
            }
        }
    }
}

fn entry_class(entry: &WebRef) -> String {
    if entry.is_broken() {
        format!("{} broken", entry.kind.css_class())
    } else {
        entry.kind.css_class().to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WebRefKind;

    fn site() -> SiteOptions {
        SiteOptions {
            site_name: "Mirror".to_string(),
            web_root: "http://x/".to_string(),
            index_name: "index.html".to_string(),
            stylesheets: vec![],
            scripts: vec![],
        }
    }

    fn crumbs() -> Vec<Breadcrumb> {
        vec![Breadcrumb {
            base: "http://x/home".to_string(),
            href: "http://x/home/index.html".to_string(),
            title: "home".to_string(),
        }]
    }

    fn refs() -> Vec<WebRef> {
        vec![
            WebRef::new(WebRefKind::Dir, "http://x/home/sub/index.html", "sub"),
            WebRef::new(WebRefKind::File, "http://x/home/a.txt", "a.txt"),
            WebRef::broken(WebRefKind::Link, "bad"),
        ]
    }

    #[test]
    fn top_level_has_no_breadcrumb_row() {
        let site = site();
        let dir_refs = refs();
        let locals = IndexLocals {
            dir_name: "home",
            breadcrumbs: &[],
            nav_refs: &[],
            dir_refs: &dir_refs,
            site: &site,
        };
        let html = render_index(IndexTemplate::TopLevel, &locals).into_string();
        assert!(!html.contains(r#"<nav class="breadcrumb">"#));
        assert!(html.contains("<title>home - Mirror</title>"));
    }

    #[test]
    fn subtree_renders_breadcrumbs() {
        let site = site();
        let crumbs = crumbs();
        let locals = IndexLocals {
            dir_name: "sub",
            breadcrumbs: &crumbs,
            nav_refs: &[],
            dir_refs: &[],
            site: &site,
        };
        let html = render_index(IndexTemplate::Subtree, &locals).into_string();
        assert!(html.contains(r#"<nav class="breadcrumb">"#));
        assert!(html.contains(r#"href="http://x/index.html""#));
        assert!(html.contains(r#"href="http://x/home/index.html""#));
        assert!(html.contains(r#"<span class="current">sub</span>"#));
    }

    #[test]
    fn entries_classed_by_kind() {
        let site = site();
        let dir_refs = refs();
        let locals = IndexLocals {
            dir_name: "home",
            breadcrumbs: &[],
            nav_refs: &[],
            dir_refs: &dir_refs,
            site: &site,
        };
        let html = render_index(IndexTemplate::TopLevel, &locals).into_string();
        assert!(html.contains(r#"class="entry-dir""#));
        assert!(html.contains(r#"class="entry-file""#));
        assert!(html.contains(r#"class="entry-link broken""#));
        assert!(html.contains("BROKEN bad"));
        // Order follows dir_refs
        let sub = html.find(">sub<").unwrap();
        let file = html.find(">a.txt<").unwrap();
        assert!(sub < file);
    }

    #[test]
    fn nav_marks_active_sibling() {
        let site = site();
        let nav = vec![
            NavRef {
                href: "http://x/home/a/index.html".to_string(),
                title: "a".to_string(),
                active: false,
            },
            NavRef {
                href: "#".to_string(),
                title: "b".to_string(),
                active: true,
            },
        ];
        let locals = IndexLocals {
            dir_name: "b",
            breadcrumbs: &[],
            nav_refs: &nav,
            dir_refs: &[],
            site: &site,
        };
        let html = render_index(IndexTemplate::Subtree, &locals).into_string();
        assert!(html.contains(r#"<li class="active"><span>b</span></li>"#));
        assert!(html.contains(r#"href="http://x/home/a/index.html""#));
    }

    #[test]
    fn staged_assets_are_referenced() {
        let mut site = site();
        site.stylesheets = vec!["http://x/theme.css".to_string()];
        site.scripts = vec!["http://x/app.js".to_string()];
        let locals = IndexLocals {
            dir_name: "home",
            breadcrumbs: &[],
            nav_refs: &[],
            dir_refs: &[],
            site: &site,
        };
        let html = render_index(IndexTemplate::TopLevel, &locals).into_string();
        assert!(html.contains(r#"<link rel="stylesheet" href="http://x/theme.css">"#));
        assert!(html.contains(r#"src="http://x/app.js""#));
    }

    #[test]
    fn names_are_escaped() {
        let site = site();
        let dir_refs = vec![WebRef::new(
            WebRefKind::File,
            "http://x/home/%3Cb%3E",
            "<script>alert('xss')</script>",
        )];
        let locals = IndexLocals {
            dir_name: "home",
            breadcrumbs: &[],
            nav_refs: &[],
            dir_refs: &dir_refs,
            site: &site,
        };
        let html = render_index(IndexTemplate::TopLevel, &locals).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn locals_serialize_for_external_templates() {
        let site = site();
        let crumbs = crumbs();
        let dir_refs = refs();
        let locals = IndexLocals {
            dir_name: "sub",
            breadcrumbs: &crumbs,
            nav_refs: &[],
            dir_refs: &dir_refs,
            site: &site,
        };
        let value = serde_json::to_value(&locals).unwrap();
        assert_eq!(value["dir_name"], "sub");
        assert_eq!(value["breadcrumbs"][0]["href"], "http://x/home/index.html");
        assert_eq!(value["dir_refs"][0]["kind"], "dir");
        assert_eq!(value["dir_refs"][2]["href"], "#");
        assert_eq!(value["site"]["index_name"], "index.html");
    }
}
