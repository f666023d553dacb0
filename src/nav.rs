//! Navigation metadata for directory index pages.
//!
//! Pure functions: the same inputs always produce the same breadcrumb trail
//! and sibling list, which keeps them safe to call from concurrent walkers.
//!
//! ```text
//! web root  http://x/
//! parents   [home, docs]
//!
//! breadcrumbs
//!   home → http://x/home/index.html       (base http://x/home)
//!   docs → http://x/home/docs/index.html  (base http://x/home/docs)
//! ```

use crate::naming::{encode_component, join_url, join_url_all};
use crate::types::{BROKEN_HREF, Breadcrumb, NavRef};

/// Web URL of the directory holding `parents`' last element's children.
///
/// For `parents = [home, docs]` this is `<web_root>/home/docs`.
pub fn web_context(web_root: &str, parents: &[String]) -> String {
    let encoded: Vec<String> = parents.iter().map(|p| encode_component(p)).collect();
    join_url_all(web_root, encoded.iter().map(String::as_str))
}

/// Breadcrumb trail for a directory whose ancestors are `parents`.
///
/// One breadcrumb per ancestor, root first. Each base extends the previous
/// one by the next encoded name; titles keep the raw names.
pub fn breadcrumbs(web_root: &str, parents: &[String], index_name: &str) -> Vec<Breadcrumb> {
    let mut trail: Vec<Breadcrumb> = Vec::with_capacity(parents.len());
    for name in parents {
        let prev_base = trail
            .last()
            .map(|b| b.base.as_str())
            .unwrap_or(web_root);
        let base = join_url(prev_base, &encode_component(name));
        trail.push(Breadcrumb {
            href: join_url(&base, index_name),
            base,
            title: name.clone(),
        });
    }
    trail
}

/// Sibling navigation for the level containing `current`.
///
/// Order follows `siblings` exactly. The entry equal to `current` is the
/// active one and links nowhere.
pub fn nav_refs(
    web_context: &str,
    current: &str,
    siblings: &[String],
    index_name: &str,
) -> Vec<NavRef> {
    siblings
        .iter()
        .map(|name| {
            if name == current {
                NavRef {
                    href: BROKEN_HREF.to_string(),
                    title: name.clone(),
                    active: true,
                }
            } else {
                let dir = join_url(web_context, &encode_component(name));
                NavRef {
                    href: join_url(&dir, index_name),
                    title: name.clone(),
                    active: false,
                }
            }
        })
        .collect()
}
