//! URL naming helpers shared by the entry processors and the navigation builder.
//!
//! ## Encoding
//!
//! Hrefs carry percent-encoded names; titles carry the raw name. A single
//! name is encoded as one URL component, so `/` inside it would be escaped.
//! Relative link text is split on `/` and each segment encoded on its own:
//!
//! - `"my file.txt"` → `"my%20file.txt"`
//! - `"../docs/a b"` → `"../docs/a%20b"`
//!
//! The unreserved set matches what browsers leave alone in a path component:
//! ASCII alphanumerics and `-_.!~*'()`.

use std::path::{Component, Path, PathBuf};

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
        )
}

/// Percent-encode a single URL path component (UTF-8, uppercase hex).
pub fn encode_component(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for &byte in name.as_bytes() {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

/// Encode each `/`-separated segment of `text` independently.
pub fn encode_segments(text: &str) -> String {
    text.split('/')
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Append one already-encoded segment to a URL, with exactly one `/` between.
///
/// A trailing slash on `base` is absorbed, so both `"http://x/"` and
/// `"http://x"` join to `"http://x/seg"`. A root of `"/"` yields `"/seg"`.
pub fn join_url(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment)
}

/// Join an encoded name list onto a base URL.
pub fn join_url_all<'a>(base: &str, segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .fold(base.trim_end_matches('/').to_string(), |acc, seg| {
            join_url(&acc, seg)
        })
}

/// Path of `target` relative to the directory `from`.
///
/// Both paths are expected to be absolute and canonical. Returns `.` when
/// they are the same path.
pub fn relative_path(from: &Path, target: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let target: Vec<Component> = target.components().collect();

    let common = from
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

/// Render a relative path as `/`-separated link text.
pub fn link_text(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
