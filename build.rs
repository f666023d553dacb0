//! Sets `LINKMIRROR_VERSION` for `--version`: the package version on a
//! tagged release commit, `dev@<short hash>` anywhere else.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    let version = if git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        match git(&["rev-parse", "--short", "HEAD"]) {
            Some(hash) if !hash.is_empty() => format!("dev@{hash}"),
            _ => "dev@unknown".to_string(),
        }
    };
    println!("cargo:rustc-env=LINKMIRROR_VERSION={version}");
}
