//! Build script to embed source provenance at compile time.
//!
//! Emits `FAUCET_GIT_REVISION`, `FAUCET_GIT_COMMIT_DATE` and `FAUCET_GIT_DIRTY`
//! when git metadata is available. Nothing is emitted otherwise, so the crate
//! falls back to its "undefined" sentinels.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    if let Some(revision) = git(&["rev-parse", "HEAD"]).filter(|s| !s.is_empty()) {
        println!("cargo:rustc-env=FAUCET_GIT_REVISION={}", revision);

        if let Some(date) = git(&["log", "-1", "--format=%cI"]).filter(|s| !s.is_empty()) {
            println!("cargo:rustc-env=FAUCET_GIT_COMMIT_DATE={}", date);
        }

        let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        println!("cargo:rustc-env=FAUCET_GIT_DIRTY={}", dirty);
    }

    // Rerun if git HEAD changes or a release tag is injected
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=FAUCET_VERSION");
}
