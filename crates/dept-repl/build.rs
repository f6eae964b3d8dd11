//! Build script for the `dept` binary.
//!
//! Embeds what `dept --version` reports: the commit the binary was built
//! from, the UTC build date and the target triple. Tarball builds without
//! git report the commit as `unknown`.

use std::path::Path;
use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!hash.is_empty()).then_some(hash)
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    if Path::new("../../.git").exists() {
        println!("cargo::rerun-if-changed=../../.git/HEAD");
    }

    let hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    let date = chrono::Utc::now().format("%Y-%m-%d");
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo::rustc-env=DEPT_GIT_HASH={hash}");
    println!("cargo::rustc-env=DEPT_BUILD_DATE={date}");
    println!("cargo::rustc-env=DEPT_BUILD_TARGET={target}");
}
