//! Stamps the vespa-deploy binary with the commit and time it was built from.
//!
//! Release builds made outside a git checkout pass the commit through
//! `VESPA_DEPLOY_GIT_HASH`.

use std::env;
use std::process::Command;

use chrono::{SecondsFormat, Utc};

const GIT_HASH_OVERRIDE: &str = "VESPA_DEPLOY_GIT_HASH";

fn git_hash() -> Option<String> {
    if let Ok(hash) = env::var(GIT_HASH_OVERRIDE) {
        return Some(hash).filter(|h| !h.trim().is_empty());
    }

    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

fn main() {
    let git_hash = git_hash().unwrap_or_else(|| "unknown".to_string());
    let build_time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-env-changed={}", GIT_HASH_OVERRIDE);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
