//! Build script embedding the git revision for the startup log line

use std::process::Command;

fn main() {
    let rev = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    // Mark builds from a modified working tree
    let dirty = git(&["status", "--porcelain"]).is_some_and(|s| !s.is_empty());
    let git_hash = if dirty { format!("{rev}-dirty") } else { rev };

    println!("cargo:rustc-env=GIT_HASH={git_hash}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
