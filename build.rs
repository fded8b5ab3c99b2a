use std::process::Command;

fn main() {
    // Capture the source revision so `devops-mirror version` can report it.
    let revision = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_REVISION={}", revision);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
