fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Short commit hash for `--version` on untagged builds; empty outside git
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    println!("cargo:rustc-env=RETROFX_GIT_HASH={hash}");
}
