use std::env;
use std::process::Command;

/// Trimmed stdout of a successful command
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn set_env(key: &str, value: impl AsRef<str>) {
    println!("cargo:rustc-env={}={}", key, value.as_ref());
}

fn enabled_features() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix("CARGO_FEATURE_").map(str::to_lowercase))
        .collect();
    features.sort();

    if features.is_empty() {
        "none".to_string()
    } else {
        features.join(",")
    }
}

/// `git describe` when built from a checkout, the crate version otherwise
fn repository_version() -> String {
    command_output("git", &["describe", "--always", "--dirty", "--tags"])
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let unknown = || "unknown".to_string();

    set_env("BUILD_PROFILE", env::var("PROFILE").unwrap_or_else(|_| unknown()));
    set_env("BUILD_FEATURES", enabled_features());
    set_env("REPO_VERSION", repository_version());
    set_env("BUILD_TIMESTAMP", chrono::Utc::now().to_rfc3339());
    set_env(
        "RUST_VERSION",
        command_output("rustc", &["--version"]).unwrap_or_else(unknown),
    );
    set_env("BUILD_TARGET", env::var("TARGET").unwrap_or_else(|_| unknown()));
    set_env("BUILD_HOST", env::var("HOST").unwrap_or_else(|_| unknown()));
}
