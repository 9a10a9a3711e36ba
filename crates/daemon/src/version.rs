use std::fmt;

use serde::Serialize;

/// Build metadata baked in by build.rs
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub build_profile: &'static str,
    pub build_features: &'static str,
    pub version: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
    pub build_target: &'static str,
    pub build_host: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        build_profile: env!("BUILD_PROFILE"),
        build_features: env!("BUILD_FEATURES"),
        version: env!("REPO_VERSION"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        rust_version: env!("RUST_VERSION"),
        build_target: env!("BUILD_TARGET"),
        build_host: env!("BUILD_HOST"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tiletalk {} ({})", env!("CARGO_PKG_VERSION"), self.version)?;
        writeln!(f, "  profile:  {}", self.build_profile)?;
        writeln!(f, "  features: {}", self.build_features)?;
        writeln!(f, "  built:    {}", self.build_timestamp)?;
        writeln!(f, "  rustc:    {}", self.rust_version)?;
        write!(f, "  target:   {} (host {})", self.build_target, self.build_host)
    }
}
