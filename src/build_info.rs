//! Build information captured at compile time.

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit hash (7 chars).
pub const BUILD_HASH: &str = env!("BUILD_HASH");

/// Whether the build was from a dirty working directory (as string).
const BUILD_DIRTY_STR: &str = env!("BUILD_DIRTY");

/// Full version string including hash and dirty indicator, as shown by
/// `--version`.
///
/// Format: `0.1.0 (abc1234)` or `0.1.0 (abc1234*)` if dirty.
pub const FULL_VERSION: &str = env!("BUILD_VERSION");

/// Whether the build came from a working tree with uncommitted changes.
#[must_use]
pub fn is_dirty() -> bool {
    BUILD_DIRTY_STR == "true"
}

/// `User-Agent` sent with every request to the daemon.
///
/// Format: `mcpd-sdk/0.1.0 (abc1234)`.
#[must_use]
pub fn user_agent() -> String {
    format!("{}/{FULL_VERSION}", env!("CARGO_PKG_NAME"))
}
