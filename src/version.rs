// Build-time identity from Cargo.toml

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Plain-text banner served at `/`.
pub fn banner() -> String {
    format!("{} {}: load-test results server", NAME, VERSION)
}
