//! `bizdesk config`: prints the effective configuration.

use crate::config::AppConfig;
use crate::error::AppResult;

/// Renders `config` as TOML, headed by where the default file lives.
pub fn run(config: &AppConfig) -> AppResult<String> {
    let mut out = String::new();

    match AppConfig::default_config_path() {
        Some(path) => out.push_str(&format!("# default file: {}\n", path.display())),
        None => out.push_str("# default file: <no config directory on this platform>\n"),
    }
    out.push_str(&config.to_toml()?);

    Ok(out)
}
