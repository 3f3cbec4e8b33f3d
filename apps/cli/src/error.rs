//! # CLI Error Type
//!
//! Everything that can stop a `bizdesk` command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read quote.json ── io::Error ─────────┐                                │
//! │  parse JSON ─────── serde_json::Error ─┤                                │
//! │  read config ────── toml::de::Error ───┼──► AppError ──► main()         │
//! │  check config ───── ValidationError ───┘        prints, exits 1         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals anomalies are not errors: they are printed with the report and the
//! command still succeeds.

use std::path::PathBuf;

use bizdesk_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Reading a file failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The quote document is not valid JSON for its shape.
    #[error("Invalid quote document: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file is not valid TOML for its shape.
    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The effective config could not be rendered as TOML.
    #[error("Failed to render config: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// The effective config has values the calculator cannot use.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_the_file() {
        let err = AppError::Read {
            path: PathBuf::from("quote.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "Failed to read quote.json: no such file");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: AppError = ValidationError::MustBePositive {
            field: "thresholds.recompose_tolerance".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: thresholds.recompose_tolerance must be positive"
        );
    }
}
