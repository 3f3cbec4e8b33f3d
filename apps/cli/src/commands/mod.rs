//! # Commands
//!
//! One module per `bizdesk` subcommand. Each returns the text to print so
//! the output can be tested without capturing stdout.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Subcommand      Module          Core entry point                       │
//! │  ──────────      ──────          ────────────────                       │
//! │  totals     ───► totals.rs  ───► TotalsCalculator::compute              │
//! │  normalize  ───► normalize.rs ─► Rate::normalize + clamp_for_line       │
//! │  config     ───► config.rs  ───► AppConfig::to_toml                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod normalize;
pub mod totals;
