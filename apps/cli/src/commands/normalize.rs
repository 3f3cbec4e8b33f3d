//! `bizdesk normalize`: shows how raw catalog percentages are read.

use bizdesk_core::validation::parse_percentage;
use bizdesk_core::Rate;

/// One line per input: `raw → percent (fraction)`, flagging clamps.
pub fn run(values: &[String]) -> String {
    let mut out = String::new();

    for value in values {
        let raw = parse_percentage(value);
        let (rate, clamped) = Rate::normalize(&raw).clamp_for_line();

        out.push_str(&format!("{:<12} → {:<8} ({})", value, rate.to_string(), rate.fraction()));
        if clamped {
            out.push_str("  [clamped: above 100% after normalization]");
        }
        out.push('\n');
    }

    out
}
