//! Custom Askama template filters and the formatting helpers views share.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Returns the static asset version computed at build time.
///
/// Usage in templates: `{{ ""|asset_version }}`
#[askama::filter_fn]
pub fn asset_version(
    _value: impl Display,
    _env: &dyn askama::Values,
) -> askama::Result<&'static str> {
    Ok(env!("ASSET_VERSION"))
}

/// Formats a timestamp as `dd.mm.yyyy hh:mm` (UTC); a missing one renders
/// as a dash.
pub(crate) fn format_datetime(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || "—".to_string(),
        |dt| dt.format("%d.%m.%Y %H:%M").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_datetime() {
        let dt = DateTime::from_timestamp(1_735_700_000, 0).expect("valid timestamp");
        assert_eq!(format_datetime(Some(dt)), "01.01.2025 02:53");
        assert_eq!(format_datetime(None), "—");
    }
}
