//! # Time Utilities
//!
//! Date formatting for user-facing text.

use chrono::{DateTime, Utc};

/// Format time as `DD/MM/YYYY às HH:MM`, the form used in default conversation titles.
pub fn format_short_date_time(time: DateTime<Utc>) -> String {
    time.format("%d/%m/%Y às %H:%M").to_string()
}
