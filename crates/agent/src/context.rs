//! Calendar grounding for relative-date phrases.
//!
//! The decision service sees user text like "log my rent for last Tuesday"
//! with no clock of its own, so every utterance is prefixed with a
//! machine-readable anchor block: today's date and the most recent
//! occurrence of each weekday. The markers and labels here are a contract
//! with the system prompt — the model is told to resolve relative dates
//! against this block.

use chrono::{DateTime, Datelike, Days, Utc};

const DATE_CONTEXT_OPEN: &str = "<date-context>";
const DATE_CONTEXT_CLOSE: &str = "</date-context>";

/// Weekday names in the fixed Sunday → Saturday order of the block.
const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Build the calendar-anchor block for the given instant.
///
/// Pure and deterministic: the reference instant is an explicit parameter,
/// never read from a global clock. For each weekday the block shows the
/// most recent date on or before `now` falling on that weekday; today's
/// own weekday maps to today.
pub fn build_date_context(now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    let today_index = today.weekday().num_days_from_sunday();

    let mut block = String::new();
    block.push_str(DATE_CONTEXT_OPEN);
    block.push('\n');
    block.push_str(&format!(
        "Today is {}, {}.\n",
        WEEKDAYS[today_index as usize], today
    ));

    for (target_index, name) in WEEKDAYS.iter().enumerate() {
        let offset = (today_index + 7 - target_index as u32) % 7;
        let date = today - Days::new(u64::from(offset));
        block.push_str(&format!("{name}: {date}\n"));
    }

    block.push_str(DATE_CONTEXT_CLOSE);
    block
}
