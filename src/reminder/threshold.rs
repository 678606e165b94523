use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Reminder cadence marker. Doubles as the idempotency key: at most one
/// reminder per (task, label) pair on the success path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdLabel {
    #[serde(rename = "7-day")]
    SevenDay,
    #[serde(rename = "3-day")]
    ThreeDay,
    #[serde(rename = "1-day")]
    OneDay,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "follow-up")]
    FollowUp,
    #[serde(rename = "manual-follow-up")]
    ManualFollowUp,
}

impl ThresholdLabel {
    /// The thresholds evaluated by the daily run, in evaluation order.
    pub const SCHEDULED: [ThresholdLabel; 4] = [
        ThresholdLabel::SevenDay,
        ThresholdLabel::ThreeDay,
        ThresholdLabel::OneDay,
        ThresholdLabel::Today,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdLabel::SevenDay => "7-day",
            ThresholdLabel::ThreeDay => "3-day",
            ThresholdLabel::OneDay => "1-day",
            ThresholdLabel::Today => "today",
            ThresholdLabel::FollowUp => "follow-up",
            ThresholdLabel::ManualFollowUp => "manual-follow-up",
        }
    }

    /// Days ahead of today this threshold looks at; `None` for the labels
    /// that are not part of the daily due-date sweep.
    pub fn days_ahead(&self) -> Option<i64> {
        match self {
            ThresholdLabel::SevenDay => Some(7),
            ThresholdLabel::ThreeDay => Some(3),
            ThresholdLabel::OneDay => Some(1),
            ThresholdLabel::Today => Some(0),
            ThresholdLabel::FollowUp | ThresholdLabel::ManualFollowUp => None,
        }
    }
}

impl std::fmt::Display for ThresholdLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[start, end)` of the UTC calendar day `days_ahead` days from `now`.
pub fn day_window(now: DateTime<Utc>, days_ahead: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = (now + Duration::days(days_ahead)).date_naive();
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Whole days until `due`, rounded up: due in 71h -> 3, due in 1h -> 1.
pub fn days_left(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (due - now).num_seconds();
    let quotient = secs / 86_400;
    let remainder = secs % 86_400;
    if remainder > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// Whole days since `due`, rounded down.
pub fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - due).num_seconds().div_euclid(86_400)
}
