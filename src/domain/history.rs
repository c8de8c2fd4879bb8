use chrono::NaiveDateTime;

pub const DEFAULT_DONE_STATUSES: [&str; 3] = ["Done", "Closed", "Resolved"];

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalItem {
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub status: String,
}

impl HistoricalItem {
    pub fn new(created_at: NaiveDateTime, resolved_at: Option<NaiveDateTime>, status: &str) -> Self {
        Self {
            created_at,
            resolved_at,
            status: status.to_string(),
        }
    }

    /// Returns `true` when the status matches one of `done_statuses`,
    /// ignoring case and surrounding whitespace.
    pub fn has_done_status<S: AsRef<str>>(&self, done_statuses: &[S]) -> bool {
        is_done_status(&self.status, done_statuses)
    }

    /// Elapsed days between creation and resolution. `None` while the item is
    /// unresolved or when the resolution precedes the creation.
    pub fn cycle_time_days(&self) -> Option<f64> {
        let resolved_at = self.resolved_at?;
        let seconds = resolved_at
            .signed_duration_since(self.created_at)
            .num_seconds();
        if seconds < 0 {
            return None;
        }
        Some(seconds as f64 / SECONDS_PER_DAY)
    }
}

pub fn is_done_status<S: AsRef<str>>(status: &str, done_statuses: &[S]) -> bool {
    let status = status.trim();
    done_statuses
        .iter()
        .any(|done| done.as_ref().trim().eq_ignore_ascii_case(status))
}
