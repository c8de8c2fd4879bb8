use chrono::NaiveDate;
use serde::Serialize;

/// Items resolved within one bucket; `date` is the first day of the bucket.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Throughput {
    pub date: NaiveDate,
    pub completed_issues: usize,
}
