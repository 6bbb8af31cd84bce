//! Submission history and running score totals.

use chrono::Utc;
use debunk_types::{EvaluationResult, SubmissionRecord};

/// Append-only submission history with running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    history: Vec<SubmissionRecord>,
    total_persuasive: u32,
    total_empathy: u32,
}

impl SessionLog {
    /// Empty log.
    pub const fn new() -> Self {
        Self {
            history: Vec::new(),
            total_persuasive: 0,
            total_empathy: 0,
        }
    }

    /// Record a scored submission and return the level delta it earns.
    ///
    /// The delta is `-(persuasive + empathy)`, so never positive.
    pub fn record(&mut self, result: EvaluationResult, text: &str) -> i32 {
        self.history.push(SubmissionRecord {
            text: text.to_owned(),
            timestamp: Utc::now(),
            persuasive: result.persuasive,
            empathy: result.empathy,
        });
        self.total_persuasive = self
            .total_persuasive
            .saturating_add(u32::from(result.persuasive));
        self.total_empathy = self.total_empathy.saturating_add(u32::from(result.empathy));

        0_i32.saturating_sub(i32::from(result.total()))
    }

    /// History in submission order.
    pub fn history(&self) -> &[SubmissionRecord] {
        &self.history
    }

    /// History newest first.
    pub fn recent(&self) -> impl Iterator<Item = &SubmissionRecord> {
        self.history.iter().rev()
    }

    /// Number of recorded submissions.
    pub const fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing has been recorded.
    pub const fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Sum of persuasiveness scores.
    pub const fn total_persuasive(&self) -> u32 {
        self.total_persuasive
    }

    /// Sum of empathy scores.
    pub const fn total_empathy(&self) -> u32 {
        self.total_empathy
    }

    /// Drop history and zero the totals.
    pub fn reset(&mut self) {
        self.history.clear();
        self.total_persuasive = 0;
        self.total_empathy = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_returns_negative_sum() {
        let mut log = SessionLog::new();
        assert_eq!(log.record(EvaluationResult::new(2, 2), "you can check it yourself"), -4);
        assert_eq!(log.record(EvaluationResult::new(5, 5), "I hear you"), -10);
        assert_eq!(log.total_persuasive(), 7);
        assert_eq!(log.total_empathy(), 7);
    }

    #[test]
    fn zero_result_is_recorded_without_effect() {
        let mut log = SessionLog::new();
        assert_eq!(log.record(EvaluationResult::ZERO, "hmm"), 0);
        assert_eq!(log.len(), 1);
        assert_eq!(log.total_persuasive(), 0);
        assert_eq!(log.total_empathy(), 0);
    }

    #[test]
    fn recent_reverses_insertion_order() {
        let mut log = SessionLog::new();
        let _ = log.record(EvaluationResult::new(1, 0), "first");
        let _ = log.record(EvaluationResult::new(0, 1), "second");
        let _ = log.record(EvaluationResult::new(1, 1), "third");

        let oldest: Vec<&str> = log.history().iter().map(|r| r.text.as_str()).collect();
        let newest: Vec<&str> = log.recent().map(|r| r.text.as_str()).collect();
        assert_eq!(oldest, ["first", "second", "third"]);
        assert_eq!(newest, ["third", "second", "first"]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut log = SessionLog::new();
        let _ = log.record(EvaluationResult::new(3, 4), "text");
        log.reset();
        assert!(log.is_empty());
        assert_eq!(log, SessionLog::new());
    }
}
