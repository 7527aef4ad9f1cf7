use crate::equation_engine::EvaluationResult;
use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Most-recent-first list of evaluation results with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationHistory {
    capacity: usize,
    entries: VecDeque<EvaluationResult>,
}

impl Default for EvaluationHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EvaluationHistory {
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepends `result`, dropping the oldest entry once full.
    pub fn record(&mut self, result: EvaluationResult) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(result);
    }

    pub fn entries(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&EvaluationResult> {
        self.entries.front()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation_engine::evaluate;

    #[test]
    fn history_keeps_most_recent_first_and_drops_oldest() {
        let mut history = EvaluationHistory::default();
        for i in 0..12 {
            history.record(evaluate(&format!("{i} + 1")));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
        let inputs: Vec<&str> = history.entries().map(|r| r.input_text.as_str()).collect();
        assert_eq!(inputs.first(), Some(&"11 + 1"));
        assert_eq!(inputs.last(), Some(&"2 + 1"));
        assert_eq!(history.latest().map(|r| r.value), Some(12.0));
    }

    #[test]
    fn invalid_results_are_recorded_too() {
        let mut history = EvaluationHistory::with_capacity(2);
        history.record(evaluate("1/0"));
        assert_eq!(history.len(), 1);
        assert!(history.latest().is_some_and(|r| !r.valid));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut history = EvaluationHistory::with_capacity(0);
        history.record(evaluate("1"));
        history.record(evaluate("2"));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.latest().map(|r| r.value), Some(2.0));
    }
}
