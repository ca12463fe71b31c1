//! Per-state landmark status (spec §4.11: "past"/"future" bitsets that the
//! cost-partitioning heuristic consumes at evaluation time").
//!
//! `past[i]` is true once landmark `i` has been satisfied at some point along
//! the path the search actually followed to reach a state, not just in that
//! state itself (a landmark fact can later be deleted again without being
//! un-achieved). Tracking this precisely requires the transition from parent
//! to child, not just the child's own fact values, so
//! [`LandmarkStatusTracker::advance`] is driven by
//! [`crate::search::heuristics::Heuristic::notify_transition`] rather than by
//! `evaluate` alone — mirrors the original's `LandmarkStatusManager`, which
//! likewise updates a search node's reached-landmarks bitset from its parent's
//! bitset plus the newly applied operator's effects, instead of recomputing
//! it from scratch at every node.

use std::collections::HashMap;

use crate::search::landmarks::landmark_graph::Landmark;

#[derive(Debug, Clone)]
pub struct LandmarkStatus {
    pub past: Vec<bool>,
    pub future: Vec<bool>,
}

impl LandmarkStatus {
    pub fn all_future(num_landmarks: usize) -> Self {
        LandmarkStatus {
            past: vec![false; num_landmarks],
            future: vec![true; num_landmarks],
        }
    }

    fn from_past(past: Vec<bool>) -> Self {
        let future = past.iter().map(|&p| !p).collect();
        LandmarkStatus { past, future }
    }
}

/// Caches the `past` bitset reached by every state the search has visited so
/// far, keyed by its packed fact values, and derives each state's from its
/// generating parent's (`advance`) plus whichever landmarks the child itself
/// newly satisfies. A state visited without ever going through `advance`
/// (the initial state, or a state revisited with no recorded parent) falls
/// back to "only the landmarks already true in this state itself" — correct
/// for the initial state, and a safe (non-overclaiming) under-approximation
/// anywhere else, since `past` only makes the heuristic's `future` set
/// larger, never lets it silently drop a landmark that still needs doing.
#[derive(Debug, Default)]
pub struct LandmarkStatusTracker {
    past: HashMap<Vec<i32>, Vec<bool>>,
}

impl LandmarkStatusTracker {
    pub fn new() -> Self {
        LandmarkStatusTracker { past: HashMap::new() }
    }

    fn reached_now(landmarks: &[Landmark], values: &[i32]) -> Vec<bool> {
        landmarks.iter().map(|lm| lm.is_satisfied(values)).collect()
    }

    /// Status for `values`, computed on demand from `landmarks` if `values`
    /// was never reached through [`LandmarkStatusTracker::advance`].
    pub fn status(&self, landmarks: &[Landmark], values: &[i32]) -> LandmarkStatus {
        let past = self
            .past
            .get(values)
            .cloned()
            .unwrap_or_else(|| Self::reached_now(landmarks, values));
        LandmarkStatus::from_past(past)
    }

    /// Records that `child_values` was reached from `parent_values`: its
    /// `past` is the parent's `past` (or, if the parent itself was never
    /// recorded, the landmarks already true in the parent) unioned with
    /// whatever landmarks are newly true in the child.
    pub fn advance(&mut self, landmarks: &[Landmark], parent_values: &[i32], child_values: &[i32]) {
        let mut past = self
            .past
            .get(parent_values)
            .cloned()
            .unwrap_or_else(|| Self::reached_now(landmarks, parent_values));
        for (i, lm) in landmarks.iter().enumerate() {
            if lm.is_satisfied(child_values) {
                past[i] = true;
            }
        }
        self.past.insert(child_values.to_vec(), past);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::landmarks::landmark_graph::LandmarkKind;
    use crate::task::{FactPair, OperatorId};

    fn landmark(var: usize, value: i32) -> Landmark {
        Landmark {
            facts: vec![FactPair::new(var, value)],
            kind: LandmarkKind::Atomic,
            operators: vec![OperatorId(0)],
        }
    }

    #[test]
    fn a_landmark_stays_past_after_its_fact_is_retracted() {
        let landmarks = vec![landmark(0, 1)];
        let mut tracker = LandmarkStatusTracker::new();
        // Parent never advanced into: falls back to "true in the parent itself".
        tracker.advance(&landmarks, &[1], &[0]);
        let status = tracker.status(&landmarks, &[0]);
        assert_eq!(status.past, vec![true]);
        assert_eq!(status.future, vec![false]);
    }

    #[test]
    fn unreached_landmark_is_reported_as_future() {
        let landmarks = vec![landmark(0, 1)];
        let tracker = LandmarkStatusTracker::new();
        let status = tracker.status(&landmarks, &[0]);
        assert_eq!(status.past, vec![false]);
        assert_eq!(status.future, vec![true]);
    }
}
