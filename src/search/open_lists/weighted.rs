//! Weighted open lists: bucket by heuristic value like the type-based list,
//! but draw a bucket with probability proportional to a softmin over the
//! bucket keys, or a linear interpolation between the min and max observed
//! key (spec §4.8 "Weighted variants").

use crate::search::open_lists::OpenList;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightKind {
    SoftMin,
    Linear,
}

#[derive(Debug)]
pub struct WeightedOpenList<T> {
    buckets: BTreeMap<i32, VecDeque<T>>,
    size: usize,
    kind: WeightKind,
    rng: StdRng,
}

impl<T> WeightedOpenList<T> {
    pub fn new(kind: WeightKind, rng: StdRng) -> Self {
        WeightedOpenList {
            buckets: BTreeMap::new(),
            size: 0,
            kind,
            rng,
        }
    }

    fn weight(&self, min: i32, max: i32, key: i32) -> f64 {
        match self.kind {
            WeightKind::SoftMin => (-(key as f64)).exp(),
            WeightKind::Linear => {
                if max == min {
                    1.0
                } else {
                    1.0 - (key - min) as f64 / (max - min) as f64
                }
            }
        }
        .max(1e-9)
    }
}

impl<T: Clone + std::fmt::Debug> OpenList<T> for WeightedOpenList<T> {
    fn insert(&mut self, key: &[i32], value: T) {
        self.buckets.entry(key[0]).or_default().push_back(value);
        self.size += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.buckets.is_empty() {
            return None;
        }
        let min = *self.buckets.keys().next().unwrap();
        let max = *self.buckets.keys().next_back().unwrap();
        let weights: Vec<(i32, f64)> = self
            .buckets
            .keys()
            .map(|&k| (k, self.weight(min, max, k)))
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        let mut sample = self.rng.gen_range(0.0..total);
        let mut chosen = weights[0].0;
        for (key, w) in &weights {
            if sample < *w {
                chosen = *key;
                break;
            }
            sample -= w;
            chosen = *key;
        }
        let bucket = self.buckets.get_mut(&chosen)?;
        let value = bucket.pop_front();
        if bucket.is_empty() {
            self.buckets.remove(&chosen);
        }
        if value.is_some() {
            self.size -= 1;
        }
        value
    }

    fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn len(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn every_inserted_value_is_eventually_popped() {
        let mut list = WeightedOpenList::new(WeightKind::Linear, StdRng::seed_from_u64(7));
        list.insert(&[0], "a");
        list.insert(&[5], "b");
        list.insert(&[5], "c");
        let mut popped = Vec::new();
        while let Some(v) = list.pop() {
            popped.push(v);
        }
        popped.sort_unstable();
        assert_eq!(popped, vec!["a", "b", "c"]);
    }
}
