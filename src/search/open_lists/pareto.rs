//! Pareto open list: buckets entries by a pair of evaluator outputs,
//! discards dominated buckets, samples uniformly among the Pareto-optimal
//! ones (spec §4.8 "Pareto").

use crate::search::open_lists::OpenList;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct ParetoOpenList<T> {
    buckets: HashMap<(i32, i32), VecDeque<T>>,
    size: usize,
    rng: StdRng,
}

impl<T> ParetoOpenList<T> {
    pub fn new(rng: StdRng) -> Self {
        ParetoOpenList {
            buckets: HashMap::new(),
            size: 0,
            rng,
        }
    }

    fn is_dominated(&self, (a1, a2): (i32, i32), (b1, b2): (i32, i32)) -> bool {
        b1 <= a1 && b2 <= a2 && (b1 < a1 || b2 < a2)
    }

    fn pareto_optimal_keys(&self) -> Vec<(i32, i32)> {
        self.buckets
            .keys()
            .copied()
            .filter(|&key| !self.buckets.keys().any(|&other| other != key && self.is_dominated(key, other)))
            .collect()
    }
}

impl<T: Clone + std::fmt::Debug> OpenList<T> for ParetoOpenList<T> {
    fn insert(&mut self, key: &[i32], value: T) {
        self.buckets.entry((key[0], key[1])).or_default().push_back(value);
        self.size += 1;
    }

    fn pop(&mut self) -> Option<T> {
        let optimal = self.pareto_optimal_keys();
        if optimal.is_empty() {
            return None;
        }
        let key = optimal[self.rng.gen_range(0..optimal.len())];
        let bucket = self.buckets.get_mut(&key)?;
        let value = bucket.pop_front();
        if bucket.is_empty() {
            self.buckets.remove(&key);
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
    fn dominated_bucket_is_never_drained_before_optimal_ones_exist() {
        let mut list = ParetoOpenList::new(StdRng::seed_from_u64(1));
        list.insert(&[5, 5], "dominated");
        list.insert(&[1, 1], "optimal");
        // "optimal" strictly dominates "dominated" on both evaluators, so
        // it must be the only candidate until it is drained.
        assert_eq!(list.pop(), Some("optimal"));
        assert_eq!(list.pop(), Some("dominated"));
        assert!(list.is_empty());
    }
}
