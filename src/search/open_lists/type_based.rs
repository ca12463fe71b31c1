//! Type-based open list: bucket entries by their full evaluator-output
//! vector, then sample a bucket uniformly and pop FIFO within it
//! (spec §4.8 "Type-based").

use crate::search::open_lists::OpenList;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct TypeBasedOpenList<T> {
    buckets: HashMap<Vec<i32>, VecDeque<T>>,
    bucket_order: Vec<Vec<i32>>,
    size: usize,
    rng: StdRng,
}

impl<T> TypeBasedOpenList<T> {
    pub fn new(rng: StdRng) -> Self {
        TypeBasedOpenList {
            buckets: HashMap::new(),
            bucket_order: Vec::new(),
            size: 0,
            rng,
        }
    }
}

impl<T: Clone + std::fmt::Debug> OpenList<T> for TypeBasedOpenList<T> {
    fn insert(&mut self, key: &[i32], value: T) {
        let key = key.to_vec();
        let bucket = self.buckets.entry(key.clone()).or_insert_with(|| {
            self.bucket_order.push(key);
            VecDeque::new()
        });
        bucket.push_back(value);
        self.size += 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.bucket_order.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..self.bucket_order.len());
        let key = self.bucket_order[index].clone();
        let bucket = self.buckets.get_mut(&key)?;
        let value = bucket.pop_front();
        if bucket.is_empty() {
            self.buckets.remove(&key);
            self.bucket_order.swap_remove(index);
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
    fn samples_every_inserted_value_exactly_once() {
        let mut list = TypeBasedOpenList::new(StdRng::seed_from_u64(42));
        list.insert(&[1, 0], "a");
        list.insert(&[1, 0], "b");
        list.insert(&[2, 0], "c");

        let mut popped = Vec::new();
        while let Some(v) = list.pop() {
            popped.push(v);
        }
        popped.sort_unstable();
        assert_eq!(popped, vec!["a", "b", "c"]);
    }
}
