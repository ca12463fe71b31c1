//! The heuristic search engine (spec §2 "Search Engine" and friends):
//! open lists, the search-node/search-space bookkeeping, the heuristics and
//! pruning methods that feed it, and the adaptive priority queue they share.

pub mod heuristics;
pub mod landmarks;
pub mod open_lists;
pub mod priority_queue;
pub mod pruning;
mod search_engine;
mod search_node;
mod search_space;
mod statistics;
pub mod termination;

pub use search_engine::{EagerSearchEngine, SearchMode};
pub use search_node::{SearchNode, SearchNodeStatus};
pub use search_space::SearchSpace;
pub use statistics::SearchStatistics;
pub use termination::{SearchOutcome, TerminationCondition};
