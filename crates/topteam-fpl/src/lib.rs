// Fantasy Premier League data sources and candidate-pool preparation.

pub mod bootstrap;
pub mod filter;
pub mod historical;

pub use filter::{build_pool, CandidatePool, PoolFilter, RawPlayer};
