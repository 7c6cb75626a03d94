mod fibonacci;
mod simulator;

pub use fibonacci::{fibonacci, FibonacciError, MAX_RECURSIVE_INPUT};
pub use simulator::{simulate, validate, LoadError, LoadResult, DEFAULT_N, MAX_N};
