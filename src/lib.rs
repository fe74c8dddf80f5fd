//! # Worker Pool
//!
//! A worker pool distributes jobs among a fixed set of worker threads.
//! Use this crate to e.g. create a pool with 10 threads and spread
//! expensive jobs across them without spawning a new thread per job.
//!
//! Dispatching blocks while every worker is busy, completed jobs are
//! reported on a completion channel, and the pool can be shut down
//! gracefully at any time.
//!
//! # Build a worker pool
//!
//! You can use the [`WorkerPoolBuilder`] to build a worker pool with a
//! custom configuration, or [`WorkerPool::new`] directly.
//!
//! # Examples
//!
//! ```
//! use crew::{Job, WorkerPool};
//!
//! // Create a pool with 3 worker threads that process jobs in parallel.
//! let pool = WorkerPool::new(3, |job: &Job<String>| job.data.to_uppercase(), true);
//! let completions = pool.completions();
//!
//! pool.dispatch(Job { data: "hello".to_string() }).unwrap();
//! assert_eq!("HELLO", completions.recv().unwrap().output);
//!
//! // Stop the pool and wait for all worker threads to end.
//! pool.shutdown();
//! ```

mod builder;
mod job;
mod retry;
mod worker_pool;

pub(crate) mod counter;
pub(crate) mod worker;

pub use builder::*;
pub use job::*;
pub use retry::retry;
pub use worker_pool::*;
