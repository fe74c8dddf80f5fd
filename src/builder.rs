use crate::{Job, WorkerPool};

/// A builder of the [`WorkerPool`], which can be used to configure the
/// properties of a new pool.
///
/// # Examples
///
/// ```
/// use crew::{Job, WorkerPoolBuilder};
///
/// let pool = WorkerPoolBuilder::default()
///     .worker_count(4)
///     .strict_completions(false)
///     .build(|job: &Job<String>| job.data.len());
///
/// pool.dispatch(Job { data: "hello".to_string() }).unwrap();
/// pool.shutdown();
/// ```
pub struct WorkerPoolBuilder {
    pub(crate) worker_count: usize,
    pub(crate) strict_completions: bool,
}

impl Default for WorkerPoolBuilder {
    /// Creates a new builder with the default configuration.
    ///
    /// # Default Configuration
    /// - `worker_count`: the number of physical cores of the current
    /// system, at least 1
    /// - `strict_completions`: `false`
    fn default() -> Self {
        Self {
            worker_count: usize::max(1, num_cpus::get_physical()),
            strict_completions: false,
        }
    }
}

impl WorkerPoolBuilder {
    /// Creates the base configuration for the new worker pool.
    ///
    /// See: [`WorkerPoolBuilder::default`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads the pool maintains.
    #[must_use]
    pub fn worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Sets whether completions are delivered blockingly (`true`) or
    /// dropped when no consumer is ready (`false`).
    #[must_use]
    pub fn strict_completions(mut self, strict: bool) -> Self {
        self.strict_completions = strict;
        self
    }

    /// Creates a worker pool that calls `job_fn` for every dispatched
    /// job.
    ///
    /// # Panics
    ///
    /// Panics if the builder holds invalid arguments.
    pub fn build<T, O, F>(self, job_fn: F) -> WorkerPool<T, O>
    where
        T: Send + 'static,
        O: Send + 'static,
        F: Fn(&Job<T>) -> O + Send + Sync + 'static,
    {
        self.check_arguments();
        WorkerPool::from_builder(self, job_fn)
    }

    fn check_arguments(&self) {
        if self.worker_count == 0 {
            panic!("worker_count can not be 0.");
        }
    }
}
