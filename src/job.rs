/// The function each worker thread calls for every job it claims.
///
/// It receives the job by reference so the pool can pair the job's data
/// with the produced output in the resulting [`Completion`].
///
/// [`Completion`]: crate::Completion
pub type JobFn<T, O> = dyn Fn(&Job<T>) -> O + Send + Sync + 'static;

/// Wraps the data that represents one job to be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job<T> {
    pub data: T,
}

/// Pairs the input of a finished job with the output the worker function
/// produced for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion<T, O> {
    pub input: T,
    pub output: O,
}
