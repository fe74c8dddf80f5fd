use crate::{
    counter::Counter,
    job::{Completion, Job, JobFn},
    worker::Worker,
    WorkerPoolBuilder,
};

use crossbeam_channel::{bounded, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, error};

use std::sync::{Arc, Mutex};

/// An error returned from [`WorkerPool::dispatch`] after the pool has been
/// shut down.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("worker pool is shut down")]
pub struct ShutDownError;

pub(crate) struct WorkerPoolSharedData<T> {
    pub(crate) intake: Mutex<Option<Sender<Job<T>>>>,
    pub(crate) workers: Mutex<Option<Vec<Worker>>>,
    pub(crate) counter: Mutex<Option<Counter>>,
}

/// A `WorkerPool` owns a fixed set of worker threads that all pull jobs
/// from a shared intake channel.
///
/// # Intake
///
/// The intake is a rendezvous channel: it holds no jobs of its own, so
/// [`dispatch`] hands each job directly to whichever worker becomes free
/// first and blocks while all of them are busy. A job that was accepted is
/// therefore always executed; there is no queue that shutdown could drop.
///
/// # Completions
///
/// After the worker function returns, the worker pairs the job's input
/// with the produced output and delivers it on the completion channel.
/// With `strict_completions` the delivery blocks until a consumer takes
/// it, so no completion is ever lost; without it the delivery is attempted
/// only if a consumer is ready right now, and is dropped otherwise. See
/// [`completions`] for the consumer side of this contract.
///
/// # In-progress count
///
/// A dedicated counting thread owns the number of jobs currently
/// executing. Workers report to it by message, [`job_count`] queries it by
/// message, so the count needs no lock and can never race.
///
/// # Shutdown
///
/// [`shutdown`] stops the pool exactly once, lets running jobs finish, and
/// joins every thread the pool started. The handle is cheap to clone;
/// clones share the pool, and shutting down through any of them shuts down
/// all of them.
///
/// [`dispatch`]: WorkerPool::dispatch
/// [`completions`]: WorkerPool::completions
/// [`job_count`]: WorkerPool::job_count
/// [`shutdown`]: WorkerPool::shutdown
pub struct WorkerPool<T, O> {
    pub(crate) share: Arc<WorkerPoolSharedData<T>>,
    pub(crate) completions: Receiver<Completion<T, O>>,
    pub(crate) worker_count: usize,
}

impl<T, O> Clone for WorkerPool<T, O> {
    fn clone(&self) -> Self {
        Self {
            share: self.share.clone(),
            completions: self.completions.clone(),
            worker_count: self.worker_count,
        }
    }
}

impl<T, O> WorkerPool<T, O>
where
    T: Send + 'static,
    O: Send + 'static,
{
    /// Creates a pool that maintains exactly `worker_count` threads, each
    /// calling `job_fn` for every job it claims.
    ///
    /// If `strict_completions` is true, the result of every job is
    /// delivered to the completion channel blockingly; you must then read
    /// from [`WorkerPool::completions`], otherwise the workers deadlock.
    /// If it is false, results are delivered only when a consumer is
    /// already waiting and are dropped otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `worker_count` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use crew::{Job, WorkerPool};
    ///
    /// let pool = WorkerPool::new(3, |job: &Job<i32>| job.data * 2, true);
    /// let completions = pool.completions();
    ///
    /// pool.dispatch(Job { data: 21 }).unwrap();
    /// assert_eq!(42, completions.recv().unwrap().output);
    ///
    /// pool.shutdown();
    /// ```
    pub fn new<F>(worker_count: usize, job_fn: F, strict_completions: bool) -> Self
    where
        F: Fn(&Job<T>) -> O + Send + Sync + 'static,
    {
        WorkerPoolBuilder::new()
            .worker_count(worker_count)
            .strict_completions(strict_completions)
            .build(job_fn)
    }

    /// Builds a worker pool from a configuration (builder).
    ///
    /// This assumes arguments of the builder are valid.
    pub(crate) fn from_builder<F>(builder: WorkerPoolBuilder, job_fn: F) -> Self
    where
        F: Fn(&Job<T>) -> O + Send + Sync + 'static,
    {
        let (intake_tx, intake_rx) = bounded(0);
        let (completions_tx, completions_rx) = bounded(0);
        let counter = Counter::spawn();
        let job_fn: Arc<JobFn<T, O>> = Arc::new(job_fn);

        let workers = (0..builder.worker_count)
            .map(|id| {
                Worker::spawn(
                    id,
                    intake_rx.clone(),
                    completions_tx.clone(),
                    counter.handle(),
                    Arc::clone(&job_fn),
                    builder.strict_completions,
                )
            })
            .collect();
        // The local completion sender is dropped at the end of this
        // function; once every worker exits, the channel disconnects and
        // consumers see end-of-stream.

        debug!(
            worker_count = builder.worker_count,
            strict_completions = builder.strict_completions,
            "worker pool started"
        );

        Self {
            share: Arc::new(WorkerPoolSharedData {
                intake: Mutex::new(Some(intake_tx)),
                workers: Mutex::new(Some(workers)),
                counter: Mutex::new(Some(counter)),
            }),
            completions: completions_rx,
            worker_count: builder.worker_count,
        }
    }

    /// Feeds a new job to the pool. If no idle worker is available, this
    /// call blocks until one of them accepts the job.
    ///
    /// # Errors
    ///
    /// Returns [`ShutDownError`], without blocking, if the pool has
    /// already been shut down. A dispatch racing [`WorkerPool::shutdown`]
    /// may go either way, but a job this function accepted is always
    /// executed.
    pub fn dispatch(&self, job: Job<T>) -> Result<(), ShutDownError> {
        // Clone the sender out of the lock; holding the lock across the
        // blocking send would stall a concurrent shutdown. The clone keeps
        // the channel connected until the job is handed over.
        let intake = match self.share.intake.lock().unwrap().as_ref() {
            Some(intake) => intake.clone(),
            None => return Err(ShutDownError),
        };
        intake.send(job).map_err(|_| ShutDownError)
    }

    /// Returns a receive handle on the completion channel, with one entry
    /// per job whose delivery succeeded.
    ///
    /// With `strict_completions` you need to start reading from this
    /// channel before dispatching jobs, otherwise the workers block on
    /// delivery forever. The channel disconnects when the workers exit
    /// during shutdown, so iterating over it terminates instead of
    /// blocking.
    ///
    /// # Examples
    ///
    /// ```
    /// use crew::{Job, WorkerPool};
    ///
    /// let pool = WorkerPool::new(2, |job: &Job<u32>| job.data + 1, true);
    /// let completions = pool.completions();
    /// let consumer = std::thread::spawn(move || completions.iter().count());
    ///
    /// for n in 0..10 {
    ///     pool.dispatch(Job { data: n }).unwrap();
    /// }
    /// pool.shutdown();
    ///
    /// assert_eq!(10, consumer.join().unwrap());
    /// ```
    #[must_use]
    pub fn completions(&self) -> Receiver<Completion<T, O>> {
        self.completions.clone()
    }

    /// Returns the number of jobs executing at the moment the counting
    /// thread services the query.
    ///
    /// The snapshot may be stale by the time the caller observes it, since
    /// other workers can concurrently start or finish jobs. Blocks for one
    /// round-trip to the counting thread at most; after shutdown it
    /// returns 0.
    #[must_use]
    pub fn job_count(&self) -> usize {
        match self.share.counter.lock().unwrap().as_ref() {
            Some(counter) => counter.snapshot(),
            None => 0,
        }
    }

    /// Returns the number of worker threads the pool was created with.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Returns `true` if the pool has been shut down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.share.intake.lock().unwrap().is_none()
    }

    /// Shuts the pool down and waits for all worker threads to end.
    ///
    /// Workers finish the job they are currently executing before they
    /// exit; after this function returns, no worker is running and the
    /// completion channel is disconnected. Repeated or concurrent calls
    /// return immediately without blocking or erroring.
    ///
    /// Be aware that with `strict_completions` a worker blocks on
    /// delivering its last result, so consumers must keep reading from
    /// [`WorkerPool::completions`] or this call cannot return.
    ///
    /// # Examples
    ///
    /// ```
    /// use crew::{Job, WorkerPool};
    ///
    /// let pool = WorkerPool::new(2, |job: &Job<i32>| job.data + 1, false);
    ///
    /// pool.shutdown();
    /// pool.shutdown();
    ///
    /// assert!(pool.dispatch(Job { data: 1 }).is_err());
    /// ```
    pub fn shutdown(&self) {
        // Taking the sender is the one-way transition; a second caller
        // finds it already gone and returns right away.
        let intake = self.share.intake.lock().unwrap().take();
        if intake.is_none() {
            return;
        }
        debug!("shutting down worker pool");
        drop(intake);

        // Take before joining so no lock is held while we wait; job_count
        // stays serviceable until the counting thread is stopped below.
        let workers = self.share.workers.lock().unwrap().take();
        for worker in workers.into_iter().flatten() {
            if worker.join().is_err() {
                error!("worker thread panicked");
            }
        }
        let counter = self.share.counter.lock().unwrap().take();
        if let Some(counter) = counter {
            counter.join();
        }
        debug!("worker pool shut down");
    }
}
