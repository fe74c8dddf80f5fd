use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};
use tracing::trace;

use crate::counter::CounterHandle;
use crate::job::{Completion, Job, JobFn};

/// A worker holds the handle of one job-processing thread.
pub(crate) struct Worker {
    handle: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn<T, O>(
        id: usize,
        intake: Receiver<Job<T>>,
        completions: Sender<Completion<T, O>>,
        counter: CounterHandle,
        job_fn: Arc<JobFn<T, O>>,
        strict_completions: bool,
    ) -> Self
    where
        T: Send + 'static,
        O: Send + 'static,
    {
        let handle = thread::Builder::new()
            .name(format!("crew-worker-{id}"))
            .spawn(move || {
                // Receiving fails once the intake sender is dropped, which
                // is the pool-wide shutdown signal.
                while let Ok(job) = intake.recv() {
                    counter.started();
                    let output = job_fn(&job);
                    counter.finished();

                    let completion = Completion {
                        input: job.data,
                        output,
                    };
                    if strict_completions {
                        // Blocks until a consumer takes the result.
                        let _ = completions.send(completion);
                    } else if completions.try_send(completion).is_err() {
                        trace!(worker = id, "no consumer ready, dropping completion");
                    }
                }
            })
            .expect("failed to spawn a thread.");
        Worker { handle }
    }

    pub(crate) fn join(self) -> thread::Result<()> {
        if self.handle.thread().id() != thread::current().id() {
            self.handle.join()?;
        }
        Ok(())
    }
}
