use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Sender};

pub(crate) enum CounterMsg {
    Started,
    Finished,
    Query(Sender<usize>),
}

/// Owns the in-progress job count on a single dedicated thread.
///
/// Workers and queriers never touch the count itself; every increment,
/// decrement, and read travels through the mailbox, so the counting logic
/// stays single-threaded even with arbitrarily many concurrent workers.
pub(crate) struct Counter {
    tx: Sender<CounterMsg>,
    thread: JoinHandle<()>,
}

impl Counter {
    pub(crate) fn spawn() -> Self {
        let (tx, rx) = unbounded();
        let thread = thread::Builder::new()
            .name("crew-counter".into())
            .spawn(move || {
                let mut in_progress: usize = 0;
                // Receiving fails once every handle is gone, which ends
                // the counting thread.
                while let Ok(msg) = rx.recv() {
                    match msg {
                        CounterMsg::Started => in_progress += 1,
                        CounterMsg::Finished => in_progress -= 1,
                        CounterMsg::Query(reply) => {
                            let _ = reply.send(in_progress);
                        }
                    }
                }
            })
            .expect("failed to spawn a thread.");
        Counter { tx, thread }
    }

    /// Returns a handle that workers use to report claimed and finished
    /// jobs.
    pub(crate) fn handle(&self) -> CounterHandle {
        CounterHandle {
            tx: self.tx.clone(),
        }
    }

    /// Reads the count at the moment the counting thread services the
    /// query. Blocks for one round-trip only.
    pub(crate) fn snapshot(&self) -> usize {
        let (reply_tx, reply_rx) = bounded(1);
        if self.tx.send(CounterMsg::Query(reply_tx)).is_err() {
            return 0;
        }
        reply_rx.recv().unwrap_or(0)
    }

    /// Drops this side's sender and waits for the counting thread to end.
    /// The thread keeps running until the worker handles are gone too.
    pub(crate) fn join(self) {
        drop(self.tx);
        let _ = self.thread.join();
    }
}

#[derive(Clone)]
pub(crate) struct CounterHandle {
    tx: Sender<CounterMsg>,
}

impl CounterHandle {
    pub(crate) fn started(&self) {
        let _ = self.tx.send(CounterMsg::Started);
    }

    pub(crate) fn finished(&self) {
        let _ = self.tx.send(CounterMsg::Finished);
    }
}

#[cfg(test)]
mod tests {
    use super::Counter;
    use std::thread;

    #[test]
    fn test_counts_started_and_finished_jobs() {
        let counter = Counter::spawn();
        let handle = counter.handle();

        assert_eq!(0, counter.snapshot());

        handle.started();
        handle.started();
        handle.started();
        handle.finished();
        assert_eq!(2, counter.snapshot());

        handle.finished();
        handle.finished();
        assert_eq!(0, counter.snapshot());

        drop(handle);
        counter.join();
    }

    #[test]
    fn test_counts_under_concurrent_reporters() {
        let counter = Counter::spawn();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let reporter = counter.handle();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    reporter.started();
                    reporter.finished();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(0, counter.snapshot());
        counter.join();
    }
}
