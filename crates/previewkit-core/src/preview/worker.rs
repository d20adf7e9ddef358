//! One-shot worker tasks.
//!
//! Each request gets its own thread. The result comes back over a channel
//! and the thread ends with it, so workers are never pooled or reused.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Progress of a worker task.
#[derive(Debug, PartialEq, Eq)]
pub enum TaskState<T> {
    /// Still running.
    Pending,
    /// Finished with a result. The worker is spent afterwards.
    Done(T),
    /// The task ended without a result (it panicked).
    Lost,
}

/// Handle to a task running on its own thread.
#[derive(Debug)]
pub struct Worker<T> {
    name: &'static str,
    receiver: Receiver<T>,
}

impl<T: Send + 'static> Worker<T> {
    /// Start `task` on a fresh thread.
    pub fn spawn<F>(name: &'static str, task: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // The receiver is gone when the request was superseded.
            let _ = sender.send(task());
        });
        log::debug!("Spawned {name} worker");

        Self { name, receiver }
    }

    /// Poll for the result without blocking.
    pub fn try_take(&self) -> TaskState<T> {
        match self.receiver.try_recv() {
            Ok(value) => TaskState::Done(value),
            Err(TryRecvError::Empty) => TaskState::Pending,
            Err(TryRecvError::Disconnected) => {
                log::warn!("{} worker ended without a result", self.name);
                TaskState::Lost
            }
        }
    }

    /// Block until the task finishes. `None` when it ended without a result.
    pub fn wait(self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_wait_returns_result() {
        let worker = Worker::spawn("sum", || (1..=10).sum::<u32>());
        assert_eq!(worker.wait(), Some(55));
    }

    #[test]
    fn test_try_take_pending_then_done() {
        let (gate_tx, gate_rx) = channel::<()>();
        let worker = Worker::spawn("gated", move || {
            let _ = gate_rx.recv();
            7
        });

        assert_eq!(worker.try_take(), TaskState::Pending);
        gate_tx.send(()).unwrap();

        loop {
            match worker.try_take() {
                TaskState::Pending => thread::yield_now(),
                state => {
                    assert_eq!(state, TaskState::Done(7));
                    break;
                }
            }
        }
    }

    #[test]
    fn test_panicking_task_is_lost() {
        let worker: Worker<u32> = Worker::spawn("broken", || panic!("boom"));
        loop {
            match worker.try_take() {
                TaskState::Pending => thread::yield_now(),
                state => {
                    assert_eq!(state, TaskState::Lost);
                    break;
                }
            }
        }
    }

    #[test]
    fn test_dropped_worker_does_not_block_task() {
        let (done_tx, done_rx) = channel();
        let worker = Worker::spawn("orphan", move || {
            done_tx.send(()).unwrap();
            1
        });
        drop(worker);
        assert!(done_rx.recv().is_ok());
    }
}
