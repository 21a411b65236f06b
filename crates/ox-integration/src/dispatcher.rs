//! UI-affinity dispatcher
//!
//! One-shot callbacks posted from any thread and run on the thread that owns
//! the target (the engine session). Engine construction goes through here so
//! the engine handle is only ever assigned on that thread.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

type Task<T> = Box<dyn FnOnce(&mut T) + Send>;

struct Queue<T> {
    tasks: Mutex<VecDeque<Task<T>>>,
    condvar: Condvar,
}

/// Receiving side, owned by the UI-affinity thread
pub struct UiDispatcher<T> {
    queue: Arc<Queue<T>>,
}

/// Posting side, cloneable and sendable
pub struct UiHandle<T> {
    queue: Arc<Queue<T>>,
}

impl<T> Clone for UiHandle<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T> UiDispatcher<T> {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Queue {
                tasks: Mutex::new(VecDeque::new()),
                condvar: Condvar::new(),
            }),
        }
    }

    pub fn handle(&self) -> UiHandle<T> {
        UiHandle {
            queue: self.queue.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.tasks.lock().len()
    }

    /// Run every task queued so far, in posting order. Returns how many ran.
    pub fn run_pending(&self, target: &mut T) -> usize {
        let tasks: Vec<Task<T>> = self.queue.tasks.lock().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task(target);
        }
        if count > 0 {
            trace!("Ran {} UI task(s)", count);
        }
        count
    }

    /// Block until at least one task is queued or `timeout` elapses, then run
    /// everything queued.
    pub fn wait_and_run(&self, target: &mut T, timeout: Duration) -> usize {
        {
            let mut tasks = self.queue.tasks.lock();
            if tasks.is_empty() {
                let _ = self.queue.condvar.wait_for(&mut tasks, timeout);
            }
        }
        self.run_pending(target)
    }
}

impl<T> Default for UiDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UiHandle<T> {
    /// Queue a one-shot callback for the UI-affinity thread
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.queue.tasks.lock().push_back(Box::new(task));
        self.queue.condvar.notify_one();
    }
}
