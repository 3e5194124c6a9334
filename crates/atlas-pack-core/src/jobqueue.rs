//! A fixed-size worker pool that evaluates typed tasks asynchronously.
//!
//! A pool of `std::thread` workers shares a pending-task deque and a
//! running-task counter behind one mutex, with one condition variable
//! to wake workers and another to signal when the pool goes idle. Each
//! submitted task gets a one-shot `mpsc` channel as its completion
//! handle, the Rust analogue of a `std::future<T>`.

use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type BoxedJob = Box<dyn FnOnce() + Send + 'static>;

struct State {
    pending: VecDeque<BoxedJob>,
    running: usize,
    stop: bool,
}

struct Shared {
    state: Mutex<State>,
    wakeup: Condvar,
    idle: Condvar,
}

/// A fixed-size pool of worker threads consuming tasks from a shared
/// FIFO queue.
pub struct JobQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

/// A handle to a task's eventual result. Dropping the [`JobQueue`] before
/// a pending task runs breaks the handle: [`JobHandle::get`] then returns
/// `Err`, the Rust analogue of a broken `std::future` promise.
pub struct JobHandle<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Blocks the calling thread until the task completes (or the queue
    /// is torn down with the task still pending).
    pub fn get(self) -> std::result::Result<T, mpsc::RecvError> {
        self.rx.recv()
    }
}

impl JobQueue {
    /// Creates a queue with `workers` threads. `workers == 0` uses
    /// `max(available_parallelism, 2)`.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            Self::default_worker_count()
        } else {
            workers
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                pending: VecDeque::new(),
                running: 0,
                stop: false,
            }),
            wakeup: Condvar::new(),
            idle: Condvar::new(),
        });

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let shared = Arc::clone(&shared);
            handles.push(std::thread::spawn(move || Self::worker_main(shared)));
        }

        tracing::debug!(workers, "job queue started");

        Self {
            shared,
            workers: handles,
        }
    }

    pub fn default_worker_count() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(2)
    }

    /// Enqueues `task`. Never blocks the caller.
    pub fn submit<T, F>(&self, task: F) -> JobHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: BoxedJob = Box::new(move || {
            let result = task();
            let _ = tx.send(result);
        });

        {
            let mut state = self.shared.state.lock().unwrap();
            state.pending.push_back(job);
        }
        self.shared.wakeup.notify_one();

        JobHandle { rx }
    }

    /// Blocks until the pending queue and the in-flight count both reach
    /// zero.
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !state.pending.is_empty() || state.running > 0 {
            state = self.shared.idle.wait(state).unwrap();
        }
    }

    fn worker_main(shared: Arc<Shared>) {
        loop {
            let job = {
                let mut state = shared.state.lock().unwrap();
                loop {
                    if let Some(job) = state.pending.pop_front() {
                        state.running += 1;
                        break job;
                    }
                    if state.stop {
                        return;
                    }
                    state = shared.wakeup.wait(state).unwrap();
                }
            };

            job();

            let mut state = shared.state.lock().unwrap();
            state.running -= 1;
            if state.pending.is_empty() && state.running == 0 {
                shared.idle.notify_all();
            }
        }
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.stop = true;
        }
        self.shared.wakeup.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
