//! FIFO rate limiter for remote operations
//!
//! Operations submitted through a [`RateLimiter`] run one at a time, in
//! submission order. No more than `max_per_second` of them start within any
//! rolling one-second window: the limiter keeps the start instants of the
//! most recent operations and holds the queue until the oldest one falls out
//! of the window.
//!
//! A failing operation only fails its own caller; the queue keeps draining.
//! [`RateLimiter::clear`] drops operations that have not started yet and
//! their callers receive [`ChemError::Cancelled`].

use crate::error::{ChemError, ChemResult};
use futures_util::future::BoxFuture;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

/// Length of the accounting window
const WINDOW: Duration = Duration::from_secs(1);

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Serial, FIFO, rate-limited executor. Cheap to clone; clones share a queue.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

struct Inner {
    max_per_second: usize,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    /// Operations not yet started
    queue: VecDeque<Job>,
    /// Start instants inside the current window, oldest first
    started: VecDeque<Instant>,
    /// Whether a drain task is alive
    processing: bool,
}

enum Next {
    Run(Job),
    Wait(Instant),
    Idle,
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_second` operation starts per second.
    ///
    /// A budget of zero is treated as one.
    pub fn new(max_per_second: u32) -> Self {
        Self {
            inner: Arc::new(Inner {
                max_per_second: max_per_second.max(1) as usize,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Configured budget
    pub fn max_per_second(&self) -> usize {
        self.inner.max_per_second
    }

    /// Enqueue an operation.
    ///
    /// The operation is queued immediately, so call order is execution order
    /// even if the returned futures are polled in a different order. The
    /// returned future resolves with the operation's own result, or with
    /// [`ChemError::Cancelled`] if the operation was dropped by [`clear`].
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// [`clear`]: RateLimiter::clear
    pub fn submit<F, Fut, T>(&self, operation: F) -> impl Future<Output = ChemResult<T>> + Send
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ChemResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || -> BoxFuture<'static, ()> {
            Box::pin(async move {
                let result = operation().await;
                // Receiver gone means the caller stopped waiting
                let _ = tx.send(result);
            })
        });
        self.enqueue(job);

        async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(ChemError::Cancelled),
            }
        }
    }

    /// Number of operations waiting to start
    pub fn queue_length(&self) -> usize {
        self.inner.state().queue.len()
    }

    /// Drop every operation that has not started yet.
    ///
    /// Returns the number of dropped operations. The in-flight operation, if
    /// any, is unaffected.
    pub fn clear(&self) -> usize {
        let dropped: Vec<Job> = self.inner.state().queue.drain(..).collect();
        let count = dropped.len();
        drop(dropped);
        if count > 0 {
            debug!("Rate limiter cleared {} pending operation(s)", count);
        }
        count
    }

    fn enqueue(&self, job: Job) {
        let mut state = self.inner.state();
        state.queue.push_back(job);
        trace!("Rate limiter queue length: {}", state.queue.len());

        if !state.processing {
            state.processing = true;
            drop(state);
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_per_second", &self.inner.max_per_second)
            .field("queue_length", &self.queue_length())
            .finish()
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(&self) -> Next {
        let mut state = self.state();
        let now = Instant::now();

        while let Some(&oldest) = state.started.front() {
            if now.duration_since(oldest) >= WINDOW {
                state.started.pop_front();
            } else {
                break;
            }
        }

        if state.queue.is_empty() {
            state.processing = false;
            return Next::Idle;
        }

        if state.started.len() >= self.max_per_second {
            if let Some(&oldest) = state.started.front() {
                return Next::Wait(oldest + WINDOW);
            }
        }

        match state.queue.pop_front() {
            Some(job) => {
                state.started.push_back(now);
                Next::Run(job)
            }
            None => {
                state.processing = false;
                Next::Idle
            }
        }
    }
}

/// Single processor: runs queued operations until the queue is empty.
async fn drain(inner: Arc<Inner>) {
    loop {
        match inner.next() {
            Next::Run(job) => {
                // A panicking operation must not take the processor down with it
                if let Err(e) = tokio::spawn(job()).await {
                    warn!("Rate-limited operation aborted: {}", e);
                }
            }
            Next::Wait(deadline) => {
                trace!("Rate budget exhausted, waiting for window");
                sleep_until(deadline).await;
            }
            Next::Idle => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::join_all;

    fn record_start(log: &Arc<Mutex<Vec<(usize, Instant)>>>, index: usize) {
        log.lock().unwrap().push((index, Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_in_submission_order() {
        let limiter = RateLimiter::new(10);
        let log = Arc::new(Mutex::new(Vec::new()));

        let futures: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                limiter.submit(move || async move {
                    record_start(&log, i);
                    Ok(i)
                })
            })
            .collect();

        let results: Vec<usize> = join_all(futures)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(results, (0..8).collect::<Vec<_>>());
        let order: Vec<usize> = log.lock().unwrap().iter().map(|(i, _)| *i).collect();
        assert_eq!(order, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_budget_in_any_window() {
        let limiter = RateLimiter::new(5);
        let log = Arc::new(Mutex::new(Vec::new()));
        let begin = Instant::now();

        let futures: Vec<_> = (0..12)
            .map(|i| {
                let log = Arc::clone(&log);
                limiter.submit(move || async move {
                    record_start(&log, i);
                    Ok(())
                })
            })
            .collect();
        join_all(futures).await;

        let starts: Vec<Instant> = log.lock().unwrap().iter().map(|(_, t)| *t).collect();
        assert_eq!(starts.len(), 12);
        for (i, window_start) in starts.iter().enumerate() {
            let in_window = starts[i..]
                .iter()
                .filter(|t| t.duration_since(*window_start) < WINDOW)
                .count();
            assert!(in_window <= 5, "window at #{} saw {} starts", i, in_window);
        }

        // 12 starts at 5/s need at least two full windows
        assert!(Instant::now().duration_since(begin) >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_block_queue() {
        let limiter = RateLimiter::new(5);

        let failing = limiter.submit(|| async { Err::<u32, _>(ChemError::remote("x", "boom")) });
        let passing = limiter.submit(|| async { Ok(2u32) });

        let failing = failing.await;
        assert!(matches!(failing, Err(ChemError::Remote { .. })));
        assert_eq!(passing.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_rejects_pending_operations() {
        let limiter = RateLimiter::new(1);

        let first = limiter.submit(|| async { Ok(1u32) });
        let second = limiter.submit(|| async { Ok(2u32) });
        let third = limiter.submit(|| async { Ok(3u32) });

        assert_eq!(first.await.unwrap(), 1);
        // Budget of one: the rest wait for the next window
        assert_eq!(limiter.queue_length(), 2);

        assert_eq!(limiter.clear(), 2);
        assert_eq!(limiter.queue_length(), 0);
        assert!(matches!(second.await, Err(ChemError::Cancelled)));
        assert!(matches!(third.await, Err(ChemError::Cancelled)));

        // Limiter keeps working after a clear
        let later = limiter.submit(|| async { Ok(4u32) });
        assert_eq!(later.await.unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_treated_as_one() {
        let limiter = RateLimiter::new(0);
        assert_eq!(limiter.max_per_second(), 1);
        assert_eq!(limiter.submit(|| async { Ok(7u8) }).await.unwrap(), 7);
    }
}
