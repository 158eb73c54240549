//! Parallel map with per-task timeouts and ordered collection.
//!
//! Every item gets its own task. Each task reports back over its own
//! bounded channel, and the dispatcher waits on those channels in input
//! order, each wait bounded by the timeout. The first failing task cancels a
//! token shared by its siblings so cooperative tasks can stop early; their
//! results are discarded either way.

use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::TASK_THREAD_PREFIX;
use crate::error::NumError;
use crate::options::{Dispatch, MapOptions};
use crate::progress::{CancellationToken, ChildToken};

/// What a single task reports back to the dispatcher.
enum Outcome<R> {
    Done(R),
    Failed(String),
    Cancelled,
}

/// State shared by the dispatcher and all tasks of one call.
struct Shared {
    token: ChildToken,
    first_failure: Mutex<Option<NumError>>,
}

impl Shared {
    fn new(cancel: &CancellationToken) -> Self {
        Self {
            token: cancel.child(),
            first_failure: Mutex::new(None),
        }
    }

    fn record_failure(&self, err: NumError) {
        {
            let mut slot = self.first_failure.lock();
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.token.cancel();
    }

    /// Error to report when a task stopped because the token was cancelled.
    fn failure_or_cancelled(&self) -> NumError {
        self.first_failure
            .lock()
            .clone()
            .unwrap_or(NumError::Cancelled)
    }
}

/// Apply `f` to every item concurrently, one task per item.
///
/// Results are returned in input order. Each wait for a task's result is
/// bounded by `timeout`; if any task misses it the whole call fails with
/// [`NumError::Timeout`]. A panic inside `f` is reported as
/// [`NumError::TaskFailure`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use numkit_core::parallel::parallel_map;
///
/// let squares = parallel_map(vec![1, 2], |x: i32| x * x, Duration::from_secs(1)).unwrap();
/// assert_eq!(squares, vec![1, 4]);
/// ```
pub fn parallel_map<I, T, R, F>(items: I, f: F, timeout: Duration) -> Result<Vec<R>, NumError>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    dispatch(
        items.into_iter().collect(),
        move |item, _: &ChildToken| Outcome::Done(f(item)),
        &MapOptions::with_timeout(timeout),
        &CancellationToken::new(),
    )
}

/// Like [`parallel_map`], for functions that can fail.
///
/// The first failure found in input order is returned as
/// [`NumError::TaskFailure`] carrying the error's display text.
pub fn try_parallel_map<I, T, R, E, F>(
    items: I,
    f: F,
    timeout: Duration,
) -> Result<Vec<R>, NumError>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    R: Send + 'static,
    E: Display,
    F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
{
    dispatch(
        items.into_iter().collect(),
        move |item, _: &ChildToken| match f(item) {
            Ok(value) => Outcome::Done(value),
            Err(e) => Outcome::Failed(e.to_string()),
        },
        &MapOptions::with_timeout(timeout),
        &CancellationToken::new(),
    )
}

/// Fully configurable parallel map.
///
/// `f` receives a token that is cancelled when a sibling fails, times out,
/// or `cancel` itself is cancelled. Returning `Err(NumError::Cancelled)` from
/// `f` marks the task as stopped rather than failed.
pub fn parallel_map_with<I, T, R, F>(
    items: I,
    f: F,
    opts: &MapOptions,
    cancel: &CancellationToken,
) -> Result<Vec<R>, NumError>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T, &ChildToken) -> Result<R, NumError> + Send + Sync + 'static,
{
    dispatch(
        items.into_iter().collect(),
        move |item, token: &ChildToken| match f(item, token) {
            Ok(value) => Outcome::Done(value),
            Err(NumError::Cancelled) => Outcome::Cancelled,
            Err(e) => Outcome::Failed(e.to_string()),
        },
        opts,
        cancel,
    )
}

fn dispatch<T, R, F>(
    items: Vec<T>,
    f: F,
    opts: &MapOptions,
    cancel: &CancellationToken,
) -> Result<Vec<R>, NumError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T, &ChildToken) -> Outcome<R> + Send + Sync + 'static,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    cancel.check_cancelled()?;

    debug!(
        items = total,
        dispatch = ?opts.dispatch,
        timeout = ?opts.timeout,
        "dispatching parallel map"
    );

    let shared = Arc::new(Shared::new(cancel));
    if opts.dispatch == Dispatch::Sequential {
        return run_sequential(items, &f, &shared);
    }

    // Pool tasks queued from a pool worker could wait behind the blocked
    // dispatcher forever, so nested calls get their own threads.
    let dispatch = match opts.dispatch {
        Dispatch::Pool if rayon::current_thread_index().is_some() => {
            debug!("already on a pool worker, dispatching to threads");
            Dispatch::Threads
        }
        other => other,
    };

    let f = Arc::new(f);
    let mut receivers = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        let (tx, rx) = bounded(1);
        let task_f = Arc::clone(&f);
        let task_shared = Arc::clone(&shared);
        let job = move || {
            let outcome = run_task(index, item, task_f.as_ref(), &task_shared);
            // The dispatcher may have stopped listening already.
            let _ = tx.send(outcome);
        };

        match dispatch {
            Dispatch::Pool => rayon::spawn(job),
            Dispatch::Threads | Dispatch::Sequential => {
                thread::Builder::new()
                    .name(format!("{TASK_THREAD_PREFIX}-{index}"))
                    .spawn(job)
                    .map_err(|e| {
                        shared.token.cancel();
                        NumError::TaskFailure {
                            index,
                            message: format!("failed to spawn task thread: {e}"),
                        }
                    })?;
            }
        }
        receivers.push(rx);
    }

    collect_in_order(receivers, opts.timeout, &shared)
}

fn run_task<T, R, F>(index: usize, item: T, f: &F, shared: &Shared) -> Outcome<R>
where
    F: Fn(T, &ChildToken) -> Outcome<R>,
{
    if shared.token.is_cancelled() {
        return Outcome::Cancelled;
    }

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| f(item, &shared.token))) {
        Ok(outcome) => outcome,
        Err(payload) => Outcome::Failed(panic_message(payload.as_ref())),
    };

    if let Outcome::Failed(message) = &outcome {
        debug!(index, %message, "parallel task failed");
        shared.record_failure(NumError::TaskFailure {
            index,
            message: message.clone(),
        });
    }
    outcome
}

fn run_sequential<T, R, F>(items: Vec<T>, f: &F, shared: &Shared) -> Result<Vec<R>, NumError>
where
    F: Fn(T, &ChildToken) -> Outcome<R>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match run_task(index, item, f, shared) {
            Outcome::Done(value) => Ok(value),
            Outcome::Failed(message) => Err(NumError::TaskFailure { index, message }),
            Outcome::Cancelled => Err(shared.failure_or_cancelled()),
        })
        .collect()
}

fn collect_in_order<R>(
    receivers: Vec<Receiver<Outcome<R>>>,
    timeout: Duration,
    shared: &Shared,
) -> Result<Vec<R>, NumError> {
    let mut results = Vec::with_capacity(receivers.len());
    for (index, rx) in receivers.into_iter().enumerate() {
        match rx.recv_timeout(timeout) {
            Ok(Outcome::Done(value)) => results.push(value),
            Ok(Outcome::Failed(message)) => return Err(NumError::TaskFailure { index, message }),
            Ok(Outcome::Cancelled) => return Err(shared.failure_or_cancelled()),
            Err(RecvTimeoutError::Timeout) => {
                warn!(index, ?timeout, "parallel task timed out");
                shared.token.cancel();
                return Err(NumError::Timeout { index, timeout });
            }
            Err(RecvTimeoutError::Disconnected) => {
                shared.token.cancel();
                return Err(NumError::TaskFailure {
                    index,
                    message: "task exited without reporting a result".to_string(),
                });
            }
        }
    }
    Ok(results)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Barrier;
    use std::time::Instant;

    const GENEROUS: Duration = Duration::from_secs(10);

    fn wait_for(flag: &AtomicBool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if flag.load(Ordering::SeqCst) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn squares_two_items() {
        let result = parallel_map(vec![1, 2], |x: i64| x * x, Duration::from_millis(1000));
        assert_eq!(result, Ok(vec![1, 4]));
    }

    #[test]
    fn empty_input() {
        let result = parallel_map(Vec::<u32>::new(), |x| x + 1, GENEROUS).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn preserves_input_order_when_completion_order_differs() {
        // Earlier items sleep longer, so they finish last.
        let items: Vec<u64> = (0..6).collect();
        let result = parallel_map(
            items,
            |i| {
                thread::sleep(Duration::from_millis((6 - i) * 15));
                i * 10
            },
            GENEROUS,
        )
        .unwrap();
        assert_eq!(result, vec![0, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn slow_task_times_out() {
        let start = Instant::now();
        let result = parallel_map(
            vec![0u64, 1],
            |i| {
                if i == 1 {
                    thread::sleep(Duration::from_millis(500));
                }
                i
            },
            Duration::from_millis(50),
        );
        assert_eq!(
            result,
            Err(NumError::Timeout {
                index: 1,
                timeout: Duration::from_millis(50),
            })
        );
        assert!(start.elapsed() < Duration::from_millis(450));
    }

    #[test]
    fn failing_function_reports_task_failure() {
        let result = try_parallel_map(
            vec![1, 2, 3],
            |x: i32| if x == 2 { Err("two is not allowed") } else { Ok(x) },
            GENEROUS,
        );
        assert_eq!(
            result,
            Err(NumError::TaskFailure {
                index: 1,
                message: "two is not allowed".into(),
            })
        );
    }

    #[test]
    fn panic_is_reported_as_task_failure() {
        let result = parallel_map(
            vec![0, 1],
            |x: i32| {
                assert!(x != 1, "bad item");
                x
            },
            GENEROUS,
        );
        match result {
            Err(NumError::TaskFailure { index, message }) => {
                assert_eq!(index, 1);
                assert!(message.contains("bad item"), "message was {message}");
            }
            other => panic!("expected task failure, got {other:?}"),
        }
    }

    #[test]
    fn failure_cancels_cooperative_siblings() {
        let observed = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&observed);
        // Task 0 only fails once task 1 is running.
        let started = Arc::new(Barrier::new(2));
        let result = parallel_map_with(
            vec![0, 1],
            move |i: i32, token: &ChildToken| -> Result<i32, NumError> {
                started.wait();
                if i == 0 {
                    return Err(NumError::InvalidInterval("first item".into()));
                }
                while !token.is_cancelled() {
                    thread::sleep(Duration::from_millis(1));
                }
                seen.store(true, Ordering::SeqCst);
                Err(NumError::Cancelled)
            },
            &MapOptions::with_timeout(GENEROUS),
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(NumError::TaskFailure { index: 0, .. })));
        assert!(wait_for(&observed));
    }

    #[test]
    fn later_failure_is_reported_over_cancelled_earlier_task() {
        let result = parallel_map_with(
            vec![0, 1],
            |i: i32, token: &ChildToken| -> Result<i32, NumError> {
                if i == 1 {
                    return Err(NumError::InvalidInterval("second item".into()));
                }
                while !token.is_cancelled() {
                    thread::sleep(Duration::from_millis(1));
                }
                Err(NumError::Cancelled)
            },
            &MapOptions::with_timeout(GENEROUS),
            &CancellationToken::new(),
        );
        match result {
            Err(NumError::TaskFailure { index, message }) => {
                assert_eq!(index, 1);
                assert!(message.contains("second item"));
            }
            other => panic!("expected task failure, got {other:?}"),
        }
    }

    #[test]
    fn cancelled_parent_fails_fast() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = parallel_map_with(
            vec![1, 2],
            |x: i32, _: &ChildToken| Ok(x),
            &MapOptions::default(),
            &cancel,
        );
        assert_eq!(result, Err(NumError::Cancelled));
    }

    #[test]
    fn pool_dispatch() {
        let opts = MapOptions {
            timeout: GENEROUS,
            dispatch: Dispatch::Pool,
        };
        let result = parallel_map_with(
            (1..=20).collect::<Vec<u64>>(),
            |x, _: &ChildToken| Ok(x * 2),
            &opts,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(result, (1..=20).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn pool_dispatch_from_inside_a_busy_pool() {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let opts = MapOptions {
            timeout: Duration::from_secs(2),
            dispatch: Dispatch::Pool,
        };
        let result = pool.install(|| {
            parallel_map_with(
                vec![1u64, 2],
                |x, _: &ChildToken| Ok(x * x),
                &opts,
                &CancellationToken::new(),
            )
        });
        assert_eq!(result, Ok(vec![1, 4]));
    }

    #[test]
    fn sequential_dispatch_stops_at_first_failure() {
        let opts = MapOptions {
            timeout: GENEROUS,
            dispatch: Dispatch::Sequential,
        };
        let result = parallel_map_with(
            vec![1, 2, 3],
            |x: i32, _: &ChildToken| {
                if x >= 2 {
                    Err(NumError::InvalidInterval(format!("item {x}")))
                } else {
                    Ok(x)
                }
            },
            &opts,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(NumError::TaskFailure { index: 1, .. })));
    }

    #[test]
    fn threads_are_named() {
        let names = parallel_map(
            vec![0, 1],
            |_: i32| thread::current().name().map(str::to_string),
            GENEROUS,
        )
        .unwrap();
        assert_eq!(names[0].as_deref(), Some("numkit-task-0"));
        assert_eq!(names[1].as_deref(), Some("numkit-task-1"));
    }
}
