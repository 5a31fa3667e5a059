//! Host Event Loop
//!
//! The UI owns an event loop; tokens arrive on a background I/O thread.
//! Writes are handed to the loop through this seam so the dispatcher never
//! touches UI state from the wrong thread.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tokio::sync::mpsc;
use tracing::debug;

/// A unit of work to run on the host loop
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling context a dispatcher can hand writes to
pub trait EventLoop: Send + Sync {
    /// Whether the loop is currently being driven
    fn is_running(&self) -> bool;

    /// Queue a job from any thread without waiting for it
    fn submit(&self, job: Job) -> Result<()>;

    /// Drive the idle loop until the job has run
    fn run_until_complete(&self, job: Job) -> Result<()>;
}

/// Schedule a job on the event loop, thread-safe.
///
/// With no loop the job runs directly on the calling thread, and the caller
/// is responsible for thread-safety.
pub fn schedule_threadsafe(job: Job, event_loop: Option<&dyn EventLoop>) -> Result<()> {
    match event_loop {
        None => {
            job();
            Ok(())
        }
        Some(el) if el.is_running() => el.submit(job),
        Some(el) => el.run_until_complete(job),
    }
}

/// Event loop backed by a tokio runtime
///
/// Submitted jobs go through a single FIFO queue drained by one pump task,
/// so they execute in submission order.
///
/// A multi-thread runtime drives itself and is always running. A
/// current-thread runtime only runs while its owner is inside
/// [`TokioEventLoop::block_on`] (or holds the guard from
/// [`TokioEventLoop::enter`]), whichever thread asks.
pub struct TokioEventLoop {
    handle: Handle,
    queue: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    driven: AtomicBool,
}

/// Marks a [`TokioEventLoop`] as driven until dropped
#[must_use = "the loop is only marked running while the guard is alive"]
pub struct RunningGuard<'a> {
    driven: &'a AtomicBool,
    previous: bool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.driven.store(self.previous, Ordering::SeqCst);
    }
}

impl TokioEventLoop {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            queue: Mutex::new(None),
            driven: AtomicBool::new(false),
        }
    }

    /// Bind to the runtime the caller is running in
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::Schedule(format!("No tokio runtime available: {}", e)))
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Mark the loop as driven for as long as the guard lives.
    ///
    /// Wrap the host's own `Runtime::block_on` with this when it does not go
    /// through [`TokioEventLoop::block_on`].
    pub fn enter(&self) -> RunningGuard<'_> {
        let previous = self.driven.swap(true, Ordering::SeqCst);
        RunningGuard {
            driven: &self.driven,
            previous,
        }
    }

    /// Drive `runtime` with `future` on the calling thread, the loop counting
    /// as running until it returns. `runtime` must be the one this loop was
    /// built from.
    pub fn block_on<F: Future>(&self, runtime: &Runtime, future: F) -> F::Output {
        let _running = self.enter();
        runtime.block_on(future)
    }

    fn sender(&self) -> mpsc::UnboundedSender<Job> {
        let mut queue = self.queue.lock();
        match queue.as_ref() {
            Some(tx) if !tx.is_closed() => tx.clone(),
            _ => {
                // First use, or the previous pump died with a panicking job
                let (tx, rx) = mpsc::unbounded_channel();
                self.handle.spawn(pump(rx));
                debug!("Started event loop pump");
                *queue = Some(tx.clone());
                tx
            }
        }
    }
}

async fn pump(mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        job();
    }
}

impl EventLoop for TokioEventLoop {
    fn is_running(&self) -> bool {
        match self.handle.runtime_flavor() {
            RuntimeFlavor::CurrentThread => self.driven.load(Ordering::SeqCst),
            _ => true,
        }
    }

    fn submit(&self, job: Job) -> Result<()> {
        self.sender()
            .send(job)
            .map_err(|_| Error::Schedule("Event loop queue is closed".to_string()))
    }

    fn run_until_complete(&self, job: Job) -> Result<()> {
        if Handle::try_current().is_ok() {
            return Err(Error::Schedule(
                "Cannot block on the event loop from inside an async context".to_string(),
            ));
        }
        self.handle.block_on(async move { job() });
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualLoop;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counter_job(counter: &Arc<AtomicUsize>) -> Job {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_no_loop_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        schedule_threadsafe(counter_job(&counter), None).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_running_loop_receives_submission() {
        let el = ManualLoop::running();
        let counter = Arc::new(AtomicUsize::new(0));

        schedule_threadsafe(counter_job(&counter), Some(&el)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(el.drain(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(*el.blocking_runs.lock(), 0);
    }

    #[test]
    fn test_idle_loop_runs_to_completion() {
        let el = ManualLoop::default();
        let counter = Arc::new(AtomicUsize::new(0));

        schedule_threadsafe(counter_job(&counter), Some(&el)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(*el.blocking_runs.lock(), 1);
        assert!(el.queued.lock().is_empty());
    }

    #[test]
    fn test_tokio_loop_preserves_submission_order() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()
            .unwrap();
        let el = TokioEventLoop::new(rt.handle().clone());
        assert!(el.is_running());

        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..200 {
            let seen = seen.clone();
            el.submit(Box::new(move || seen.lock().push(i))).unwrap();
        }

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        el.submit(Box::new(move || {
            let _ = done_tx.send(());
        }))
        .unwrap();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(*seen.lock(), (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_tokio_loop_submit_from_other_thread() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("host-loop")
            .build()
            .unwrap();
        let el = Arc::new(TokioEventLoop::new(rt.handle().clone()));
        let (tx, rx) = std::sync::mpsc::channel();

        let worker = {
            let el = el.clone();
            std::thread::spawn(move || {
                el.submit(Box::new(move || {
                    let _ = tx.send(std::thread::current().name().map(str::to_string));
                }))
            })
        };
        worker.join().unwrap().unwrap();

        let ran_on = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(ran_on.as_deref(), Some("host-loop"));
    }

    #[test]
    fn test_driven_current_thread_loop_runs_jobs_on_its_own_thread() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let el = Arc::new(TokioEventLoop::new(rt.handle().clone()));
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (ran_tx, ran_rx) = tokio::sync::oneshot::channel();

        let ui = {
            let el = el.clone();
            std::thread::Builder::new()
                .name("ui-thread".to_string())
                .spawn(move || {
                    el.block_on(&rt, async move {
                        let _ = ready_tx.send(());
                        ran_rx.await.ok().flatten()
                    })
                })
                .unwrap()
        };

        let io = {
            let el = el.clone();
            std::thread::Builder::new()
                .name("io-thread".to_string())
                .spawn(move || {
                    ready_rx.recv_timeout(Duration::from_secs(5)).unwrap();
                    let running = el.is_running();
                    let job: Job = Box::new(move || {
                        let _ = ran_tx.send(std::thread::current().name().map(str::to_string));
                    });
                    schedule_threadsafe(job, Some(el.as_ref())).unwrap();
                    running
                })
                .unwrap()
        };

        assert!(io.join().unwrap());
        assert_eq!(ui.join().unwrap().as_deref(), Some("ui-thread"));
        assert!(!el.is_running());
    }

    #[test]
    fn test_enter_guard_marks_current_thread_loop_running() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let el = TokioEventLoop::new(rt.handle().clone());
        assert!(!el.is_running());
        {
            let _running = el.enter();
            assert!(el.is_running());
            let _nested = el.enter();
            assert!(el.is_running());
        }
        assert!(!el.is_running());
    }

    #[test]
    fn test_idle_current_thread_runtime_blocks() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let el = TokioEventLoop::new(rt.handle().clone());
        assert!(!el.is_running());

        let counter = Arc::new(AtomicUsize::new(0));
        schedule_threadsafe(counter_job(&counter), Some(&el)).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blocking_inside_runtime_is_refused() {
        let el = TokioEventLoop::current().unwrap();
        assert!(!el.is_running());

        let counter = Arc::new(AtomicUsize::new(0));
        let err = el.run_until_complete(counter_job(&counter)).unwrap_err();
        assert!(matches!(err, Error::Schedule(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_current_without_runtime() {
        assert!(matches!(TokioEventLoop::current(), Err(Error::Schedule(_))));
    }
}
