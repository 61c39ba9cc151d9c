//! Recurring background jobs with cancellation.
//!
//! Each `RecurringTask` owns one thread. The thread runs the job, then waits
//! on a stop channel with a timeout equal to the interval, so a cancel is
//! seen immediately instead of after the next tick. Dropping the handle
//! cancels the task.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::logging::{self, DataSource};

pub struct RecurringTask {
    name: String,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RecurringTask {
    /// Runs `job` now and then every `interval` until cancelled.
    pub fn spawn<F>(name: &str, interval: Duration, mut job: F) -> std::io::Result<RecurringTask>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread_name = name.to_string();

        let handle = thread::Builder::new().name(thread_name.clone()).spawn(move || {
            loop {
                job();
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            logging::debug(DataSource::System, Some(thread_name.as_str()), "recurring task stopped");
        })?;

        logging::debug(
            DataSource::System,
            Some(name),
            &format!("recurring task started, every {}s", interval.as_secs_f64()),
        );

        Ok(RecurringTask {
            name: name.to_string(),
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the task and waits for an in-flight run to finish.
    pub fn cancel(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                logging::error(DataSource::System, Some(self.name.as_str()), "recurring task panicked");
            }
        }
    }
}

impl Drop for RecurringTask {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(interval_ms: u64) -> (RecurringTask, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let task = RecurringTask::spawn("test-task", Duration::from_millis(interval_ms), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .expect("thread should spawn");
        (task, count)
    }

    #[test]
    fn test_job_runs_repeatedly() {
        let (task, count) = counting_task(10);
        thread::sleep(Duration::from_millis(150));
        assert!(task.is_running());
        task.cancel();
        assert!(count.load(Ordering::SeqCst) >= 2, "expected several ticks");
    }

    #[test]
    fn test_no_runs_after_cancel() {
        let (task, count) = counting_task(10);
        thread::sleep(Duration::from_millis(50));
        task.cancel();
        let after_cancel = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(60));
        assert_eq!(count.load(Ordering::SeqCst), after_cancel);
    }

    #[test]
    fn test_cancel_does_not_wait_for_next_tick() {
        let (task, count) = counting_task(60_000);
        thread::sleep(Duration::from_millis(20));
        let started = std::time::Instant::now();
        task.cancel();
        assert!(started.elapsed() < Duration::from_secs(5), "cancel should be prompt");
        assert_eq!(count.load(Ordering::SeqCst), 1, "job runs once immediately");
    }

    #[test]
    fn test_drop_cancels() {
        let (task, count) = counting_task(10);
        thread::sleep(Duration::from_millis(30));
        drop(task);
        let after_drop = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(40));
        assert_eq!(count.load(Ordering::SeqCst), after_drop);
    }
}
