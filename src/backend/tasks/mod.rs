//! Background Task Pool
//!
//! Bounded pool for fire-and-forget side effects, currently notification
//! creation. Work is queued on a bounded `mpsc` channel and drained by a
//! fixed number of worker tasks.
//!
//! # Overload
//!
//! `submit` never waits. A full queue or a pool that has been shut down
//! drops the task with a warning and returns `false`.
//!
//! # Failures
//!
//! A task that returns an error, or panics, is logged and dropped. Nothing
//! is retried.
//!
//! # Shutdown
//!
//! `shutdown()` closes the queue, lets the workers finish everything already
//! queued, and waits for them to exit.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, RwLock};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

struct Job {
    label: &'static str,
    future: BoxFuture<'static, Result<(), String>>,
}

/// Cloneable handle to the worker pool
#[derive(Clone)]
pub struct BackgroundTasks {
    queue: Arc<RwLock<Option<mpsc::Sender<Job>>>>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl BackgroundTasks {
    /// Spawn `worker_count` workers sharing a queue of `capacity` jobs
    ///
    /// Both values are clamped to at least 1.
    pub fn start(worker_count: usize, capacity: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (sender, receiver) = mpsc::channel::<Job>(capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..worker_count)
            .map(|worker| tokio::spawn(run_worker(worker, receiver.clone())))
            .collect();

        tracing::info!(worker_count, capacity, "[Tasks] Background pool started");

        Self {
            queue: Arc::new(RwLock::new(Some(sender))),
            workers: Arc::new(Mutex::new(workers)),
        }
    }

    /// Queue a task; returns `false` if it was dropped
    pub fn submit<F, E>(&self, label: &'static str, task: F) -> bool
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + 'static,
    {
        let sender = match self.queue.read() {
            Ok(queue) => queue.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let Some(sender) = sender else {
            tracing::warn!(task = label, "[Tasks] Pool shut down, dropping task");
            return false;
        };

        let job = Job {
            label,
            future: task.map(|result| result.map_err(|e| e.to_string())).boxed(),
        };

        match sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                tracing::warn!(task = job.label, "[Tasks] Queue full, dropping task");
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(task = job.label, "[Tasks] Queue closed, dropping task");
                false
            }
        }
    }

    /// Close the queue and wait for queued work to finish
    pub async fn shutdown(&self) {
        let sender = match self.queue.write() {
            Ok(mut queue) => queue.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);

        let workers = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "[Tasks] Worker ended abnormally");
            }
        }

        tracing::info!("[Tasks] Background pool stopped");
    }
}

async fn run_worker(worker: usize, receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Job>>>) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else {
            break;
        };

        match AssertUnwindSafe(job.future).catch_unwind().await {
            Ok(Ok(())) => tracing::debug!(worker, task = job.label, "[Tasks] Task finished"),
            Ok(Err(e)) => tracing::warn!(worker, task = job.label, error = %e, "[Tasks] Task failed"),
            Err(_) => tracing::error!(worker, task = job.label, "[Tasks] Task panicked"),
        }
    }
    tracing::debug!(worker, "[Tasks] Worker exiting");
}
