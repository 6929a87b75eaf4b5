// src/processing/parallel.rs
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use flume::{Receiver, Sender};
use itertools::Itertools;
use log::debug;
use parking_lot::Mutex;

use crate::error::{EngineError, Result};

/// Shared flag a caller flips to abandon an in-flight request
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has been cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

struct YearRequest {
    year: i32,
}

/// Fixed-size pool fanning independent per-year jobs out over worker threads
pub struct YearPool {
    threads: usize,
}

impl YearPool {
    pub fn new(threads: Option<usize>) -> Self {
        let threads = threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or_else(|_| num_cpus::get())
        });

        Self {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `job` once per year and return the results in ascending year order.
    ///
    /// The first failing year stops the remaining ones and its error is returned.
    /// A cancelled token discards everything computed so far.
    pub fn run<T, F>(&self, years: &[i32], cancel: &CancelToken, job: F) -> Result<Vec<(i32, T)>>
    where
        T: Send,
        F: Fn(i32) -> Result<T> + Sync,
    {
        let (req_tx, req_rx): (Sender<YearRequest>, Receiver<YearRequest>) = flume::unbounded();
        let (res_tx, res_rx) = flume::unbounded();
        let failure: Mutex<Option<EngineError>> = Mutex::new(None);

        for &year in years {
            req_tx
                .send(YearRequest { year })
                .map_err(|_| EngineError::Cancelled)?;
        }
        drop(req_tx);

        let workers = self.threads.min(years.len().max(1));
        thread::scope(|scope| {
            for worker_id in 0..workers {
                let req_rx = req_rx.clone();
                let res_tx = res_tx.clone();
                let failure = &failure;
                let job = &job;

                scope.spawn(move || {
                    for request in req_rx {
                        if cancel.is_cancelled() || failure.lock().is_some() {
                            break;
                        }

                        debug!("worker {} building year {}", worker_id, request.year);
                        match job(request.year) {
                            Ok(value) => {
                                // Receiver outlives the scope
                                let _ = res_tx.send((request.year, value));
                            }
                            Err(e) => {
                                let mut slot = failure.lock();
                                if slot.is_none() {
                                    *slot = Some(e);
                                }
                                break;
                            }
                        }
                    }
                });
            }
        });
        drop(res_tx);

        if let Some(e) = failure.into_inner() {
            return Err(e);
        }
        cancel.check()?;

        let results: Vec<(i32, T)> = res_rx
            .into_iter()
            .sorted_by_key(|(year, _)| *year)
            .collect();

        if results.len() != years.len() {
            return Err(EngineError::Cancelled);
        }
        Ok(results)
    }
}
