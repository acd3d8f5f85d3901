//! Fixed-size worker pool.
//!
//! Backed by a `rayon::ThreadPool` with exactly `nb_threads` threads. Each
//! spawned job is a long-running worker loop, so at most `nb_threads` loops
//! make progress at once. A pending-job counter plus a condvar implement
//! [`WorkerPool::join`]; `Drop` joins as well, so the pool can never be torn
//! down while a worker is still running. A panic inside a job aborts the
//! process (rayon's default for `spawn`), which keeps the writer from waiting
//! on a slot that will never be settled.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use rayon::ThreadPool as RayonPool;

use crate::error::TzipError;

type JobFn = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
    pending: usize, // spawned-but-not-yet-finished jobs
}

pub struct WorkerPool {
    pool: RayonPool,
    state: Arc<(Mutex<PoolState>, Condvar)>,
    nb_threads: usize,
}

impl WorkerPool {
    /// Builds a pool of `nb_threads` threads named `tzip-worker-N`.
    pub fn new(nb_threads: usize) -> Result<Self, TzipError> {
        if nb_threads == 0 {
            return Err(TzipError::Pool("at least one thread is required".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(nb_threads)
            .thread_name(|i| format!("tzip-worker-{i}"))
            .build()
            .map_err(|e| TzipError::Pool(e.to_string()))?;

        Ok(WorkerPool {
            pool,
            state: Arc::new((Mutex::new(PoolState { pending: 0 }), Condvar::new())),
            nb_threads,
        })
    }

    pub fn nb_threads(&self) -> usize {
        self.nb_threads
    }

    pub fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn_boxed(Box::new(job));
    }

    fn spawn_boxed(&self, job: JobFn) {
        // Count before spawning so `join` cannot observe zero between the
        // spawn and the start of the job.
        {
            let (lock, _cvar) = &*self.state;
            let mut s = lock.lock().unwrap_or_else(PoisonError::into_inner);
            s.pending += 1;
        }

        let state = Arc::clone(&self.state);
        self.pool.spawn(move || {
            job();

            let (lock, cvar) = &*state;
            let mut s = lock.lock().unwrap_or_else(PoisonError::into_inner);
            s.pending -= 1;
            if s.pending == 0 {
                cvar.notify_all();
            }
        });
    }

    /// Blocks until every spawned job has returned. The pool stays usable.
    pub fn join(&self) {
        let (lock, cvar) = &*self.state;
        let mut s = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while s.pending > 0 {
            s = cvar.wait(s).unwrap_or_else(PoisonError::into_inner);
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        let (lock, _cvar) = &*self.state;
        lock.lock().unwrap_or_else(PoisonError::into_inner).pending
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join();
        // rayon::ThreadPool::drop then shuts its threads down.
    }
}
