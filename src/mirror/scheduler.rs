//! Directory worker fan-out and join.
//!
//! Every subdirectory found by a traversal becomes one worker task. Tasks run
//! on a bounded rayon pool, so the number of workers executing at once never
//! exceeds [`MirrorOptions::parallel`](crate::MirrorOptions::parallel) no
//! matter how wide or deep the tree is.
//!
//! A directory level spawns its workers inside [`fan_out`]. The call does not
//! return until every worker spawned at that level has finished; each worker
//! hands its [`WorkerReport`] back over a channel owned by the level, and
//! nothing else is shared between a worker and its parent.

use super::tree::MirrorStats;
use crate::error::Result;
use crate::options::MirrorOptions;
use rayon::Scope;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

/// Thread pool that directory workers run on.
pub(crate) struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Build a pool sized by `options.parallel`.
    ///
    /// Reuses the global rayon pool when it already has the requested size or
    /// when building a dedicated pool fails.
    pub(crate) fn new(options: &MirrorOptions) -> Self {
        if options.parallel == rayon::current_num_threads() {
            return Self { pool: None };
        }

        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.parallel)
            .thread_name(|i| format!("treemirror-worker-{i}"))
            .build()
        {
            Ok(pool) => Self { pool: Some(pool) },
            Err(e) => {
                options.warn(&format!(
                    "Failed to create thread pool ({e}), using global pool"
                ));
                Self { pool: None }
            }
        }
    }

    /// Run `op` with this pool as the active one.
    pub(crate) fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Terminal status of one directory worker.
#[derive(Debug)]
pub(crate) struct WorkerReport {
    /// Source directory the worker mirrored
    pub src: PathBuf,
    pub result: Result<MirrorStats>,
}

/// Handle a directory level uses to start its subdirectory workers.
pub(crate) struct Spawner<'a, 'scope> {
    scope: &'a Scope<'scope>,
    tx: Sender<WorkerReport>,
    spawned: u64,
}

impl<'scope> Spawner<'_, 'scope> {
    /// Start a worker for the subdirectory `src`.
    pub(crate) fn spawn<F>(&mut self, src: PathBuf, work: F)
    where
        F: FnOnce() -> Result<MirrorStats> + Send + 'scope,
    {
        let tx = self.tx.clone();
        self.spawned += 1;
        self.scope.spawn(move |_| {
            let result = work();
            // The receiver lives until the level has joined.
            let _ = tx.send(WorkerReport { src, result });
        });
    }

    /// Workers started so far at this level.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn spawned(&self) -> u64 {
        self.spawned
    }
}

/// Run one directory level, then wait for every worker it spawned.
///
/// Returns the level's own output together with one report per spawned
/// worker, in completion order.
pub(crate) fn fan_out<'scope, T, F>(level: F) -> (T, Vec<WorkerReport>)
where
    F: for<'a> FnOnce(&mut Spawner<'a, 'scope>) -> T + Send,
    T: Send,
{
    let (tx, rx) = mpsc::channel();
    let out = rayon::scope(|scope| {
        let mut spawner = Spawner {
            scope,
            tx,
            spawned: 0,
        };
        level(&mut spawner)
    });
    // rayon::scope has joined every task, so all senders are gone.
    (out, rx.into_iter().collect())
}

/// Fold joined worker reports into the parent's stats.
///
/// A failed worker counts as one worker and one failure; its partial
/// counters are not recoverable and are dropped. Each failure is reported
/// through the warn handler, message first, then the worker's directory.
pub(crate) fn join_into(stats: &mut MirrorStats, reports: Vec<WorkerReport>, options: &MirrorOptions) {
    for report in reports {
        match report.result {
            Ok(child) => stats.absorb(&child),
            Err(e) => {
                stats.workers += 1;
                stats.failed_workers += 1;
                if e.is_no_space() {
                    stats.out_of_space_failures += 1;
                }
                options.warn(&format!(
                    "{} (worker for {})",
                    e.full_message(),
                    report.src.display()
                ));
            }
        }
    }
}
