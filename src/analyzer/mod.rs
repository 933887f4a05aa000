//! Crawl-and-aggregate engine.
//!
//! Each file path is sent to a [`BlameSource`], the resulting per-author
//! line counts are folded through an optional [`UserMapper`], and the
//! result is written to an [`EditorStorage`]. With more than one worker,
//! paths are fed through a bounded channel to a fixed pool of threads.
//! Blame failures are stored as messages and never abort the run.

pub mod store;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam::channel;
use parking_lot::Mutex;

use crate::error::OwnershipError;
use crate::identity::UserMapper;

/// Attributed line count per author.
pub type Editors = BTreeMap<String, usize>;

/// Per-file line attribution oracle.
///
/// Implementations must tolerate concurrent calls for different paths.
pub trait BlameSource: Send + Sync {
    /// Line counts per raw author identifier, or a failure message.
    fn editors_by_file(&self, path: &str) -> Result<Editors, String>;
}

/// Sink for per-file analysis results.
pub trait EditorStorage: Send + Sync {
    fn set_file_editors(&self, path: &str, editors: Option<Editors>, error: String);
}

/// Number of workers used when none is configured.
pub fn default_concurrency() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(1)
}

/// Fold raw author counts under mapped names, summing collisions.
pub fn map_editors(mapper: &dyn UserMapper, editors: Editors) -> Editors {
    let mut mapped = Editors::new();
    for (user_id, lines) in editors {
        *mapped.entry(mapper.display_name(&user_id)).or_default() += lines;
    }
    mapped
}

pub struct Analyzer<'a> {
    blame: &'a dyn BlameSource,
    storage: &'a dyn EditorStorage,
    mapper: Option<&'a dyn UserMapper>,
    // Held while mapping identities and storing a file's result.
    commit: Mutex<()>,
    completed: AtomicUsize,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        blame: &'a dyn BlameSource,
        storage: &'a dyn EditorStorage,
        mapper: Option<&'a dyn UserMapper>,
    ) -> Self {
        Self {
            blame,
            storage,
            mapper,
            commit: Mutex::new(()),
            completed: AtomicUsize::new(0),
        }
    }

    /// Files finished so far, across all calls.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Analyze `paths` with up to `concurrency` workers.
    ///
    /// Only a worker thread failure is returned as an error; per-file blame
    /// failures end up in the storage.
    pub fn analyze_files(
        &self,
        paths: &[String],
        concurrency: usize,
    ) -> Result<(), OwnershipError> {
        log::info!(
            "analyzing {} files with {} worker(s)",
            paths.len(),
            concurrency.max(1)
        );
        let before = self.completed();
        if concurrency <= 1 || paths.len() <= 1 {
            for path in paths {
                self.process(path, paths.len());
            }
        } else {
            self.analyze_parallel(paths, concurrency)?;
        }
        log::info!("analysis finished: {} files", self.completed() - before);
        Ok(())
    }

    fn analyze_parallel(&self, paths: &[String], workers: usize) -> Result<(), OwnershipError> {
        let total = paths.len();
        let (tx, rx) = channel::bounded::<&str>(workers * 2);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for idx in 0..workers {
                let rx = rx.clone();
                let handle = thread::Builder::new()
                    .name(format!("blame-worker-{idx}"))
                    .spawn_scoped(scope, move || {
                        for path in rx.iter() {
                            self.process(path, total);
                        }
                    })?;
                handles.push(handle);
            }
            // Workers exit once the sender is gone and the queue drained.
            drop(rx);

            for path in paths {
                if tx.send(path.as_str()).is_err() {
                    break;
                }
            }
            drop(tx);

            for (idx, handle) in handles.into_iter().enumerate() {
                handle
                    .join()
                    .map_err(|_| OwnershipError::WorkerPanicked(idx))?;
            }
            Ok(())
        })
    }

    /// Blame and store one file.
    fn process(&self, path: &str, total: usize) {
        let outcome = self.blame.editors_by_file(path);

        {
            let _guard = self.commit.lock();
            match outcome {
                Ok(editors) => {
                    let editors = match self.mapper {
                        Some(mapper) => map_editors(mapper, editors),
                        None => editors,
                    };
                    self.storage
                        .set_file_editors(path, Some(editors), String::new());
                }
                Err(message) => {
                    log::warn!("blame {path}: {message}");
                    self.storage.set_file_editors(path, None, message);
                }
            }
        }

        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!("processed {done}/{total}: {path}");
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
