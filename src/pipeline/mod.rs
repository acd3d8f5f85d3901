//! Concurrent, order-preserving directory compression.
//!
//! ```text
//! FileList ──► BoundedQueue ──► workers × N ──► SlotTable ──► writer ──► archive
//!  (sorted)     (task ids)      (any order)     (per task)    (in order)
//! ```
//!
//! [`compress_directory`] drives a run through
//! `Scanning → Dispatching → OrderedDraining → Joining → Done`, or stops at
//! `EmptyInput` when the directory holds no `*.txt` file. The dispatcher and
//! the writer share the calling thread; the workers run on a
//! [`pool::WorkerPool`].
//!
//! The archive is written to a temporary file next to the destination and
//! renamed into place only after every slot was drained and every worker
//! joined, so a failed run never leaves a partial archive behind.

pub mod pool;
pub mod queue;
pub mod slot;
pub mod worker;
pub mod writer;

use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tempfile::NamedTempFile;

use crate::codec::{Codec, ZlibCodec};
use crate::config::Config;
use crate::displaylevel;
use crate::error::{ConfigError, Result, TzipError};
use crate::report::CompressionReport;
use crate::util::file_list::{scan_text_files, FileList};

use self::pool::WorkerPool;
use self::queue::BoundedQueue;
use self::worker::{run_worker, TaskContext};
use self::writer::drain_in_order;

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// No qualifying file was found; no archive was created.
    EmptyInput,
    Archived(CompressionReport),
}

/// Compresses every `*.txt` file in `dir` into the archive at `output`.
pub fn compress_directory(dir: &Path, output: &Path, config: &Config) -> Result<Outcome> {
    config.validate()?;

    displaylevel!(4, "Scanning {} \n", dir.display());
    let files = scan_text_files(dir)?;
    if files.is_empty() {
        displaylevel!(2, "No .txt files found in {} \n", dir.display());
        return Ok(Outcome::EmptyInput);
    }

    let codec = ZlibCodec::new(config.level);
    compress_files(files, output, config, Box::new(codec)).map(Outcome::Archived)
}

/// Runs the pipeline over an already-built file list with an explicit codec.
///
/// An empty list produces an empty archive.
pub fn compress_files(
    files: FileList,
    output: &Path,
    config: &Config,
    codec: Box<dyn Codec>,
) -> Result<CompressionReport> {
    config.validate()?;
    let started = Instant::now();
    let nb_tasks = files.len();

    let tmp = create_temp_archive(output)?;
    let queue = BoundedQueue::new(config.queue_capacity).ok_or(ConfigError::QueueCapacity)?;
    let ctx = Arc::new(TaskContext::new(queue, files, codec, config.max_file_size));

    let pool = WorkerPool::new(config.nb_workers)?;
    displaylevel!(
        3,
        "Compressing {} files with {} workers (queue capacity {}) \n",
        nb_tasks,
        pool.nb_threads(),
        config.queue_capacity
    );
    for worker_id in 0..pool.nb_threads() {
        let ctx = Arc::clone(&ctx);
        pool.spawn(move || {
            run_worker(worker_id, &ctx);
        });
    }

    // Dispatch. Push order does not fix processing order; it only guarantees
    // every index is offered once.
    for index in 0..nb_tasks {
        if ctx.queue.push(index).is_err() {
            break;
        }
    }
    ctx.queue.close();

    let mut out = BufWriter::new(tmp);
    let drained = drain_in_order(&ctx, &mut out, config.failure_policy, output);
    pool.join();
    let summary = drained?;

    let tmp = out
        .into_inner()
        .map_err(|e| TzipError::output(output, e.into_error()))?;
    tmp.persist(output)
        .map_err(|e| TzipError::output(output, e.error))?;

    let report = CompressionReport::new(output.to_path_buf(), nb_tasks, summary, started.elapsed());
    displaylevel!(
        3,
        "Compressed {} files ({} bytes) into {} bytes in {:.3} s \n",
        report.records,
        report.total_original,
        report.total_compressed,
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

// The temporary file lives in the destination directory so the final rename
// never crosses filesystems.
fn create_temp_archive(output: &Path) -> Result<NamedTempFile> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".tzip-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| TzipError::output(output, e))?;

    // NamedTempFile is created 0600; give the archive ordinary file permissions.
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(Permissions::from_mode(0o644))
            .map_err(|e| TzipError::output(output, e))?;
    }
    Ok(tmp)
}
