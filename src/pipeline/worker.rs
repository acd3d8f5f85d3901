//! Worker loop: claim a task, load and compress its file, settle its slot.
//!
//! A failing task settles its slot with the error instead of leaving it
//! pending, so the writer always makes progress. Each worker owns one
//! scratch input buffer that is reused for every task it claims; the
//! compressed buffer is allocated per task and moved into the slot.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::codec::Codec;
use crate::displaylevel;
use crate::error::{Chain, TaskError};
use crate::pipeline::queue::BoundedQueue;
use crate::pipeline::slot::{SlotTable, TaskOutput};
use crate::util::file_io::read_bounded;
use crate::util::file_list::FileList;

/// Scratch buffers above this capacity are released after the task instead
/// of being kept for the next one.
const SCRATCH_KEEP_LIMIT: usize = 4 << 20;

/// Everything a worker shares with the dispatcher and the other workers.
///
/// The file list, codec and limit are read-only. The queue and each slot
/// carry their own locks; no lock is ever held across the two.
pub struct TaskContext {
    pub queue: BoundedQueue<usize>,
    pub files: FileList,
    pub slots: SlotTable,
    pub codec: Box<dyn Codec>,
    pub max_file_size: usize,
    aborting: AtomicBool,
}

impl TaskContext {
    pub fn new(
        queue: BoundedQueue<usize>,
        files: FileList,
        codec: Box<dyn Codec>,
        max_file_size: usize,
    ) -> Self {
        let slots = SlotTable::new(files.len());
        TaskContext {
            queue,
            files,
            slots,
            codec,
            max_file_size,
            aborting: AtomicBool::new(false),
        }
    }

    /// Stops the run: discards queued tasks and silences per-task failure
    /// messages from workers still finishing their current task.
    pub fn abort(&self) -> usize {
        self.aborting.store(true, Ordering::SeqCst);
        self.queue.cancel()
    }

    pub fn is_aborting(&self) -> bool {
        self.aborting.load(Ordering::SeqCst)
    }
}

/// Per-worker counters, reported at verbose display levels.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub completed: usize,
    pub failed: usize,
}

/// Runs until the queue is closed and drained.
pub fn run_worker(worker_id: usize, ctx: &TaskContext) -> WorkerStats {
    let mut stats = WorkerStats::default();
    let mut scratch: Vec<u8> = Vec::new();

    while let Some(index) = ctx.queue.pop() {
        let outcome = compress_task(ctx, index, &mut scratch);
        if scratch.capacity() > SCRATCH_KEEP_LIMIT {
            scratch = Vec::new();
        }

        let slot = ctx.slots.slot(index);
        let settled = match outcome {
            Ok(output) => {
                displaylevel!(
                    4,
                    "worker {}: task {} {} -> {} bytes \n",
                    worker_id,
                    index,
                    output.original_len,
                    output.compressed_len()
                );
                stats.completed += 1;
                slot.publish(output)
            }
            Err(err) => {
                if !ctx.is_aborting() {
                    displaylevel!(4, "worker {}: task {} failed: {} \n", worker_id, index, Chain(&err));
                }
                stats.failed += 1;
                slot.fail(err)
            }
        };
        if settled.is_err() {
            displaylevel!(1, "worker {}: task {} was settled twice \n", worker_id, index);
        }
    }

    displaylevel!(
        4,
        "worker {} done: {} compressed, {} failed \n",
        worker_id,
        stats.completed,
        stats.failed
    );
    stats
}

/// Loads task `index` into `scratch` and compresses it.
pub fn compress_task(
    ctx: &TaskContext,
    index: usize,
    scratch: &mut Vec<u8>,
) -> Result<TaskOutput, TaskError> {
    let path = ctx.files.path(index).ok_or_else(|| TaskError::Read {
        path: PathBuf::from(format!("<task {index}>")),
        source: io::Error::new(io::ErrorKind::NotFound, "task index out of range"),
    })?;

    let original_len = read_bounded(&path, ctx.max_file_size, scratch)?;

    // Reserve the codec's worst case so that compression itself never
    // allocates; a failed reservation is a task error, not an abort.
    let mut compressed = Vec::new();
    let bound = ctx.codec.max_compressed_len(original_len);
    compressed
        .try_reserve_exact(bound)
        .map_err(|_| TaskError::OutOfMemory {
            path: path.clone(),
            bytes: bound,
        })?;
    ctx.codec
        .compress(&scratch[..original_len], &mut compressed)
        .map_err(|source| TaskError::Codec { path, source })?;

    Ok(TaskOutput {
        compressed,
        original_len,
    })
}
