//! Ordered writer: drains slots `0..N-1` strictly in index order.
//!
//! Workers settle slots in whatever order they finish. The writer blocks on
//! slot `i` until it is settled, so the archive's record order depends only
//! on the sorted file list and never on scheduling.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use crate::archive::write_record;
use crate::config::FailurePolicy;
use crate::displaylevel;
use crate::error::{Chain, TaskError, TzipError};
use crate::pipeline::worker::TaskContext;

/// A task for which no record was written.
#[derive(Debug)]
pub struct SkippedTask {
    pub index: usize,
    pub name: OsString,
    pub error: TaskError,
}

/// Byte totals accumulated while draining.
#[derive(Debug, Default)]
pub struct DrainSummary {
    pub records: usize,
    pub total_original: u64,
    pub total_compressed: u64,
    pub skipped: Vec<SkippedTask>,
}

/// Waits on each slot in order and appends its record to `out`.
///
/// Under [`FailurePolicy::Skip`] a failed task is logged and leaves no
/// record. Under [`FailurePolicy::Abort`], and on any write error, the
/// queue is cancelled so workers stop claiming tasks, and the error is
/// returned. `archive_path` is only used for error context.
pub fn drain_in_order<W: Write + ?Sized>(
    ctx: &TaskContext,
    out: &mut W,
    policy: FailurePolicy,
    archive_path: &Path,
) -> Result<DrainSummary, TzipError> {
    let nb_tasks = ctx.slots.len();
    let mut summary = DrainSummary::default();

    for index in 0..nb_tasks {
        let name = ctx.files.name(index).map(OsString::from).unwrap_or_default();

        match ctx.slots.slot(index).await_ready() {
            Ok(output) => {
                if let Err(e) = write_record(out, &output.compressed) {
                    ctx.abort();
                    return Err(TzipError::output(archive_path, e));
                }
                summary.records += 1;
                summary.total_original += output.original_len as u64;
                summary.total_compressed += output.compressed_len() as u64;
                displaylevel!(
                    3,
                    "\rRecord {}/{} : {} bytes ==> {} bytes   ",
                    index + 1,
                    nb_tasks,
                    output.original_len,
                    output.compressed_len()
                );
                // `output.compressed` is released here, before waiting on the next slot.
            }
            Err(error) => match policy {
                FailurePolicy::Skip => {
                    displaylevel!(2, "Skipping {} : {} \n", name.to_string_lossy(), Chain(&error));
                    summary.skipped.push(SkippedTask { index, name, error });
                }
                FailurePolicy::Abort => {
                    let dropped = ctx.abort();
                    displaylevel!(
                        3,
                        "Aborting after task {} failed ({} queued tasks discarded) \n",
                        index,
                        dropped
                    );
                    return Err(TzipError::TaskFailed {
                        index,
                        source: error,
                    });
                }
            },
        }
    }

    if let Err(e) = out.flush() {
        return Err(TzipError::output(archive_path, e));
    }
    displaylevel!(3, "\r{:79}\r", "");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ZlibCodec;
    use crate::pipeline::queue::BoundedQueue;
    use crate::pipeline::slot::TaskOutput;
    use crate::util::file_list::FileList;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn context(n: usize) -> TaskContext {
        let names = (0..n).map(|i| OsString::from(format!("{i}.txt"))).collect();
        TaskContext::new(
            BoundedQueue::new(4).unwrap(),
            FileList::new("/unused", names),
            Box::new(ZlibCodec::default()),
            1024,
        )
    }

    fn output(byte: u8, original_len: usize) -> TaskOutput {
        TaskOutput {
            compressed: vec![byte; 2],
            original_len,
        }
    }

    #[test]
    fn writes_in_index_order_regardless_of_publish_order() {
        let ctx = Arc::new(context(3));
        let publisher = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                for i in [2usize, 0, 1] {
                    thread::sleep(Duration::from_millis(5));
                    ctx.slots.slot(i).publish(output(i as u8, 10)).unwrap();
                }
            })
        };

        let mut out = Vec::new();
        let summary =
            drain_in_order(&ctx, &mut out, FailurePolicy::Skip, Path::new("x")).unwrap();
        publisher.join().unwrap();

        assert_eq!(summary.records, 3);
        assert_eq!(summary.total_original, 30);
        assert_eq!(summary.total_compressed, 6);
        assert_eq!(
            out,
            [2, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1, 1, 2, 0, 0, 0, 2, 2]
        );
    }

    #[test]
    fn skip_policy_writes_nothing_for_failed_task() {
        let ctx = context(2);
        ctx.slots
            .slot(0)
            .fail(TaskError::TooLarge {
                path: PathBuf::from("0.txt"),
                size: 9,
                limit: 1,
            })
            .unwrap();
        ctx.slots.slot(1).publish(output(7, 3)).unwrap();

        let mut out = Vec::new();
        let summary =
            drain_in_order(&ctx, &mut out, FailurePolicy::Skip, Path::new("x")).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].index, 0);
        assert_eq!(summary.skipped[0].name, "0.txt");
        assert_eq!(out, [2, 0, 0, 0, 7, 7]);
    }

    #[test]
    fn abort_policy_stops_at_first_failure() {
        let ctx = context(2);
        ctx.queue.push(1).unwrap();
        ctx.slots
            .slot(0)
            .fail(TaskError::OutOfMemory {
                path: PathBuf::from("0.txt"),
                bytes: 1,
            })
            .unwrap();

        let mut out = Vec::new();
        let err = drain_in_order(&ctx, &mut out, FailurePolicy::Abort, Path::new("x"))
            .unwrap_err();
        assert!(matches!(err, TzipError::TaskFailed { index: 0, .. }));
        assert!(out.is_empty());
        assert!(ctx.is_aborting());
        assert!(ctx.queue.is_empty());
    }
}
