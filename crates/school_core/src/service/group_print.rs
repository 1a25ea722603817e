//! Ordered concurrent group printing.
//!
//! # Responsibility
//! - Split the first six names into three positional pairs.
//! - Print pair 0 on the caller thread, pairs 1 and 2 on two fresh workers.
//! - Offer a joined unsynchronized variant and a gated detached variant.
//!
//! # Invariants
//! - Fewer than six names means zero writes to the sink.
//! - Pair 0 is fully written before any worker is spawned.
//! - Inside a pair, element 0 is written before element 1.
//! - Worker panics are logged and never propagated to the caller.
//! - The print gate is shared by every call on the same printer.

use log::{error, info, warn};
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

/// Minimum number of records a group print needs.
pub const GROUP_PRINT_MIN_STUDENTS: usize = 6;

const CALLER_PAIR: Range<usize> = 0..2;
const WORKER_PAIRS: [Range<usize>; 2] = [2..4, 4..6];

/// Line-oriented output target for printed names.
pub trait LineSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes each line to process stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }
}

/// Outcome of a joined group print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPrintStatus {
    /// Not enough records; nothing was printed.
    Skipped { available: usize },
    /// All six names were handed out and every spawned worker was joined.
    Completed { failed_workers: usize },
}

/// Named threads spawned together and joined together.
pub struct WorkerGroup {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerGroup {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawns `task` on a new thread called `name`.
    ///
    /// Returns `false` when the OS refused the thread; the failure is logged
    /// and the task is dropped.
    pub fn spawn<F>(&mut self, name: String, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match thread::Builder::new().name(name.clone()).spawn(task) {
            Ok(handle) => {
                self.handles.push((name, handle));
                true
            }
            Err(err) => {
                error!(
                    "event=worker_spawn module=group_print status=error worker={} error={}",
                    name, err
                );
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Blocks until every worker finished and returns how many panicked.
    pub fn join_all(self) -> usize {
        let mut failed = 0;
        for (name, handle) in self.handles {
            if handle.join().is_err() {
                failed += 1;
                error!(
                    "event=worker_join module=group_print status=error worker={}",
                    name
                );
            }
        }
        failed
    }
}

impl Default for WorkerGroup {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion handle for a synchronized group print.
///
/// Dropping it detaches the workers; `join` waits for them.
pub struct GroupPrintHandle {
    workers: WorkerGroup,
}

impl GroupPrintHandle {
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Waits for the background workers and returns how many panicked.
    pub fn join(self) -> usize {
        self.workers.join_all()
    }
}

/// Prints names to a sink, optionally through a shared gate.
pub struct GroupPrinter {
    sink: Arc<dyn LineSink>,
    print_gate: Arc<Mutex<()>>,
}

impl GroupPrinter {
    pub fn new(sink: Arc<dyn LineSink>) -> Self {
        Self {
            sink,
            print_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Writes one line without taking the gate.
    pub fn print_line(&self, line: &str) {
        self.sink.write_line(line);
    }

    /// Prints pairs 1 and 2 on unsynchronized workers and joins both.
    ///
    /// Lines from the two workers may interleave with each other.
    pub fn print_in_parallel(&self, names: &[String]) -> GroupPrintStatus {
        if !has_enough(names) {
            return GroupPrintStatus::Skipped {
                available: names.len(),
            };
        }

        for name in &names[CALLER_PAIR] {
            self.sink.write_line(name);
        }

        let mut workers = WorkerGroup::new();
        for (index, pair) in WORKER_PAIRS.iter().enumerate() {
            let sink = Arc::clone(&self.sink);
            let pair_names = names[pair.clone()].to_vec();
            workers.spawn(worker_name("parallel", index), move || {
                for name in &pair_names {
                    sink.write_line(name);
                }
            });
        }

        let failed_workers = workers.join_all();
        info!(
            "event=group_print module=group_print status=ok mode=parallel failed_workers={}",
            failed_workers
        );
        GroupPrintStatus::Completed { failed_workers }
    }

    /// Prints every name through the shared gate and returns without joining.
    ///
    /// Returns `None` when there were too few names.
    pub fn print_synchronized(&self, names: &[String]) -> Option<GroupPrintHandle> {
        if !has_enough(names) {
            return None;
        }

        for name in &names[CALLER_PAIR] {
            gated_write(&self.print_gate, self.sink.as_ref(), name);
        }

        let mut workers = WorkerGroup::new();
        for (index, pair) in WORKER_PAIRS.iter().enumerate() {
            let sink = Arc::clone(&self.sink);
            let gate = Arc::clone(&self.print_gate);
            let pair_names = names[pair.clone()].to_vec();
            workers.spawn(worker_name("synchronized", index), move || {
                for name in &pair_names {
                    gated_write(&gate, sink.as_ref(), name);
                }
            });
        }

        info!(
            "event=group_print module=group_print status=started mode=synchronized workers={}",
            workers.len()
        );
        Some(GroupPrintHandle { workers })
    }
}

fn has_enough(names: &[String]) -> bool {
    if names.len() < GROUP_PRINT_MIN_STUDENTS {
        warn!(
            "event=group_print module=group_print status=skipped available={} required={}",
            names.len(),
            GROUP_PRINT_MIN_STUDENTS
        );
        return false;
    }
    true
}

fn gated_write(gate: &Mutex<()>, sink: &dyn LineSink, line: &str) {
    // A panicking writer must not wedge every later print.
    let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
    sink.write_line(line);
}

fn worker_name(mode: &str, index: usize) -> String {
    format!("group-print-{mode}-{}", index + 1)
}
