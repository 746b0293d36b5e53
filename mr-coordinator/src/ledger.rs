//! The coordinator's authoritative record of task states.
//!
//! A task is identified by `(phase, id)` and lives in exactly one of three
//! collections at any instant: idle, in progress, or completed. Reduce
//! tasks do not exist until the map phase has fully drained.
//!
//! There is no timeout or liveness tracking anywhere in here. A worker
//! that crashes while holding a task leaves it in progress forever; the
//! only recovery path is re-offering in-progress tasks to other
//! requesters, which trades duplicate work for forward progress.

use std::collections::{HashMap, HashSet};

/// The two phases a task can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Map,
    Reduce,
}

/// What [`Ledger::request_task`] handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// Every task in both phases is completed; the worker can exit.
    Done,

    /// Run the map application over one input file.
    Map {
        task_id: u32,
        reduce_count: u32,
        input_path: String,
    },

    /// Merge one bucket across every map task's output.
    Reduce { task_id: u32, map_count: u32 },

    /// Nothing to hand out right now; poll again.
    Retry,
}

/// Task collections for a single phase.
///
/// Membership is state: an id is idle, in progress, or completed
/// according to which collection holds it, never more than one at a time.
/// In-progress tasks remember the identity they were handed out to.
#[derive(Debug, Default)]
struct PhaseTasks {
    idle: HashSet<u32>,
    in_progress: HashMap<u32, u64>,
    completed: HashSet<u32>,
}

impl PhaseTasks {
    fn with_tasks(count: u32) -> Self {
        Self {
            idle: (0..count).collect(),
            ..Self::default()
        }
    }

    /// Moves an arbitrary idle task to in progress under `worker_id`.
    fn assign_idle(&mut self, worker_id: u64) -> Option<u32> {
        let task_id = self.idle.iter().next().copied()?;
        self.idle.remove(&task_id);
        self.in_progress.insert(task_id, worker_id);
        Some(task_id)
    }

    /// Picks an arbitrary in-progress task to offer a second time.
    /// The recorded assignee is left untouched.
    fn reoffer(&self) -> Option<u32> {
        self.in_progress.keys().next().copied()
    }

    /// Completes `task_id` if and only if it is in progress under exactly
    /// `worker_id`. Any other report leaves the collections unchanged.
    fn complete(&mut self, task_id: u32, worker_id: u64) {
        if self.in_progress.get(&task_id) == Some(&worker_id) {
            self.in_progress.remove(&task_id);
            self.completed.insert(task_id);
        }
    }

    fn drained(&self) -> bool {
        self.idle.is_empty() && self.in_progress.is_empty()
    }
}

/// The scheduling state machine for one job.
///
/// The ledger itself is not synchronized; all access is serialized by the
/// service layer behind one exclusive lock (see `core.rs`).
#[derive(Debug)]
pub struct Ledger {
    /// Input file per map task id.
    inputs: Vec<String>,
    reduce_count: u32,
    map_tasks: PhaseTasks,
    reduce_tasks: PhaseTasks,
    /// Reduce tasks are materialized at most once, after the map phase
    /// drains. Never re-evaluated afterwards.
    reduce_started: bool,
}

impl Ledger {
    pub fn new(inputs: Vec<String>, reduce_count: u32) -> Self {
        let map_count = inputs.len() as u32;
        Self {
            inputs,
            reduce_count,
            map_tasks: PhaseTasks::with_tasks(map_count),
            reduce_tasks: PhaseTasks::default(),
            reduce_started: false,
        }
    }

    pub fn map_count(&self) -> u32 {
        self.inputs.len() as u32
    }

    /// True once every map and every reduce task is completed. Monotonic:
    /// nothing ever leaves a completed collection.
    pub fn done(&self) -> bool {
        self.map_tasks.completed.len() >= self.map_count() as usize
            && self.reduce_tasks.completed.len() >= self.reduce_count as usize
    }

    /// Hands out the next unit of work for `worker_id`.
    ///
    /// Map work strictly precedes reduce work. Once a phase has no idle
    /// tasks left, its in-progress tasks are re-offered to further
    /// requesters as-is; the original assignment is never revoked.
    pub fn request_task(&mut self, worker_id: u64) -> Assignment {
        if self.done() {
            return Assignment::Done;
        }

        if let Some(task_id) = self.map_tasks.assign_idle(worker_id) {
            return self.map_assignment(task_id);
        }
        if let Some(task_id) = self.map_tasks.reoffer() {
            return self.map_assignment(task_id);
        }

        // Map phase drained: lay out the reduce tasks, exactly once.
        if self.map_tasks.drained() && !self.reduce_started {
            self.reduce_tasks = PhaseTasks::with_tasks(self.reduce_count);
            self.reduce_started = true;
        }

        if let Some(task_id) = self.reduce_tasks.assign_idle(worker_id) {
            return self.reduce_assignment(task_id);
        }
        if let Some(task_id) = self.reduce_tasks.reoffer() {
            return self.reduce_assignment(task_id);
        }

        Assignment::Retry
    }

    /// Records a completion report from `worker_id`.
    ///
    /// Only the identity a task was handed out to can complete it; a
    /// report from a speculative holder, or for a task that is not in
    /// progress at all, is a silent no-op. Returns the job-done flag as
    /// of after the report, whether or not this report changed anything.
    pub fn report_completion(&mut self, worker_id: u64, phase: Phase, task_id: u32) -> bool {
        match phase {
            Phase::Map => self.map_tasks.complete(task_id, worker_id),
            Phase::Reduce => self.reduce_tasks.complete(task_id, worker_id),
        }
        self.done()
    }

    fn map_assignment(&self, task_id: u32) -> Assignment {
        Assignment::Map {
            task_id,
            reduce_count: self.reduce_count,
            input_path: self.inputs[task_id as usize].clone(),
        }
    }

    fn reduce_assignment(&self, task_id: u32) -> Assignment {
        Assignment::Reduce {
            task_id,
            map_count: self.map_count(),
        }
    }
}
