//! gRPC surface of the coordinator.
//!
//! Every worker call funnels into the [`Ledger`] behind one exclusive
//! lock. Handlers never perform I/O and never await while holding it, so
//! the critical section stays short and no call blocks on another
//! worker's progress.

use std::sync::{Mutex, PoisonError};

use tonic::{Request, Response, Status};
use tracing::{debug, info};

pub use coordinator::coordinator_server::{Coordinator, CoordinatorServer};
use coordinator::{
    CompleteTaskReply, CompleteTaskRequest, GetTaskReply, GetTaskRequest, TaskKind,
};
pub mod coordinator {
    tonic::include_proto!("coordinator");
}

use crate::ledger::{Assignment, Ledger, Phase};

#[derive(Debug)]
pub struct MRCoordinator {
    ledger: Mutex<Ledger>,
}

impl MRCoordinator {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }

    fn with_ledger<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut ledger)
    }
}

#[tonic::async_trait]
impl Coordinator for MRCoordinator {
    async fn get_task(
        &self,
        request: Request<GetTaskRequest>,
    ) -> Result<Response<GetTaskReply>, Status> {
        let worker_id = request.into_inner().worker_id;
        let assignment = self.with_ledger(|ledger| ledger.request_task(worker_id));
        debug!(worker_id, ?assignment, "task requested");

        let mut reply = GetTaskReply::default();
        match assignment {
            Assignment::Done => reply.done = true,
            Assignment::Map {
                task_id,
                reduce_count,
                input_path,
            } => {
                reply.set_kind(TaskKind::Map);
                reply.task_id = task_id;
                reply.map_or_reduce_count = reduce_count;
                reply.input_path = input_path;
            }
            Assignment::Reduce { task_id, map_count } => {
                reply.set_kind(TaskKind::Reduce);
                reply.task_id = task_id;
                reply.map_or_reduce_count = map_count;
            }
            Assignment::Retry => reply.set_kind(TaskKind::None),
        }
        Ok(Response::new(reply))
    }

    async fn complete_task(
        &self,
        request: Request<CompleteTaskRequest>,
    ) -> Result<Response<CompleteTaskReply>, Status> {
        let request = request.into_inner();

        let done = match request.kind() {
            TaskKind::Map => self.with_ledger(|ledger| {
                ledger.report_completion(request.worker_id, Phase::Map, request.task_id)
            }),
            TaskKind::Reduce => self.with_ledger(|ledger| {
                ledger.report_completion(request.worker_id, Phase::Reduce, request.task_id)
            }),
            // A report that names no phase cannot match anything in the
            // ledger; just echo the current done flag.
            TaskKind::None => self.with_ledger(|ledger| ledger.done()),
        };

        if done {
            info!(
                worker_id = request.worker_id,
                task_id = request.task_id,
                "job complete"
            );
        }
        Ok(Response::new(CompleteTaskReply { done }))
    }
}
