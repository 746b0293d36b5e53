//
// Import gRPC stubs/definitions.
//
pub use coordinator::coordinator_client::CoordinatorClient;
use coordinator::{CompleteTaskRequest, GetTaskRequest, TaskKind};
pub mod coordinator {
    tonic::include_proto!("coordinator");
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use tonic::transport::Channel;
use tracing::{info, warn};

use common::Workload;

use crate::{map, reduce};

/// Consecutive `GetTask` transport failures tolerated before the worker
/// gives up on the coordinator.
const MAX_TRANSPORT_FAILURES: u32 = 10;

/// Pause before re-polling after a transport failure or an empty offer.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// A single-task-at-a-time worker: one loop, no internal concurrency.
/// All coordination happens through the coordinator's ledger and the
/// shared filesystem.
pub struct MRWorker {
    client: CoordinatorClient<Channel>,
    workload: Workload,
    /// Identity under which tasks are assigned to this process. Drawn
    /// randomly once at startup; the ledger only accepts completion
    /// reports from the identity a task was handed out to.
    id: u64,
    /// Directory holding intermediate and output files.
    dir: PathBuf,
}

impl MRWorker {
    /// Connects to the coordinator. A failure here is fatal; retries only
    /// start once the worker enters its polling loop.
    pub async fn connect(address: String, workload: Workload) -> anyhow::Result<Self> {
        let client = CoordinatorClient::connect(address).await?;
        Ok(Self {
            client,
            workload,
            id: rand::random(),
            dir: std::env::current_dir()?,
        })
    }

    /// Polls the coordinator for work until the job is done.
    ///
    /// Local execution errors are fatal: the task is left incomplete and
    /// the ledger will re-offer it to another worker. A failed
    /// completion report is not fatal; the next loop iteration keeps the
    /// worker making progress.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut transport_failures = 0u32;

        loop {
            let request = GetTaskRequest { worker_id: self.id };
            let reply = match self.client.get_task(request).await {
                Ok(response) => {
                    transport_failures = 0;
                    response.into_inner()
                }
                Err(status) => {
                    transport_failures += 1;
                    if transport_failures >= MAX_TRANSPORT_FAILURES {
                        bail!("lost contact with the coordinator: {status}");
                    }
                    warn!(%status, "GetTask failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            if reply.done {
                break;
            }

            match reply.kind() {
                TaskKind::Map => map::perform_map(
                    &self.dir,
                    self.id,
                    reply.task_id,
                    reply.map_or_reduce_count,
                    &reply.input_path,
                    &self.workload,
                )?,
                TaskKind::Reduce => reduce::perform_reduce(
                    &self.dir,
                    self.id,
                    reply.task_id,
                    reply.map_or_reduce_count,
                    &self.workload,
                )?,
                TaskKind::None => {
                    // Nothing to hand out yet; ask again shortly.
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            }

            let report = CompleteTaskRequest {
                worker_id: self.id,
                kind: reply.kind,
                task_id: reply.task_id,
            };
            match self.client.complete_task(report).await {
                Ok(response) => {
                    if response.into_inner().done {
                        break;
                    }
                }
                // Losing a report is harmless: the ledger re-offers the
                // task, and a duplicate execution converges on the same
                // output files.
                Err(status) => warn!(%status, "CompleteTask failed, continuing"),
            }
        }

        info!("job complete, worker exiting");
        Ok(())
    }
}
