mod args;

use args::Args;

mod core;

use crate::core::MRWorker;

mod map;
mod reduce;

use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Resolve the application up front; an unknown name is fatal before
    // any work is requested.
    let workload = workload::named(&args.workload)?;

    let endpoint = format!("http://{}:{}", args.address, args.port);
    info!(%endpoint, workload = %args.workload, "worker starting");

    let mut worker = MRWorker::connect(endpoint, workload).await?;
    worker.run().await?;

    Ok(())
}
