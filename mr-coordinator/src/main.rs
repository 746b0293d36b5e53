mod args;

use args::Args;

mod core;

use crate::core::{CoordinatorServer, MRCoordinator};

mod ledger;

use std::fs;

use anyhow::Context;
use clap::Parser;
use ledger::Ledger;
use tonic::transport::Server;
use tracing::info;

/// Reads the job description: one input file path per line, blank lines
/// skipped. Each listed file becomes one map task.
fn read_input_list(path: &str) -> anyhow::Result<Vec<String>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read input list `{path}`"))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let inputs = read_input_list(&args.input_list)?;
    info!(
        map_tasks = inputs.len(),
        reduce_tasks = args.reduce_count,
        "job loaded"
    );

    let coordinator = MRCoordinator::new(Ledger::new(inputs, args.reduce_count));

    let addr = format!("0.0.0.0:{}", args.port).parse()?;
    info!("coordinator listening on {}", addr);

    Server::builder()
        .add_service(CoordinatorServer::new(coordinator))
        .serve(addr)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn input_list_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pg-one.txt\n\n  \npg-two.txt  ").unwrap();

        let inputs = read_input_list(file.path().to_str().unwrap()).unwrap();
        assert_eq!(inputs, vec!["pg-one.txt", "pg-two.txt"]);
    }

    #[test]
    fn missing_input_list_is_an_error() {
        assert!(read_input_list("no-such-file.txt").is_err());
    }
}
