//! Map-side task execution: read one input file, run the application's
//! map function, and scatter the emitted records into per-bucket files.

use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use common::{codec, ihash, KeyValue, Workload};

/// Name of the intermediate file holding `map_task_id`'s records for
/// `bucket`. The map side writes these, the reduce side reads them.
pub fn bucket_path(dir: &Path, map_task_id: u32, bucket: u32) -> PathBuf {
    dir.join(format!("temp_{map_task_id}_{bucket}"))
}

/// Executes one map task inside `dir`.
///
/// Records are routed to `reduce_count` buckets by `ihash(key)`; each
/// non-empty bucket becomes one `temp_<task>_<bucket>` file (the reduce
/// side tolerates absent buckets). Every file is staged under a
/// worker-unique scratch name and renamed into place, so a duplicate
/// speculative execution can overwrite the file but never expose a
/// half-written one.
pub fn perform_map(
    dir: &Path,
    worker_id: u64,
    task_id: u32,
    reduce_count: u32,
    input_path: &str,
    workload: &Workload,
) -> anyhow::Result<()> {
    info!(task_id, input_path, "starting map task");

    let content = fs::read_to_string(input_path)
        .with_context(|| format!("failed to read map input `{input_path}`"))?;
    let records = (workload.map_fn)(input_path, &content)?;

    let mut buckets: Vec<Vec<KeyValue>> = vec![Vec::new(); reduce_count as usize];
    for record in records {
        let bucket = ihash(&record.key) % reduce_count;
        buckets[bucket as usize].push(record);
    }

    for (bucket, records) in buckets.iter().enumerate() {
        if records.is_empty() {
            continue;
        }

        let final_path = bucket_path(dir, task_id, bucket as u32);
        let scratch = dir.join(format!("temp_{task_id}_{bucket}.{worker_id:016x}"));

        let mut writer = BufWriter::new(
            File::create(&scratch)
                .with_context(|| format!("failed to create `{}`", scratch.display()))?,
        );
        codec::write_records(&mut writer, records)?;
        writer.flush()?;
        drop(writer);

        // Same directory, so the swap into the final name is atomic.
        fs::rename(&scratch, &final_path)?;
    }

    Ok(())
}
