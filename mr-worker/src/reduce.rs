//! Reduce-side task execution: gather one bucket's records from every
//! map task, group values by key, and fold each group through the
//! application's reduce function.

use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use common::{codec, Workload};

use crate::map::bucket_path;

/// Name of the final output file for a reduce task.
pub fn output_path(dir: &Path, reduce_task_id: u32) -> PathBuf {
    dir.join(format!("output_{reduce_task_id}"))
}

/// Executes one reduce task inside `dir`.
///
/// Reads `temp_<m>_<task>` for every map task `m`. A missing file means
/// that map task emitted nothing for this bucket and is skipped; a
/// corrupt file contributes its valid prefix only. The output file is
/// staged and renamed like the map side's bucket files. Key order in the
/// output is unspecified.
pub fn perform_reduce(
    dir: &Path,
    worker_id: u64,
    task_id: u32,
    map_count: u32,
    workload: &Workload,
) -> anyhow::Result<()> {
    info!(task_id, map_count, "starting reduce task");

    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for map_task_id in 0..map_count {
        let path = bucket_path(dir, map_task_id, task_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(_) => {
                warn!("failed to open {}, ignoring", path.display());
                continue;
            }
        };
        for record in codec::read_records(BufReader::new(file)) {
            groups.entry(record.key).or_default().push(record.value);
        }
    }

    let scratch = dir.join(format!("output_{task_id}.{worker_id:016x}"));
    let mut writer = BufWriter::new(
        File::create(&scratch)
            .with_context(|| format!("failed to create `{}`", scratch.display()))?,
    );
    for (key, values) in &groups {
        let reduced = (workload.reduce_fn)(key, values)?;
        writeln!(writer, "{key} {reduced}")?;
    }
    writer.flush()?;
    drop(writer);

    fs::rename(&scratch, output_path(dir, task_id))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::perform_map;

    fn wordcount() -> Workload {
        Workload {
            map_fn: workload::wc::map,
            reduce_fn: workload::wc::reduce,
        }
    }

    /// Parses an output file into key → value, order-insensitive.
    fn read_output(dir: &Path, reduce_task_id: u32) -> HashMap<String, String> {
        let contents = fs::read_to_string(output_path(dir, reduce_task_id)).unwrap();
        contents
            .lines()
            .map(|line| {
                let (key, value) = line.split_once(' ').unwrap();
                (key.to_owned(), value.to_owned())
            })
            .collect()
    }

    #[test]
    fn word_count_across_two_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("pg-0.txt");
        let second = dir.path().join("pg-1.txt");
        fs::write(&first, "the cat and the hat").unwrap();
        fs::write(&second, "the cat came back").unwrap();

        let wl = wordcount();
        perform_map(dir.path(), 1, 0, 1, first.to_str().unwrap(), &wl).unwrap();
        perform_map(dir.path(), 2, 1, 1, second.to_str().unwrap(), &wl).unwrap();
        perform_reduce(dir.path(), 3, 0, 2, &wl).unwrap();

        let output = read_output(dir.path(), 0);
        assert_eq!(output["the"], "3");
        assert_eq!(output["cat"], "2");
        assert_eq!(output["and"], "1");
        assert_eq!(output["hat"], "1");
        assert_eq!(output["came"], "1");
        assert_eq!(output["back"], "1");
        assert_eq!(output.len(), 6);
    }

    #[test]
    fn missing_bucket_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pg-0.txt");
        fs::write(&input, "only one mapper ran").unwrap();

        let wl = wordcount();
        perform_map(dir.path(), 1, 0, 1, input.to_str().unwrap(), &wl).unwrap();

        // Claim five map tasks; four produced nothing for this bucket.
        perform_reduce(dir.path(), 3, 0, 5, &wl).unwrap();

        let output = read_output(dir.path(), 0);
        assert_eq!(output.len(), 4);
        assert_eq!(output["only"], "1");
    }

    #[test]
    fn corrupt_bucket_file_contributes_its_valid_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pg-0.txt");
        fs::write(&input, "alpha beta").unwrap();

        let wl = wordcount();
        perform_map(dir.path(), 1, 0, 1, input.to_str().unwrap(), &wl).unwrap();

        // Append garbage to the bucket file; decoding stops there.
        let bucket = bucket_path(dir.path(), 0, 0);
        let mut contents = fs::read(&bucket).unwrap();
        contents.extend_from_slice(b"{\"key\": \"gam");
        fs::write(&bucket, contents).unwrap();

        perform_reduce(dir.path(), 3, 0, 1, &wl).unwrap();

        let output = read_output(dir.path(), 0);
        assert_eq!(output.len(), 2);
        assert_eq!(output["alpha"], "1");
        assert_eq!(output["beta"], "1");
    }

    #[test]
    fn no_input_at_all_yields_an_empty_output_file() {
        let dir = tempfile::tempdir().unwrap();

        perform_reduce(dir.path(), 3, 4, 3, &wordcount()).unwrap();

        let contents = fs::read_to_string(output_path(dir.path(), 4)).unwrap();
        assert!(contents.is_empty());
    }
}
