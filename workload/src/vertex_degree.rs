//! A MapReduce-compatible application that computes the
//! degree of each vertex in a graph, given a list of edges.

use anyhow::{anyhow, Result};

use common::KeyValue;

fn parse_line(line: &str) -> Result<(u64, u64)> {
    let mut iter = line.split_whitespace().take(2);
    let a = iter
        .next()
        .ok_or_else(|| anyhow!("Invalid input file format"))?
        .parse()?;
    let b = iter
        .next()
        .ok_or_else(|| anyhow!("Invalid input file format"))?
        .parse()?;
    Ok((a, b))
}

/// Emits `(vertex, "1")` for both endpoints of every edge.
pub fn map(_input_id: &str, content: &str) -> Result<Vec<KeyValue>> {
    let mut records = Vec::new();
    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        let (a, b) = parse_line(line)?;
        records.push(KeyValue::new(a.to_string(), "1"));
        records.push(KeyValue::new(b.to_string(), "1"));
    }
    Ok(records)
}

/// A vertex's degree is the number of edge endpoints recorded for it.
pub fn reduce(_key: &str, values: &[String]) -> Result<String> {
    Ok(values.len().to_string())
}
