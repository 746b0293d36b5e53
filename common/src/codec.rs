//! Record-stream encoding for intermediate bucket files.
//!
//! A bucket file is a sequence of self-delimiting JSON values, one per
//! [`KeyValue`]. The decoder yields records until end of stream or the
//! first malformed value; the remainder of a malformed stream is
//! discarded so a truncated file costs only its own tail.

use std::io::{Read, Write};

use anyhow::Result;
use serde_json::Deserializer;
use tracing::debug;

use crate::KeyValue;

/// Appends `records` to `writer`, one JSON value per line.
pub fn write_records<W: Write>(mut writer: W, records: &[KeyValue]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Reads every well-formed record from `reader`.
///
/// Decoding stops at end of stream or at the first malformed value, so a
/// corrupt file contributes its valid prefix and nothing else.
pub fn read_records<R: Read>(reader: R) -> Vec<KeyValue> {
    let mut records = Vec::new();
    for item in Deserializer::from_reader(reader).into_iter::<KeyValue>() {
        match item {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!("stopping at malformed record: {err}");
                break;
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let records = vec![
            KeyValue::new("apple", "1"),
            KeyValue::new("banana", "1"),
            KeyValue::new("apple", "1"),
        ];

        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();

        assert_eq!(read_records(buf.as_slice()), records);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(read_records(&b""[..]).is_empty());
    }

    #[test]
    fn truncates_at_first_malformed_record() {
        let mut buf = Vec::new();
        write_records(
            &mut buf,
            &[KeyValue::new("a", "1"), KeyValue::new("b", "2")],
        )
        .unwrap();
        buf.extend_from_slice(b"{\"key\": \"c\", \"val");

        let records = read_records(buf.as_slice());
        assert_eq!(
            records,
            vec![KeyValue::new("a", "1"), KeyValue::new("b", "2")]
        );
    }

    #[test]
    fn garbage_prefix_yields_nothing() {
        assert!(read_records(&b"not json at all"[..]).is_empty());
    }
}
