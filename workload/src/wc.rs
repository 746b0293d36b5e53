//! A MapReduce-compatible implementation of word count.

use anyhow::Result;

use common::KeyValue;

/// Emits `(word, "1")` for every word in the input. Words are maximal
/// alphabetic runs, lowercased.
pub fn map(_input_id: &str, content: &str) -> Result<Vec<KeyValue>> {
    Ok(content
        .split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty())
        .map(|word| KeyValue::new(word.to_lowercase(), "1"))
        .collect())
}

/// Counts the occurrences collected for a word.
pub fn reduce(_key: &str, values: &[String]) -> Result<String> {
    Ok(values.len().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_non_alphabetic_and_lowercases() {
        let records = map("pg.txt", "The cat, the hat!").unwrap();
        let words: Vec<&str> = records.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(words, vec!["the", "cat", "the", "hat"]);
        assert!(records.iter().all(|kv| kv.value == "1"));
    }

    #[test]
    fn empty_input_emits_nothing() {
        assert!(map("pg.txt", "42 17 ...").unwrap().is_empty());
    }

    #[test]
    fn reduce_counts_values() {
        let ones = vec!["1".to_string(); 3];
        assert_eq!(reduce("the", &ones).unwrap(), "3");
    }
}
