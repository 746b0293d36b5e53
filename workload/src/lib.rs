//! Converts MapReduce application names to actual application code.
//!
//! # Example
//!
//! To get the word count application:
//! ```
//! # fn main() -> anyhow::Result<()> {
//! let wc = workload::named("wc")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{bail, Result};

use common::Workload;

pub mod vertex_degree;
pub mod wc;

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no application with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "wc" => Some(Workload {
            map_fn: wc::map,
            reduce_fn: wc::reduce,
        }),
        "vertex-degree" => Some(Workload {
            map_fn: vertex_degree::map,
            reduce_fn: vertex_degree::reduce,
        }),
        _ => None,
    }
}

/// Gets the [`Workload`] named `name`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was
/// found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found.", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert!(try_named("wc").is_some());
        assert!(try_named("vertex-degree").is_some());
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(try_named("sort").is_none());
        assert!(named("sort").is_err());
    }
}
