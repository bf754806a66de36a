//! Parallel file processing utilities.

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{error, info};
use rayon::prelude::*;

/// Result of a parallel batch operation.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if self.failed > 0 {
            bail!("{operation} failed: {} succeeded, {} failed", self.succeeded, self.failed);
        }
        Ok(())
    }
}

/// Run an operation on multiple files in parallel with consistent error reporting.
pub fn run_parallel<T, F>(label: &str, items: &[T], op: F) -> BatchResult
where
    T: AsRef<Path> + Sync,
    F: Fn(&Path) -> Result<()> + Sync,
{
    let results: Vec<Result<()>> = items
        .par_iter()
        .map(|item| {
            let path = item.as_ref();
            op(path).with_context(|| format!("Failed to process {}", path.display()))
        })
        .collect();

    let mut result = BatchResult::default();
    for r in &results {
        if let Err(e) = r {
            error!("{e:?}");
            result.failed += 1;
        } else {
            result.succeeded += 1;
        }
    }

    if result.total() > 1 {
        info!("{label}: {} succeeded, {} failed", result.succeeded, result.failed);
    }
    result
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_run_parallel_counts_failures() {
        let items = [PathBuf::from("ok.ttf"), PathBuf::from("bad.ttf"), PathBuf::from("ok2.ttf")];
        let result = run_parallel("Test", &items, |path| {
            if path.to_string_lossy().contains("bad") { Err(anyhow!("broken")) } else { Ok(()) }
        });
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert!(!result.all_succeeded());
        assert!(result.ok_or_bail("Test").is_err());
    }
}
