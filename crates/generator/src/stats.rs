use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Counters accumulated over a generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationStats {
    /// Source files read
    pub files_processed: usize,
    /// Translated files written (one per file and language)
    pub files_translated: usize,
    /// Strings replaced across all written files
    pub total_translations: usize,
    /// Files skipped by batch runs after an error
    #[serde(default)]
    pub files_failed: usize,
}

impl fmt::Display for TranslationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} written, {} strings translated, {} failed",
            self.files_processed, self.files_translated, self.total_translations, self.files_failed
        )
    }
}

/// Outcome of translating a directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Source paths, relative to the site root, translated successfully
    pub succeeded: Vec<PathBuf>,
    /// Source paths that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_display() {
        let stats = TranslationStats {
            files_processed: 3,
            files_translated: 5,
            total_translations: 42,
            files_failed: 1,
        };
        assert_eq!(
            stats.to_string(),
            "3 processed, 5 written, 42 strings translated, 1 failed"
        );
    }

    #[test]
    fn test_batch_report_counts() {
        let report = BatchReport {
            succeeded: vec![PathBuf::from("a.html"), PathBuf::from("b.html")],
            failed: vec![(PathBuf::from("c.html"), "boom".to_string())],
        };
        assert_eq!(report.total(), 3);
        assert!(!report.is_clean());
        assert!(BatchReport::default().is_clean());
    }
}
