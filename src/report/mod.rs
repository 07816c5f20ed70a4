//! Reporting utilities: category labels and formatted terminal output.

pub mod format;

pub use format::*;

/// Fixed class-index label table from the training pipeline.
pub const CATEGORY_LABELS: [&str; 5] = ["High", "Medium-High", "Medium", "Medium-Low", "Low"];

/// Map a predicted class index to its display label.
///
/// Out-of-table indices map to `Unknown` rather than failing; in practice an
/// unknown index means the artifact was trained against a different label
/// table than this build carries.
pub fn category_label(index: usize) -> &'static str {
    CATEGORY_LABELS.get(index).copied().unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_two_is_medium() {
        assert_eq!(category_label(2), "Medium");
    }

    #[test]
    fn out_of_table_index_is_unknown() {
        assert_eq!(category_label(99), "Unknown");
    }

    #[test]
    fn table_covers_high_to_low() {
        assert_eq!(category_label(0), "High");
        assert_eq!(category_label(4), "Low");
    }
}
