//! Covered/total roll-up of hit-count tables.

use crate::model::SummaryCount;

/// A hit-count table value: a scalar count (`s`, `f`) or one count per
/// branch arm (`b`).
pub trait HitCounts {
    fn counts(&self) -> &[u64];
}

impl HitCounts for u64 {
    fn counts(&self) -> &[u64] {
        std::slice::from_ref(self)
    }
}

impl HitCounts for Vec<u64> {
    fn counts(&self) -> &[u64] {
        self
    }
}

/// Every count adds one to `total`, and one to `covered` when nonzero.
/// Independent of the configured count mode.
pub fn summarize<'a, V, I>(table: I) -> SummaryCount
where
    V: HitCounts + 'a,
    I: IntoIterator<Item = &'a V>,
{
    let mut summary = SummaryCount::default();
    for value in table {
        for &count in value.counts() {
            summary.total += 1;
            if count > 0 {
                summary.covered += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_scalar_table() {
        let s: IndexMap<String, u64> = [("0".to_string(), 1), ("1".to_string(), 0)]
            .into_iter()
            .collect();
        assert_eq!(summarize(s.values()), SummaryCount::new(1, 2));
    }

    #[test]
    fn test_array_table_counts_each_arm() {
        let b = vec![vec![3, 0, 1], vec![0, 0], vec![]];
        assert_eq!(summarize(&b), SummaryCount::new(2, 5));
    }

    #[test]
    fn test_empty_table() {
        let f: Vec<u64> = Vec::new();
        assert_eq!(summarize(&f), SummaryCount::new(0, 0));
    }
}
