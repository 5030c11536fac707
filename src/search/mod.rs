//! Search filter over a family's collection.

use crate::catalog::CatalogRecord;

/// Derive the visible subset of `records` for `query`.
///
/// An empty query returns the whole collection. Otherwise a record matches
/// when its name or description contains the query as a case-insensitive
/// substring. Input order is preserved; there is no relevance ranking.
pub fn filter_records<'a, R: CatalogRecord>(records: &'a [R], query: &str) -> Vec<&'a R> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.name().to_lowercase().contains(&needle)
                || record.description().to_lowercase().contains(&needle)
        })
        .collect()
}
