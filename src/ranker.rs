// 📊 Type Filter & Ranker
// Turns a raw probability vector into categories of the requested type,
// best first.

use crate::catalog::{Category, CategoryCatalog, TransactionType};
use std::cmp::Ordering;

/// Keep only categories whose declared type matches the request (no filter
/// when the request carries no type), sorted descending by probability.
/// Ties break by catalog declaration order, first declared wins. An empty
/// result is legal: it means no category of the requested type appears in
/// the label set.
pub fn filter_and_rank(
    probs: &[f32],
    labels: &[String],
    kind: Option<TransactionType>,
    catalog: &CategoryCatalog,
) -> Vec<(Category, f32)> {
    let mut entries: Vec<(usize, Category, f32)> = Vec::new();

    for (index, &prob) in probs.iter().enumerate() {
        let Some(label) = labels.get(index) else {
            tracing::warn!(index, "probability index beyond label set, skipping");
            continue;
        };
        let Some(category) = catalog.find_by_name(label) else {
            tracing::warn!(label = %label, "model label missing from catalog, skipping");
            continue;
        };
        if let Some(kind) = kind {
            if category.kind != kind {
                continue;
            }
        }
        // Declaration position carries the tie-break.
        let position = catalog.position(label).unwrap_or(usize::MAX);
        entries.push((position, category.clone(), prob));
    }

    entries.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    entries
        .into_iter()
        .map(|(_, category, prob)| (category, prob))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
