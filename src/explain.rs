// 💬 Explanation Generator
// Pure templated sentences. Cluster checks run in a fixed order and the
// first match wins, so identical inputs always produce identical text.

use crate::catalog::{Category, CategoryCatalog, TransactionType};

// Small fixed keyword clusters per domain, checked in this order.
const CLUSTERS: &[(&str, &[&str])] = &[
    ("shopping", &["belanja", "beli", "shop", "shopp", "mall", "order"]),
    ("food", &["makan", "kopi", "restoran", "food", "lunch", "jajan"]),
    ("transport", &["ojek", "bensin", "transport", "fuel", "parkir", "ride"]),
    ("income", &["gaji", "bonus", "salary", "invoice", "payroll"]),
];

/// Build an explanation for a final category against the normalized text.
pub fn explain(
    category: &Category,
    normalized_text: &str,
    kind: Option<TransactionType>,
    catalog: &CategoryCatalog,
) -> String {
    let tokens: Vec<&str> = normalized_text.split_whitespace().collect();

    for (cluster_name, cluster_words) in CLUSTERS {
        let matched: Vec<&str> = cluster_words
            .iter()
            .copied()
            .filter(|word| tokens.contains(word))
            .collect();
        if !matched.is_empty() {
            return format!(
                "Classified as {} based on {} terms: {}",
                category.name,
                cluster_name,
                matched.join(", ")
            );
        }
    }

    let default = catalog.default_for(kind.unwrap_or(TransactionType::Expense));
    if category == default {
        format!(
            "No high-confidence match found; defaulted to {}",
            category.name
        )
    } else {
        format!("Classified as {} from the overall description", category.name)
    }
}

/// Explanation for a below-threshold substitution: names both the default
/// that was emitted and the candidate the model suggested.
pub fn explain_rejected_candidate(
    default: &Category,
    candidate: &Category,
    candidate_confidence: f32,
) -> String {
    format!(
        "Defaulted to {} because the best model suggestion {} scored only {:.2}",
        default.name, candidate.name, candidate_confidence
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Category {
        CategoryCatalog::with_defaults()
            .find_by_name(name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_cluster_match_names_terms() {
        let catalog = CategoryCatalog::with_defaults();
        let text = "belanja bulanan di mall";

        let explanation = explain(
            &category("Shopping"),
            text,
            Some(TransactionType::Expense),
            &catalog,
        );
        assert!(explanation.contains("shopping terms"));
        assert!(explanation.contains("belanja"));
        assert!(explanation.contains("mall"));
    }

    #[test]
    fn test_cluster_order_is_first_match_wins() {
        let catalog = CategoryCatalog::with_defaults();
        // Both shopping and food words present; shopping is checked first.
        let explanation = explain(
            &category("Food & Dining"),
            "beli makan siang",
            Some(TransactionType::Expense),
            &catalog,
        );
        assert!(explanation.contains("shopping terms"));
    }

    #[test]
    fn test_default_sentence_when_nothing_matches() {
        let catalog = CategoryCatalog::with_defaults();

        let explanation = explain(
            &category("Other Expense"),
            "xyz unintelligible noise",
            Some(TransactionType::Expense),
            &catalog,
        );
        assert!(explanation.contains("No high-confidence match"));
        assert!(explanation.contains("Other Expense"));
    }

    #[test]
    fn test_generic_sentence_for_non_default() {
        let catalog = CategoryCatalog::with_defaults();

        let explanation = explain(
            &category("Health"),
            "xyz unintelligible noise",
            Some(TransactionType::Expense),
            &catalog,
        );
        assert!(explanation.contains("Health"));
        assert!(explanation.contains("overall description"));
    }

    #[test]
    fn test_explanations_are_deterministic() {
        let catalog = CategoryCatalog::with_defaults();
        let cat = category("Transportation");

        let a = explain(&cat, "isi bensin motor", Some(TransactionType::Expense), &catalog);
        let b = explain(&cat, "isi bensin motor", Some(TransactionType::Expense), &catalog);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejected_candidate_names_both() {
        let explanation = explain_rejected_candidate(
            &category("Other Expense"),
            &category("Travel"),
            0.21,
        );
        assert!(explanation.contains("Other Expense"));
        assert!(explanation.contains("Travel"));
        assert!(explanation.contains("0.21"));
    }
}
