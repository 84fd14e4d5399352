// ⚖️ Decision Combiner - the core decision tree
// Merges the rule classifier and the type-filtered model ranking into one
// deterministic verdict: rule short-circuit, model path, confidence gate.

use crate::catalog::{Category, CategoryCatalog, TransactionType};
use crate::error::{ClassifierError, Result};
use crate::explain;
use crate::model::InferenceAdapter;
use crate::normalizer::TextNormalizer;
use crate::ranker::filter_and_rank;
use crate::rules::RuleClassifier;
use serde::{Deserialize, Serialize};

/// Model candidates below this are replaced by the type's default category.
/// The comparison is inclusive: exactly 0.4 is accepted.
pub const CONFIDENCE_THRESHOLD: f32 = 0.4;
/// Confidence reported when the hardcoded default is emitted with no
/// candidate at all.
pub const DEFAULT_CONFIDENCE: f32 = 0.1;
/// Floor applied when an empty model ranking falls back to a rule verdict.
pub const RULE_FALLBACK_FLOOR: f32 = 0.3;
/// How many ranked alternatives are surfaced as suggestions.
const SUGGESTION_COUNT: usize = 3;

// ============================================================================
// REQUEST / RESULT
// ============================================================================

/// One classification request. Constructed per call, immutable, discarded
/// after the response.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
    #[serde(rename = "type")]
    pub requested_type: Option<TransactionType>,
}

impl ClassificationRequest {
    pub fn new(text: &str, requested_type: Option<TransactionType>) -> Self {
        ClassificationRequest {
            text: text.to_string(),
            requested_type,
        }
    }
}

/// Which stage produced the final category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Rule,
    Model,
    Default,
}

/// The final verdict: exactly one per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f32,
    pub explanation: String,
    pub suggestions: Vec<(Category, f32)>,
    pub source: Source,
}

// ============================================================================
// COMBINER
// ============================================================================

/// Run the full hybrid pipeline for one request.
///
/// State 1: a fired rule verdict (any tier, all >= 0.90) terminates
/// immediately; lexical certainty is never second-guessed by the model.
/// State 2: model inference + type filter; an empty ranking falls back to
/// the rule verdict if one exists, else the type's default.
/// State 3: the top candidate passes the 0.4 gate (inclusive) or the
/// default is substituted while the candidate's own confidence is reported.
pub fn decide(
    request: &ClassificationRequest,
    catalog: &CategoryCatalog,
    rules: &RuleClassifier,
    normalizer: &TextNormalizer,
    adapter: &InferenceAdapter,
) -> Result<ClassificationResult> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ClassifierError::Validation(
            "text must not be empty".to_string(),
        ));
    }
    let kind = request.requested_type;
    let normalized = normalizer.normalize(text);

    // State 1: rule-first short-circuit.
    let verdict = rules.classify(text, &normalized, kind, catalog);
    if verdict.fired() {
        if let Some(category) = verdict.category.clone() {
            tracing::debug!(category = %category.name, confidence = verdict.confidence, "rule short-circuit");
            return Ok(ClassificationResult {
                category,
                confidence: verdict.confidence,
                explanation: verdict.explanation,
                suggestions: Vec::new(),
                source: Source::Rule,
            });
        }
    }

    // State 2: model path.
    let probs = adapter.infer(&normalized, kind)?;
    let ranked = filter_and_rank(&probs, adapter.labels(), kind, catalog);

    let default = catalog
        .default_for(kind.unwrap_or(TransactionType::Expense))
        .clone();

    if ranked.is_empty() {
        // Consistent empty-ranking policy: a rule verdict holding any
        // category (even sub-threshold) wins over the hardcoded default.
        if let Some(category) = verdict.category.clone() {
            tracing::debug!(category = %category.name, "empty ranking, falling back to rule verdict");
            return Ok(ClassificationResult {
                category,
                confidence: verdict.confidence.max(RULE_FALLBACK_FLOOR),
                explanation: verdict.explanation,
                suggestions: Vec::new(),
                source: Source::Rule,
            });
        }
        tracing::debug!(category = %default.name, "empty ranking, emitting default");
        let explanation = explain::explain(&default, &normalized, kind, catalog);
        return Ok(ClassificationResult {
            category: default,
            confidence: DEFAULT_CONFIDENCE,
            explanation,
            suggestions: Vec::new(),
            source: Source::Default,
        });
    }

    // State 3: confidence gate, inclusive at the threshold.
    let (candidate, candidate_confidence) = ranked[0].clone();

    if candidate_confidence >= CONFIDENCE_THRESHOLD {
        let suggestions = build_suggestions(&ranked[1..], &candidate, &verdict);
        let explanation = explain::explain(&candidate, &normalized, kind, catalog);
        tracing::debug!(category = %candidate.name, confidence = candidate_confidence, "model candidate accepted");
        Ok(ClassificationResult {
            category: candidate,
            confidence: candidate_confidence,
            explanation,
            suggestions,
            source: Source::Model,
        })
    } else {
        // Substitute the safe default, but keep reporting the candidate's
        // true confidence so callers see the model's uncertainty.
        let suggestions = build_suggestions(&ranked, &default, &verdict);
        let explanation =
            explain::explain_rejected_candidate(&default, &candidate, candidate_confidence);
        tracing::debug!(
            category = %default.name,
            rejected = %candidate.name,
            confidence = candidate_confidence,
            "model candidate below threshold"
        );
        Ok(ClassificationResult {
            category: default,
            confidence: candidate_confidence,
            explanation,
            suggestions,
            source: Source::Default,
        })
    }
}

/// Top ranked alternatives, excluding the winner, deduplicated and merged
/// with the rule category when one exists and is distinct.
fn build_suggestions(
    ranked: &[(Category, f32)],
    winner: &Category,
    verdict: &crate::rules::RuleVerdict,
) -> Vec<(Category, f32)> {
    let mut suggestions: Vec<(Category, f32)> = Vec::new();

    for (category, confidence) in ranked {
        if suggestions.len() >= SUGGESTION_COUNT {
            break;
        }
        if category == winner || suggestions.iter().any(|(c, _)| c == category) {
            continue;
        }
        suggestions.push((category.clone(), *confidence));
    }

    if let Some(rule_category) = &verdict.category {
        if rule_category != winner && !suggestions.iter().any(|(c, _)| c == rule_category) {
            suggestions.push((rule_category.clone(), verdict.confidence));
        }
    }

    suggestions
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SequenceModel, TokenizerSpec};
    use std::collections::HashMap;

    /// Stub model returning a fixed probability vector.
    struct FixedModel {
        probs: Vec<f32>,
    }

    impl SequenceModel for FixedModel {
        fn predict(&self, _input: &[usize]) -> Result<Vec<f32>> {
            Ok(self.probs.clone())
        }
    }

    fn adapter_with(labels: &[&str], probs: Vec<f32>) -> InferenceAdapter {
        InferenceAdapter::new(
            TokenizerSpec {
                vocab: HashMap::new(),
                input_width: 8,
            },
            labels.iter().map(|l| l.to_string()).collect(),
            Box::new(FixedModel { probs }),
        )
    }

    fn run(
        text: &str,
        kind: Option<TransactionType>,
        labels: &[&str],
        probs: Vec<f32>,
    ) -> Result<ClassificationResult> {
        let catalog = CategoryCatalog::with_defaults();
        let rules = RuleClassifier::with_defaults();
        let normalizer = TextNormalizer::with_defaults();
        let adapter = adapter_with(labels, probs);
        decide(
            &ClassificationRequest::new(text, kind),
            &catalog,
            &rules,
            &normalizer,
            &adapter,
        )
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let err = run("   ", Some(TransactionType::Expense), &["Travel"], vec![1.0]).unwrap_err();
        assert!(matches!(err, ClassifierError::Validation(_)));
    }

    #[test]
    fn test_rule_short_circuit_skips_model() {
        // The stub model screams Travel, but the "gaji" keyword wins first.
        let result = run(
            "Gaji bulanan",
            Some(TransactionType::Income),
            &["Salary", "Bonus"],
            vec![0.0, 1.0],
        )
        .unwrap();

        assert_eq!(result.category.name, "Salary");
        assert_eq!(result.confidence, 0.98);
        assert_eq!(result.source, Source::Rule);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_model_candidate_above_threshold_wins() {
        let result = run(
            "zzz unknown description",
            Some(TransactionType::Expense),
            &["Travel", "Housing", "Shopping", "Health"],
            vec![0.6, 0.2, 0.15, 0.05],
        )
        .unwrap();

        assert_eq!(result.category.name, "Travel");
        assert_eq!(result.confidence, 0.6);
        assert_eq!(result.source, Source::Model);
        // Next-best three, winner excluded.
        let names: Vec<&str> = result.suggestions.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(names, vec!["Housing", "Shopping", "Health"]);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let result = run(
            "zzz unknown description",
            Some(TransactionType::Expense),
            &["Travel", "Housing"],
            vec![0.4, 0.1],
        )
        .unwrap();

        // Exactly 0.4 is at-threshold, not below.
        assert_eq!(result.category.name, "Travel");
        assert_eq!(result.source, Source::Model);
    }

    #[test]
    fn test_below_threshold_substitutes_default_but_reports_candidate_confidence() {
        let result = run(
            "xyz unintelligible noise",
            Some(TransactionType::Expense),
            &["Travel", "Housing", "Shopping"],
            vec![0.2, 0.15, 0.1],
        )
        .unwrap();

        assert_eq!(result.category.name, "Other Expense");
        assert_eq!(result.confidence, 0.2); // candidate's, not the default's
        assert_eq!(result.source, Source::Default);
        assert!(result.explanation.contains("Travel"));
        assert!(result.explanation.contains("Other Expense"));
        // Suggestions are the top ranked three.
        let names: Vec<&str> = result.suggestions.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(names, vec!["Travel", "Housing", "Shopping"]);
    }

    #[test]
    fn test_empty_ranking_emits_default() {
        // Labels hold no income category at all.
        let result = run(
            "zzz unknown description",
            Some(TransactionType::Income),
            &["Travel", "Housing"],
            vec![0.7, 0.3],
        )
        .unwrap();

        assert_eq!(result.category.name, "Other Income");
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(result.source, Source::Default);
    }

    #[test]
    fn test_decide_is_idempotent() {
        let go = || {
            run(
                "zzz unknown description",
                Some(TransactionType::Expense),
                &["Travel", "Housing"],
                vec![0.55, 0.45],
            )
            .unwrap()
        };
        assert_eq!(go(), go());
    }

    #[test]
    fn test_untyped_request_defaults_to_expense_catch_all() {
        let result = run("zzz unknown description", None, &["Salary"], vec![0.05]).unwrap();

        assert_eq!(result.category.name, "Other Expense");
        assert_eq!(result.source, Source::Default);
    }

    #[test]
    fn test_suggestions_are_deduplicated() {
        // Duplicate labels collapse to one suggestion entry.
        let result = run(
            "zzz unknown description",
            Some(TransactionType::Expense),
            &["Travel", "Travel", "Housing"],
            vec![0.6, 0.3, 0.1],
        )
        .unwrap();

        assert_eq!(result.category.name, "Travel");
        let names: Vec<&str> = result.suggestions.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(names, vec!["Housing"]);
    }
}
