// 🧩 Classifier Context
// All shared read-only state, constructed once at startup and passed into
// decide(). No hidden globals: load-once semantics live here.

use crate::catalog::CategoryCatalog;
use crate::decision::{self, ClassificationRequest, ClassificationResult};
use crate::error::Result;
use crate::model::{InferenceAdapter, ModelArtifacts};
use crate::normalizer::TextNormalizer;
use crate::rules::RuleClassifier;
use std::path::Path;

/// Immutable bundle of catalog, rule tables, normalizer and model adapter.
/// Held for the process lifetime; nothing in it is ever mutated, so it is
/// safe to share across request handlers behind an `Arc`.
pub struct ClassifierContext {
    pub catalog: CategoryCatalog,
    rules: RuleClassifier,
    normalizer: TextNormalizer,
    adapter: InferenceAdapter,
}

impl ClassifierContext {
    /// Assemble a context around an already-built inference adapter. The
    /// catalog, rule tables and normalizer are the fixed built-in ones.
    pub fn new(adapter: InferenceAdapter) -> Self {
        ClassifierContext {
            catalog: CategoryCatalog::with_defaults(),
            rules: RuleClassifier::with_defaults(),
            normalizer: TextNormalizer::with_defaults(),
            adapter,
        }
    }

    /// Load model artifacts from a directory and build the full context.
    /// One-time blocking startup work; a failure here means the service
    /// must report itself unavailable.
    pub fn from_model_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let artifacts = ModelArtifacts::load(dir)?;
        Ok(Self::new(InferenceAdapter::from_artifacts(artifacts)))
    }

    /// The single operation exposed to callers. Deterministic for a given
    /// request and loaded artifacts.
    pub fn decide(&self, request: &ClassificationRequest) -> Result<ClassificationResult> {
        decision::decide(
            request,
            &self.catalog,
            &self.rules,
            &self.normalizer,
            &self.adapter,
        )
    }
}
