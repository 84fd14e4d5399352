// Transaction Classifier - Core Library
// Hybrid rule + model classification of financial transaction descriptions.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod catalog;
pub mod context;
pub mod decision;
pub mod error;
pub mod explain;
pub mod model;
pub mod normalizer;
pub mod ranker;
pub mod rules;

// Re-export commonly used types
pub use catalog::{Category, CategoryCatalog, TransactionType};
pub use context::ClassifierContext;
pub use decision::{
    ClassificationRequest, ClassificationResult, Source, CONFIDENCE_THRESHOLD,
    DEFAULT_CONFIDENCE,
};
pub use error::{ClassifierError, Result};
pub use model::{
    BowSoftmaxModel, InferenceAdapter, ModelArtifacts, SequenceModel, TokenizerSpec, OOV_INDEX,
    PAD_INDEX,
};
pub use normalizer::{AffixStemmer, StemError, Stemmer, TextNormalizer};
pub use ranker::filter_and_rank;
pub use rules::{
    KeywordRuleTable, RuleClassifier, RuleVerdict, RULE_EXACT_CONFIDENCE,
    RULE_INTENT_CONFIDENCE, RULE_STEMMED_CONFIDENCE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
