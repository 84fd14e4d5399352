use anyhow::{bail, Result};
use std::env;

use transaction_classifier::{ClassificationRequest, ClassifierContext, TransactionType};

/// One-shot CLI: classify a single description and print the JSON result.
///
/// Usage: transaction-classifier <text> [income|expense]
/// Model artifacts are read from $MODEL_DIR (default: model_artifacts).
fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <text> [income|expense]", args[0]);
        std::process::exit(2);
    }

    let text = &args[1];
    let requested_type = match args.get(2) {
        Some(raw) => match TransactionType::parse(raw) {
            Some(kind) => Some(kind),
            None => bail!("unknown transaction type: {} (expected income or expense)", raw),
        },
        None => None,
    };

    let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "model_artifacts".to_string());

    println!("📂 Loading model artifacts from {}...", model_dir);
    let context = ClassifierContext::from_model_dir(&model_dir)?;
    println!("✓ Classifier ready ({} categories)", context.catalog.len());

    let request = ClassificationRequest::new(text, requested_type);
    let result = context.decide(&request)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
