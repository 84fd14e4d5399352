// 🧠 Model Inference Adapter
// The only place the external sequence classifier is touched: tokenize,
// pad/truncate to the trained width, invoke, hand back the softmax output.
// No business logic lives here.

use crate::catalog::TransactionType;
use crate::error::{ClassifierError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Reserved index for padding.
pub const PAD_INDEX: usize = 0;
/// Reserved index for out-of-vocabulary tokens.
pub const OOV_INDEX: usize = 1;

/// The opaque external network: fixed-width token ids in, native softmax
/// out. Output probabilities are the model's own; the core never
/// re-normalizes them.
pub trait SequenceModel: Send + Sync {
    fn predict(&self, input: &[usize]) -> Result<Vec<f32>>;
}

// ============================================================================
// ARTIFACTS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerSpec {
    /// token → index; indices 0 and 1 are reserved for pad/OOV.
    pub vocab: HashMap<String, usize>,
    /// Fixed input width the network was trained with.
    pub input_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct WeightsSpec {
    /// One row of label logits per vocabulary index.
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

/// The tokenizer / label-index / weights trio loaded at startup.
pub struct ModelArtifacts {
    pub tokenizer: TokenizerSpec,
    pub labels: Vec<String>,
    pub model: BowSoftmaxModel,
}

impl ModelArtifacts {
    /// Load `tokenizer.json`, `labels.json` and `weights.json` from a
    /// model directory. Any failure is fatal to serving.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let tokenizer: TokenizerSpec = read_json(&dir.join("tokenizer.json"))?;
        let labels: Vec<String> = read_json(&dir.join("labels.json"))?;
        let weights: WeightsSpec = read_json(&dir.join("weights.json"))?;

        if labels.is_empty() {
            return Err(ClassifierError::ArtifactLoad {
                path: dir.join("labels.json").display().to_string(),
                reason: "label index is empty".to_string(),
            });
        }
        if weights.bias.len() != labels.len()
            || weights.weights.iter().any(|row| row.len() != labels.len())
        {
            return Err(ClassifierError::ArtifactLoad {
                path: dir.join("weights.json").display().to_string(),
                reason: format!(
                    "weight shape does not match {} labels",
                    labels.len()
                ),
            });
        }

        tracing::info!(
            vocab = tokenizer.vocab.len(),
            labels = labels.len(),
            input_width = tokenizer.input_width,
            "model artifacts loaded"
        );

        Ok(ModelArtifacts {
            tokenizer,
            labels,
            model: BowSoftmaxModel {
                weights: weights.weights,
                bias: weights.bias,
            },
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| ClassifierError::ArtifactLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ClassifierError::ArtifactLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// BAG-OF-WORDS SOFTMAX MODEL
// ============================================================================

/// Concrete in-crate SequenceModel: sums the weight row of every non-pad
/// token id, adds the bias, applies softmax.
pub struct BowSoftmaxModel {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl BowSoftmaxModel {
    pub fn new(weights: Vec<Vec<f32>>, bias: Vec<f32>) -> Self {
        BowSoftmaxModel { weights, bias }
    }
}

impl SequenceModel for BowSoftmaxModel {
    fn predict(&self, input: &[usize]) -> Result<Vec<f32>> {
        let mut logits = self.bias.clone();
        for &id in input {
            if id == PAD_INDEX {
                continue;
            }
            let row = self.weights.get(id).ok_or_else(|| {
                ClassifierError::Inference(format!(
                    "token id {} outside weight matrix of {} rows",
                    id,
                    self.weights.len()
                ))
            })?;
            for (logit, w) in logits.iter_mut().zip(row) {
                *logit += w;
            }
        }
        Ok(softmax(&logits))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

// ============================================================================
// INFERENCE ADAPTER
// ============================================================================

/// Wraps the network with its tokenizer and label index.
pub struct InferenceAdapter {
    vocab: HashMap<String, usize>,
    input_width: usize,
    labels: Vec<String>,
    model: Box<dyn SequenceModel>,
}

impl InferenceAdapter {
    pub fn new(tokenizer: TokenizerSpec, labels: Vec<String>, model: Box<dyn SequenceModel>) -> Self {
        InferenceAdapter {
            vocab: tokenizer.vocab,
            input_width: tokenizer.input_width,
            labels,
            model,
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        let ModelArtifacts {
            tokenizer,
            labels,
            model,
        } = artifacts;
        Self::new(tokenizer, labels, Box::new(model))
    }

    /// Label names aligned to the probability vector's indices.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Run inference on normalized text. A requested type is appended as a
    /// literal tag token so the model can condition on it without
    /// retraining.
    pub fn infer(&self, normalized_text: &str, kind: Option<TransactionType>) -> Result<Vec<f32>> {
        let input = self.encode(normalized_text, kind);
        let probs = self.model.predict(&input)?;
        if probs.len() != self.labels.len() {
            return Err(ClassifierError::Inference(format!(
                "model returned {} probabilities for {} labels",
                probs.len(),
                self.labels.len()
            )));
        }
        Ok(probs)
    }

    /// Token ids, post-padded / truncated to the trained input width.
    pub fn encode(&self, text: &str, kind: Option<TransactionType>) -> Vec<usize> {
        let tagged = match kind {
            Some(kind) => format!("{} [type:{}]", text, kind),
            None => text.to_string(),
        };

        let mut ids: Vec<usize> = tagged
            .split_whitespace()
            .map(|token| self.vocab.get(token).copied().unwrap_or(OOV_INDEX))
            .collect();

        ids.truncate(self.input_width);
        while ids.len() < self.input_width {
            ids.push(PAD_INDEX);
        }
        ids
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tokenizer() -> TokenizerSpec {
        TokenizerSpec {
            vocab: HashMap::from([
                ("gaji".to_string(), 2),
                ("makan".to_string(), 3),
                ("[type:income]".to_string(), 4),
                ("[type:expense]".to_string(), 5),
            ]),
            input_width: 6,
        }
    }

    fn adapter() -> InferenceAdapter {
        // 6 vocab rows (pad, oov, gaji, makan, two tags), 2 labels
        let weights = vec![
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![2.0, -2.0],
            vec![-2.0, 2.0],
            vec![0.5, -0.5],
            vec![-0.5, 0.5],
        ];
        let model = BowSoftmaxModel::new(weights, vec![0.0, 0.0]);
        InferenceAdapter::new(
            tokenizer(),
            vec!["Salary".to_string(), "Food & Dining".to_string()],
            Box::new(model),
        )
    }

    #[test]
    fn test_encode_pads_to_input_width() {
        let ids = adapter().encode("gaji", None);
        assert_eq!(ids, vec![2, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_truncates_long_input() {
        let ids = adapter().encode("gaji makan gaji makan gaji makan gaji", None);
        assert_eq!(ids.len(), 6);
        assert_eq!(ids, vec![2, 3, 2, 3, 2, 3]);
    }

    #[test]
    fn test_encode_maps_oov_to_reserved_index() {
        let ids = adapter().encode("mystery gaji", None);
        assert_eq!(ids[0], OOV_INDEX);
        assert_eq!(ids[1], 2);
    }

    #[test]
    fn test_encode_appends_type_tag() {
        let ids = adapter().encode("gaji", Some(TransactionType::Income));
        assert_eq!(ids[0], 2);
        assert_eq!(ids[1], 4); // [type:income]
    }

    #[test]
    fn test_predict_is_softmax_normalized() {
        let probs = adapter().infer("gaji", None).unwrap();
        assert_eq!(probs.len(), 2);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1]); // "gaji" pulls toward Salary
    }

    #[test]
    fn test_predict_rejects_out_of_range_id() {
        let model = BowSoftmaxModel::new(vec![vec![0.0]], vec![0.0]);
        let err = model.predict(&[7]).unwrap_err();
        assert!(matches!(err, ClassifierError::Inference(_)));
    }

    #[test]
    fn test_artifact_loading_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        fs::write(
            dir.path().join("tokenizer.json"),
            r#"{"vocab": {"gaji": 2}, "input_width": 4}"#,
        )
        .unwrap();
        fs::write(dir.path().join("labels.json"), r#"["Salary"]"#).unwrap();
        fs::write(
            dir.path().join("weights.json"),
            r#"{"weights": [[0.0], [0.0], [1.0]], "bias": [0.0]}"#,
        )
        .unwrap();

        let artifacts = ModelArtifacts::load(dir.path()).unwrap();
        assert_eq!(artifacts.labels, vec!["Salary"]);
        assert_eq!(artifacts.tokenizer.input_width, 4);
    }

    #[test]
    fn test_artifact_loading_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let Err(err) = ModelArtifacts::load(dir.path()) else {
            panic!("load must fail on an empty directory");
        };
        assert!(matches!(err, ClassifierError::ArtifactLoad { .. }));
    }

    #[test]
    fn test_artifact_loading_shape_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();

        fs::write(
            dir.path().join("tokenizer.json"),
            r#"{"vocab": {}, "input_width": 4}"#,
        )
        .unwrap();
        fs::write(dir.path().join("labels.json"), r#"["Salary", "Bonus"]"#).unwrap();
        fs::write(
            dir.path().join("weights.json"),
            r#"{"weights": [[0.0]], "bias": [0.0]}"#,
        )
        .unwrap();

        let Err(err) = ModelArtifacts::load(dir.path()) else {
            panic!("load must fail on a weights/labels shape mismatch");
        };
        assert!(matches!(err, ClassifierError::ArtifactLoad { .. }));
    }
}
