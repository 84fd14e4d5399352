// 🧹 Text Normalizer - lowercase, strip, brand dictionary, stemming
// Bilingual (English / Indonesian) preprocessing shared by the rule
// classifier and the model adapter.

use std::collections::HashMap;
use thiserror::Error;

/// Stemming failed for a single token. Always recovered locally by the
/// normalizer; never crosses a module boundary.
#[derive(Debug, Error)]
#[error("cannot stem token: {token}")]
pub struct StemError {
    pub token: String,
}

/// External stemmer collaborator: one normalized token per input token.
pub trait Stemmer: Send + Sync {
    fn stem(&self, token: &str) -> Result<String, StemError>;
}

// ============================================================================
// DEFAULT STEMMER
// ============================================================================

/// Lightweight affix stripper covering the Indonesian prefixes/suffixes and
/// English inflections that show up in transaction descriptions. Swappable
/// behind the Stemmer trait for anything heavier.
#[derive(Debug, Default)]
pub struct AffixStemmer;

const ID_PREFIXES: &[&str] = &[
    "meng", "meny", "mem", "men", "me", "peng", "peny", "pem", "pen", "per",
    "pe", "ber", "ter", "di", "ke", "se",
];
const ID_SUFFIXES: &[&str] = &["lah", "kah", "nya", "kan", "an"];
const EN_SUFFIXES: &[&str] = &["ing", "ed", "es"];

impl AffixStemmer {
    fn strip_prefix(token: &str) -> &str {
        for prefix in ID_PREFIXES {
            if let Some(rest) = token.strip_prefix(prefix) {
                // Keep at least a three-letter stem so short roots survive.
                if rest.len() >= 3 {
                    return rest;
                }
            }
        }
        token
    }

    fn strip_suffix(token: &str) -> &str {
        for suffix in ID_SUFFIXES.iter().chain(EN_SUFFIXES) {
            if let Some(rest) = token.strip_suffix(suffix) {
                // Four-letter minimum: keeps "makan" from collapsing to "mak".
                if rest.len() >= 4 {
                    return rest;
                }
            }
        }
        // English plural, guarded against "-ss"/"-us"/"-is" words like "bonus".
        if token.len() >= 5
            && token.ends_with('s')
            && !token.ends_with("ss")
            && !token.ends_with("us")
            && !token.ends_with("is")
        {
            return &token[..token.len() - 1];
        }
        token
    }
}

impl Stemmer for AffixStemmer {
    fn stem(&self, token: &str) -> Result<String, StemError> {
        if token.is_empty() {
            return Err(StemError {
                token: token.to_string(),
            });
        }
        // Numeric tokens pass through untouched.
        if token.chars().all(|c| c.is_ascii_digit()) {
            return Ok(token.to_string());
        }
        let stripped = Self::strip_suffix(Self::strip_prefix(token));
        Ok(stripped.to_string())
    }
}

// ============================================================================
// TEXT NORMALIZER
// ============================================================================

/// Normalization pipeline: lowercase → strip punctuation → collapse
/// whitespace → per-token brand/slang substitution or stemming.
pub struct TextNormalizer {
    brand_dictionary: HashMap<&'static str, &'static str>,
    stemmer: Box<dyn Stemmer>,
}

impl TextNormalizer {
    pub fn new(stemmer: Box<dyn Stemmer>) -> Self {
        TextNormalizer {
            brand_dictionary: brand_dictionary(),
            stemmer,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(Box::new(AffixStemmer))
    }

    /// Normalize a full description. Stemmer failure on a token falls back
    /// to the raw token; a single bad token never fails the request.
    pub fn normalize(&self, text: &str) -> String {
        let cleaned = clean(text);

        let mut out: Vec<String> = Vec::new();
        for token in cleaned.split_whitespace() {
            if let Some(canonical) = self.brand_dictionary.get(token) {
                out.push((*canonical).to_string());
                continue;
            }
            match self.stemmer.stem(token) {
                Ok(stemmed) => out.push(stemmed),
                Err(_) => out.push(token.to_string()),
            }
        }
        out.join(" ")
    }
}

/// Lowercase, drop anything that is neither word character nor whitespace,
/// collapse whitespace runs, trim. Punctuation is removed, not replaced:
/// "go-pay" becomes "gopay" so the brand dictionary still sees it.
fn clean(text: &str) -> String {
    let lower = text.to_lowercase();
    let filtered: String = lower
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bilingual brand/slang dictionary. Values are canonical surface tokens
/// (sometimes the brand itself, sometimes a generic word the rule table and
/// the model vocabulary both know), not category names.
fn brand_dictionary() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        // e-wallets / payments keep their own surface form
        ("gopay", "gopay"),
        ("ovo", "ovo"),
        ("shopeepay", "shopeepay"),
        ("linkaja", "linkaja"),
        ("qris", "qris"),
        // investment apps collapse to the generic word
        ("bibit", "investasi"),
        ("ajaib", "investasi"),
        ("pluang", "investasi"),
        ("stockbit", "saham"),
        // ride hailing / delivery
        ("gojek", "ojek"),
        ("grab", "ojek"),
        ("gocar", "ojek"),
        ("gofood", "makan"),
        ("grabfood", "makan"),
        ("shopeefood", "makan"),
        // marketplaces
        ("tokopedia", "belanja"),
        ("shopee", "belanja"),
        ("lazada", "belanja"),
        ("bukalapak", "belanja"),
        // streaming keeps its own surface form
        ("netflix", "netflix"),
        ("spotify", "spotify"),
        ("disneyplus", "netflix"),
        // utilities / telcos
        ("pln", "listrik"),
        ("pdam", "air"),
        ("indihome", "internet"),
        ("telkomsel", "pulsa"),
        ("xl", "pulsa"),
        ("indosat", "pulsa"),
        // slang
        ("thr", "bonus"),
        ("duit", "uang"),
        ("gajian", "gaji"),
    ])
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Stemmer that always fails, to exercise the fallback path.
    struct BrokenStemmer;

    impl Stemmer for BrokenStemmer {
        fn stem(&self, token: &str) -> Result<String, StemError> {
            Err(StemError {
                token: token.to_string(),
            })
        }
    }

    #[test]
    fn test_clean_lowercases_and_strips_punctuation() {
        assert_eq!(clean("Bayar KOPI, 2x!!"), "bayar kopi 2x");
        assert_eq!(clean("  a   b\t c  "), "a b c");
        assert_eq!(clean("go-pay top.up"), "gopay topup");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_brand_dictionary_substitution() {
        let normalizer = TextNormalizer::with_defaults();

        // "bibit" is an investment app, canonicalized to "investasi"
        assert_eq!(normalizer.normalize("Bibit"), "investasi");
        // "gopay" canonicalizes to itself
        assert!(normalizer.normalize("top up GoPay").contains("gopay"));
    }

    #[test]
    fn test_indonesian_affix_stripping() {
        let stemmer = AffixStemmer;

        assert_eq!(stemmer.stem("pembayaran").unwrap(), "bayar");
        assert_eq!(stemmer.stem("makanan").unwrap(), "makan");
        assert_eq!(stemmer.stem("berbelanja").unwrap(), "belanja");
    }

    #[test]
    fn test_english_inflection_stripping() {
        let stemmer = AffixStemmer;

        assert_eq!(stemmer.stem("payments").unwrap(), "payment");
        assert_eq!(stemmer.stem("shopping").unwrap(), "shopp");
        // plural guard: "-us" words keep their s
        assert_eq!(stemmer.stem("bonus").unwrap(), "bonus");
    }

    #[test]
    fn test_short_roots_survive() {
        let stemmer = AffixStemmer;

        assert_eq!(stemmer.stem("makan").unwrap(), "makan");
        assert_eq!(stemmer.stem("sewa").unwrap(), "sewa");
        assert_eq!(stemmer.stem("beli").unwrap(), "beli");
    }

    #[test]
    fn test_trailing_i_is_not_an_affix() {
        let stemmer = AffixStemmer;

        // Stripping "-i" would push these roots out of the keyword tables
        // and the model vocabulary.
        assert_eq!(stemmer.stem("investasi").unwrap(), "investasi");
        assert_eq!(stemmer.stem("asuransi").unwrap(), "asuransi");
        assert_eq!(stemmer.stem("kopi").unwrap(), "kopi");
    }

    #[test]
    fn test_numbers_pass_through() {
        let stemmer = AffixStemmer;
        assert_eq!(stemmer.stem("2024").unwrap(), "2024");
    }

    #[test]
    fn test_stemmer_failure_falls_back_to_raw_token() {
        let normalizer = TextNormalizer::new(Box::new(BrokenStemmer));

        // Every stem fails, so tokens survive verbatim (minus cleaning).
        assert_eq!(normalizer.normalize("Beli Kopi!"), "beli kopi");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = TextNormalizer::with_defaults();
        let a = normalizer.normalize("Pembayaran GoFood bulanan");
        let b = normalizer.normalize("Pembayaran GoFood bulanan");
        assert_eq!(a, b);
    }
}
