// 🏷️ Keyword Rules - Rules as Data
// Type-qualified keyword tables plus the three-tier rule classifier:
// raw-token match (0.98) > stemmed-token match (0.95) > intent sets (0.90).

use crate::catalog::{Category, CategoryCatalog, TransactionType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed confidence tier for an exact raw-token keyword hit.
pub const RULE_EXACT_CONFIDENCE: f32 = 0.98;
/// Fixed confidence tier for a stemmed/normalized keyword hit.
pub const RULE_STEMMED_CONFIDENCE: f32 = 0.95;
/// Fixed confidence tier for an intent keyword-set hit.
pub const RULE_INTENT_CONFIDENCE: f32 = 0.90;

// ============================================================================
// RULE VERDICT
// ============================================================================

/// Output of one rule-classification pass. `category = None` means no rule
/// fired at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    pub category: Option<Category>,
    pub confidence: f32,
    pub explanation: String,
}

impl RuleVerdict {
    pub fn none() -> Self {
        RuleVerdict {
            category: None,
            confidence: 0.0,
            explanation: String::new(),
        }
    }

    fn hit(category: Category, confidence: f32, explanation: String) -> Self {
        RuleVerdict {
            category: Some(category),
            confidence,
            explanation,
        }
    }

    /// True when any tier fired; every tier clears the combiner's 0.90 gate.
    pub fn fired(&self) -> bool {
        self.category.is_some() && self.confidence >= RULE_INTENT_CONFIDENCE
    }
}

// ============================================================================
// KEYWORD RULE TABLE
// ============================================================================

// token → category name, per transaction type. Keeping the two types in
// separate maps lets the same surface token mean different things: "sewa"
// is Housing when spending and Rental Income when receiving.

const INCOME_KEYWORDS: &[(&str, &str)] = &[
    ("gaji", "Salary"),
    ("salary", "Salary"),
    ("payroll", "Salary"),
    ("upah", "Salary"),
    ("bonus", "Bonus"),
    ("insentif", "Bonus"),
    ("dividen", "Dividends"),
    ("dividend", "Dividends"),
    ("bunga", "Interest"),
    ("interest", "Interest"),
    ("sewa", "Rental Income"),
    ("kontrakan", "Rental Income"),
    ("freelance", "Freelance"),
    ("proyek", "Freelance"),
    ("honor", "Freelance"),
    ("komisi", "Commission"),
    ("commission", "Commission"),
    ("hadiah", "Gift"),
    ("gift", "Gift"),
    ("refund", "Refund"),
    ("cashback", "Refund"),
    ("untung", "Business Income"),
    ("laba", "Business Income"),
    ("omzet", "Business Income"),
    ("jual", "Business Income"),
    ("dagang", "Business Income"),
    ("investasi", "Investment Returns"),
    ("saham", "Investment Returns"),
    ("reksadana", "Investment Returns"),
    ("crypto", "Investment Returns"),
    ("pensiun", "Pension"),
    ("pension", "Pension"),
    ("tunjangan", "Allowance"),
    ("allowance", "Allowance"),
];

const EXPENSE_KEYWORDS: &[(&str, &str)] = &[
    // food & dining
    ("makan", "Food & Dining"),
    ("makanan", "Food & Dining"),
    ("restoran", "Food & Dining"),
    ("resto", "Food & Dining"),
    ("kopi", "Food & Dining"),
    ("coffee", "Food & Dining"),
    ("cafe", "Food & Dining"),
    ("warung", "Food & Dining"),
    ("grocery", "Food & Dining"),
    ("groceries", "Food & Dining"),
    ("starbucks", "Food & Dining"),
    ("kfc", "Food & Dining"),
    // groceries
    ("sayur", "Groceries"),
    ("buah", "Groceries"),
    ("supermarket", "Groceries"),
    ("indomaret", "Groceries"),
    ("alfamart", "Groceries"),
    ("pasar", "Groceries"),
    // shopping
    ("belanja", "Shopping"),
    ("mall", "Shopping"),
    ("tokopedia", "Shopping"),
    ("shopee", "Shopping"),
    ("lazada", "Shopping"),
    ("bukalapak", "Shopping"),
    // clothing
    ("baju", "Clothing"),
    ("celana", "Clothing"),
    ("sepatu", "Clothing"),
    ("clothing", "Clothing"),
    ("fashion", "Clothing"),
    ("uniqlo", "Clothing"),
    // transportation
    ("ojek", "Transportation"),
    ("gojek", "Transportation"),
    ("grab", "Transportation"),
    ("bensin", "Transportation"),
    ("fuel", "Transportation"),
    ("parkir", "Transportation"),
    ("tol", "Transportation"),
    ("kereta", "Transportation"),
    ("krl", "Transportation"),
    ("mrt", "Transportation"),
    ("busway", "Transportation"),
    ("taksi", "Transportation"),
    ("taxi", "Transportation"),
    ("angkot", "Transportation"),
    // travel
    ("hotel", "Travel"),
    ("tiket", "Travel"),
    ("flight", "Travel"),
    ("pesawat", "Travel"),
    ("liburan", "Travel"),
    ("libur", "Travel"),
    ("wisata", "Travel"),
    ("traveloka", "Travel"),
    ("airbnb", "Travel"),
    // housing
    ("sewa", "Housing"),
    ("kos", "Housing"),
    ("kost", "Housing"),
    ("rent", "Housing"),
    ("apartemen", "Housing"),
    // home & furniture
    ("furniture", "Home & Furniture"),
    ("sofa", "Home & Furniture"),
    ("kasur", "Home & Furniture"),
    ("ikea", "Home & Furniture"),
    ("perabot", "Home & Furniture"),
    // utilities
    ("listrik", "Utilities"),
    ("pln", "Utilities"),
    ("token", "Utilities"),
    ("air", "Utilities"),
    ("pdam", "Utilities"),
    ("gas", "Utilities"),
    // internet & phone
    ("pulsa", "Internet & Phone"),
    ("internet", "Internet & Phone"),
    ("wifi", "Internet & Phone"),
    ("kuota", "Internet & Phone"),
    ("telpon", "Internet & Phone"),
    ("phone", "Internet & Phone"),
    // entertainment
    ("bioskop", "Entertainment"),
    ("cinema", "Entertainment"),
    ("movie", "Entertainment"),
    ("film", "Entertainment"),
    ("game", "Entertainment"),
    ("konser", "Entertainment"),
    ("karaoke", "Entertainment"),
    // subscriptions
    ("netflix", "Subscriptions"),
    ("spotify", "Subscriptions"),
    ("youtube", "Subscriptions"),
    ("icloud", "Subscriptions"),
    ("langganan", "Subscriptions"),
    ("subscription", "Subscriptions"),
    // health
    ("dokter", "Health"),
    ("obat", "Health"),
    ("apotek", "Health"),
    ("hospital", "Health"),
    ("klinik", "Health"),
    ("vitamin", "Health"),
    // insurance
    ("asuransi", "Insurance"),
    ("insurance", "Insurance"),
    ("premi", "Insurance"),
    ("bpjs", "Insurance"),
    // education
    ("sekolah", "Education"),
    ("kuliah", "Education"),
    ("kampus", "Education"),
    ("buku", "Education"),
    ("kursus", "Education"),
    ("les", "Education"),
    ("tuition", "Education"),
    ("spp", "Education"),
    // personal care
    ("salon", "Personal Care"),
    ("skincare", "Personal Care"),
    ("kosmetik", "Personal Care"),
    ("barber", "Personal Care"),
    ("spa", "Personal Care"),
    // electronics
    ("laptop", "Electronics"),
    ("hp", "Electronics"),
    ("handphone", "Electronics"),
    ("gadget", "Electronics"),
    ("elektronik", "Electronics"),
    ("iphone", "Electronics"),
    // sports & fitness
    ("gym", "Sports & Fitness"),
    ("fitness", "Sports & Fitness"),
    ("futsal", "Sports & Fitness"),
    ("yoga", "Sports & Fitness"),
    ("olahraga", "Sports & Fitness"),
    // pets
    ("kucing", "Pets"),
    ("anjing", "Pets"),
    ("petshop", "Pets"),
    ("vet", "Pets"),
    // bills & fees
    ("admin", "Bills & Fees"),
    ("biaya", "Bills & Fees"),
    ("fee", "Bills & Fees"),
    ("tagihan", "Bills & Fees"),
    ("denda", "Bills & Fees"),
    ("gopay", "Bills & Fees"),
    ("ovo", "Bills & Fees"),
    ("shopeepay", "Bills & Fees"),
    ("linkaja", "Bills & Fees"),
    ("qris", "Bills & Fees"),
    // taxes
    ("pajak", "Taxes"),
    ("tax", "Taxes"),
    ("pbb", "Taxes"),
    ("npwp", "Taxes"),
    // donations & charity
    ("donasi", "Donations & Charity"),
    ("donation", "Donations & Charity"),
    ("charity", "Donations & Charity"),
    ("zakat", "Donations & Charity"),
    ("sedekah", "Donations & Charity"),
    ("infaq", "Donations & Charity"),
    ("amal", "Donations & Charity"),
    // family support
    ("keluarga", "Family Support"),
    ("ortu", "Family Support"),
    ("orangtua", "Family Support"),
    // debt payment
    ("cicilan", "Debt Payment"),
    ("kredit", "Debt Payment"),
    ("pinjaman", "Debt Payment"),
    ("hutang", "Debt Payment"),
    ("utang", "Debt Payment"),
    ("paylater", "Debt Payment"),
    ("kpr", "Debt Payment"),
    // business expense
    ("kantor", "Business Expense"),
    ("office", "Business Expense"),
    ("supplier", "Business Expense"),
    ("vendor", "Business Expense"),
];

/// Static keyword → category-name tables, one map per transaction type.
#[derive(Debug)]
pub struct KeywordRuleTable {
    income: HashMap<&'static str, &'static str>,
    expense: HashMap<&'static str, &'static str>,
}

impl KeywordRuleTable {
    pub fn with_defaults() -> Self {
        let income: HashMap<_, _> = INCOME_KEYWORDS.iter().copied().collect();
        let expense: HashMap<_, _> = EXPENSE_KEYWORDS.iter().copied().collect();

        // Within one type a token maps to exactly one category.
        debug_assert_eq!(income.len(), INCOME_KEYWORDS.len());
        debug_assert_eq!(expense.len(), EXPENSE_KEYWORDS.len());

        KeywordRuleTable { income, expense }
    }

    /// Look up a token in the table for the requested type. Without a type,
    /// expense is consulted first (expense traffic dominates), then income.
    pub fn lookup(&self, token: &str, kind: Option<TransactionType>) -> Option<&'static str> {
        match kind {
            Some(TransactionType::Income) => self.income.get(token).copied(),
            Some(TransactionType::Expense) => self.expense.get(token).copied(),
            None => self
                .expense
                .get(token)
                .or_else(|| self.income.get(token))
                .copied(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.income.len() + self.expense.len()
    }
}

impl Default for KeywordRuleTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// INTENT KEYWORD SETS
// ============================================================================

// Generic (non-brand) words indicating a coarse spending category. Tested
// in this fixed priority order; the first set with any overlap wins.
const INTENT_SETS: &[(&str, &[&str])] = &[
    (
        "Shopping",
        &["beli", "buy", "purchase", "shop", "shopp", "order", "pesan", "checkout"],
    ),
    (
        "Food & Dining",
        &["minum", "jajan", "lunch", "dinner", "breakfast", "eat", "food", "snack", "kuliner"],
    ),
    (
        "Transportation",
        &["transport", "commute", "ride", "antar", "jemput", "perjalanan"],
    ),
    (
        "Travel",
        &["trip", "vacation", "holiday", "tour", "penginapan", "villa"],
    ),
];

// ============================================================================
// RULE CLASSIFIER
// ============================================================================

/// Applies the keyword table to raw then normalized tokens, with intent-set
/// matching as the final expense-only pass. Strictly ordered, first match
/// wins.
pub struct RuleClassifier {
    table: KeywordRuleTable,
}

impl RuleClassifier {
    pub fn new(table: KeywordRuleTable) -> Self {
        RuleClassifier { table }
    }

    pub fn with_defaults() -> Self {
        Self::new(KeywordRuleTable::with_defaults())
    }

    /// Classify against the rule tables. `raw_text` is the request text as
    /// received; `normalized_text` is the normalizer's output for it.
    pub fn classify(
        &self,
        raw_text: &str,
        normalized_text: &str,
        kind: Option<TransactionType>,
        catalog: &CategoryCatalog,
    ) -> RuleVerdict {
        // Pass 1: raw lowercased tokens. Exact brand and proper-noun matches
        // win before stemming can distort them.
        let raw_lower = raw_text.to_lowercase();
        for token in raw_lower.split_whitespace() {
            if let Some(verdict) =
                self.keyword_verdict(token, kind, catalog, RULE_EXACT_CONFIDENCE)
            {
                return verdict;
            }
        }

        // Pass 2: normalized tokens, same lookup, lower tier.
        for token in normalized_text.split_whitespace() {
            if let Some(verdict) =
                self.keyword_verdict(token, kind, catalog, RULE_STEMMED_CONFIDENCE)
            {
                return verdict;
            }
        }

        // Pass 3: intent keyword sets, expense only.
        if kind != Some(TransactionType::Income) {
            let tokens: Vec<&str> = normalized_text.split_whitespace().collect();
            for (category_name, intent_words) in INTENT_SETS {
                let matched: Vec<&str> = intent_words
                    .iter()
                    .copied()
                    .filter(|word| tokens.contains(word))
                    .collect();
                if matched.is_empty() {
                    continue;
                }
                if let Some(category) = catalog.find_by_name(category_name) {
                    return RuleVerdict::hit(
                        category.clone(),
                        RULE_INTENT_CONFIDENCE,
                        format!(
                            "Matched {} intent terms: {}",
                            category_name.to_lowercase(),
                            matched.join(", ")
                        ),
                    );
                }
            }
        }

        RuleVerdict::none()
    }

    fn keyword_verdict(
        &self,
        token: &str,
        kind: Option<TransactionType>,
        catalog: &CategoryCatalog,
        confidence: f32,
    ) -> Option<RuleVerdict> {
        let category_name = self.table.lookup(token, kind)?;
        let category = catalog.find_by_name(category_name)?;
        // A type filter on the request must also hold for the category.
        if let Some(kind) = kind {
            if category.kind != kind {
                return None;
            }
        }
        Some(RuleVerdict::hit(
            category.clone(),
            confidence,
            format!("Matched keyword \"{}\" for {}", token, category_name),
        ))
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
