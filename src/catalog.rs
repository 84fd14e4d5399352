// 🏷️ Category Catalog - fixed income/expense taxonomy
// Hand-authored, declaration-ordered, loaded once and never mutated

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TRANSACTION TYPE
// ============================================================================

/// Partition of the catalog: money in or money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse a request-supplied type string. Anything other than the two
    /// recognized values is a validation error at the caller.
    pub fn parse(value: &str) -> Option<TransactionType> {
        match value.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

/// One named bucket in the taxonomy. Immutable value: name plus type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Category {
    pub fn new(name: &str, kind: TransactionType) -> Self {
        Category {
            name: name.to_string(),
            kind,
        }
    }
}

// ============================================================================
// CATEGORY CATALOG
// ============================================================================

/// The full fixed catalog. Declaration order matters: the ranker breaks
/// probability ties by position here, first declared wins.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    /// Build the hand-authored catalog: 14 income + 26 expense categories,
    /// each type ending in its catch-all.
    pub fn with_defaults() -> Self {
        use TransactionType::{Expense, Income};

        let categories = vec![
            // ----------------------------------------------------------------
            // INCOME
            // ----------------------------------------------------------------
            Category::new("Salary", Income),
            Category::new("Business Income", Income),
            Category::new("Freelance", Income),
            Category::new("Investment Returns", Income),
            Category::new("Dividends", Income),
            Category::new("Interest", Income),
            Category::new("Rental Income", Income),
            Category::new("Bonus", Income),
            Category::new("Commission", Income),
            Category::new("Gift", Income),
            Category::new("Refund", Income),
            Category::new("Allowance", Income),
            Category::new("Pension", Income),
            Category::new("Other Income", Income),
            // ----------------------------------------------------------------
            // EXPENSE
            // ----------------------------------------------------------------
            Category::new("Food & Dining", Expense),
            Category::new("Groceries", Expense),
            Category::new("Shopping", Expense),
            Category::new("Clothing", Expense),
            Category::new("Transportation", Expense),
            Category::new("Travel", Expense),
            Category::new("Housing", Expense),
            Category::new("Home & Furniture", Expense),
            Category::new("Utilities", Expense),
            Category::new("Internet & Phone", Expense),
            Category::new("Entertainment", Expense),
            Category::new("Subscriptions", Expense),
            Category::new("Health", Expense),
            Category::new("Insurance", Expense),
            Category::new("Education", Expense),
            Category::new("Personal Care", Expense),
            Category::new("Electronics", Expense),
            Category::new("Sports & Fitness", Expense),
            Category::new("Pets", Expense),
            Category::new("Bills & Fees", Expense),
            Category::new("Taxes", Expense),
            Category::new("Donations & Charity", Expense),
            Category::new("Family Support", Expense),
            Category::new("Debt Payment", Expense),
            Category::new("Business Expense", Expense),
            Category::new("Other Expense", Expense),
        ];

        // Invariant: one type per name across the whole catalog.
        debug_assert!({
            let mut names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
            names.sort_unstable();
            names.windows(2).all(|w| w[0] != w[1])
        });

        CategoryCatalog { categories }
    }

    /// Find a category by exact name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let lower = name.to_lowercase();
        self.categories
            .iter()
            .find(|cat| cat.name.to_lowercase() == lower)
    }

    /// Declaration index of a category name. Used by the ranker's tie-break.
    pub fn position(&self, name: &str) -> Option<usize> {
        let lower = name.to_lowercase();
        self.categories
            .iter()
            .position(|cat| cat.name.to_lowercase() == lower)
    }

    /// The catch-all category for a type ("Other Income" / "Other Expense").
    pub fn default_for(&self, kind: TransactionType) -> &Category {
        let name = match kind {
            TransactionType::Income => "Other Income",
            TransactionType::Expense => "Other Expense",
        };
        // The catch-alls are part of the fixed catalog, so this lookup
        // cannot fail for a catalog built by with_defaults().
        self.find_by_name(name)
            .unwrap_or_else(|| &self.categories[self.categories.len() - 1])
    }

    /// All categories of a given type, in declaration order.
    pub fn by_type(&self, kind: TransactionType) -> Vec<&Category> {
        self.categories.iter().filter(|c| c.kind == kind).collect()
    }

    /// All categories in declaration order.
    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
