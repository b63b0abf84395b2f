// 🏷️ Category Entity - read-only lookup consumed by the engine
// Carries the regime default, override policy, and withholding eligibility

use crate::db::{TaxationType, TransactionType};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,

    /// Which side of the ledger the category belongs to
    pub transaction_type: TransactionType,

    /// Regime a new entry starts with
    pub default_taxation_type: TaxationType,

    /// Whether the user may move the regime away from the default
    pub allow_override: bool,

    /// Whether income in this category is subject to 3.3% withholding.
    /// An explicit flag; eligibility is not inferred from the regime.
    pub is_withholding_eligible: bool,
}

impl Category {
    pub fn new(
        name: &str,
        transaction_type: TransactionType,
        default_taxation_type: TaxationType,
        allow_override: bool,
        is_withholding_eligible: bool,
    ) -> Self {
        Category {
            name: name.to_string(),
            transaction_type,
            default_taxation_type,
            allow_override,
            is_withholding_eligible,
        }
    }
}

// ============================================================================
// CATEGORY REGISTRY
// ============================================================================

/// In-process lookup of known categories. Read-only to the engine; category
/// CRUD lives with an external collaborator.
pub struct CategoryRegistry {
    categories: Arc<RwLock<Vec<Category>>>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        CategoryRegistry {
            categories: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Default chart of accounts for a freelancer
    pub fn with_defaults() -> Self {
        let registry = CategoryRegistry::new();

        // Income
        registry.register(Category::new(
            "Freelance Income",
            TransactionType::Income,
            TaxationType::Exempt,
            false,
            true,
        ));
        registry.register(Category::new(
            "Service Income",
            TransactionType::Income,
            TaxationType::Taxable,
            true,
            false,
        ));
        registry.register(Category::new(
            "Export Income",
            TransactionType::Income,
            TaxationType::ZeroRated,
            false,
            false,
        ));
        registry.register(Category::new(
            "Other Income",
            TransactionType::Income,
            TaxationType::Taxable,
            true,
            false,
        ));

        // Expenses (withholding never applies on the expense side)
        registry.register(Category::new(
            "Rent",
            TransactionType::Expense,
            TaxationType::Taxable,
            true,
            false,
        ));
        registry.register(Category::new(
            "Supplies",
            TransactionType::Expense,
            TaxationType::Taxable,
            true,
            false,
        ));
        registry.register(Category::new(
            "Meals",
            TransactionType::Expense,
            TaxationType::Taxable,
            true,
            false,
        ));
        registry.register(Category::new(
            "Transport",
            TransactionType::Expense,
            TaxationType::Taxable,
            true,
            false,
        ));
        registry.register(Category::new(
            "Insurance",
            TransactionType::Expense,
            TaxationType::Exempt,
            false,
            false,
        ));
        registry.register(Category::new(
            "Other Expense",
            TransactionType::Expense,
            TaxationType::Taxable,
            true,
            false,
        ));

        registry
    }

    pub fn register(&self, category: Category) {
        let mut categories = self.categories.write().unwrap();
        categories.push(category);
    }

    /// Exact name match, case-insensitive
    pub fn find_by_name(&self, name: &str) -> Option<Category> {
        let categories = self.categories.read().unwrap();
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower).cloned()
    }

    pub fn all(&self) -> Vec<Category> {
        self.categories.read().unwrap().clone()
    }

    pub fn by_type(&self, transaction_type: TransactionType) -> Vec<Category> {
        self.categories
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.transaction_type == transaction_type)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.categories.read().unwrap().len()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
