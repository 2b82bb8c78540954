use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName};

/// Selectable category reference data.
///
/// Top-level categories have no parent; child categories are fetched per
/// parent and carry the parent's name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: CategoryName,
    pub parent: Option<CategoryName>,
}

impl CategoryOption {
    /// Whether this option is a child of `parent`.
    pub fn belongs_to(&self, parent: &CategoryName) -> bool {
        self.parent.as_ref() == Some(parent)
    }
}
