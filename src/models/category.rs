use serde::{Deserialize, Serialize};

use crate::domain::category::CategoryOption;
use crate::domain::types::{CategoryId, CategoryName, TypeConstraintError};

/// Category record as returned by the GraphQL API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

/// `categories` connection.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConnection {
    pub nodes: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Converts the node, attributing it to `parent` when the API omits it.
    pub fn into_option(
        self,
        parent: Option<&CategoryName>,
    ) -> Result<CategoryOption, TypeConstraintError> {
        let parent = match self.parent.filter(|p| !p.trim().is_empty()) {
            Some(parent) => Some(CategoryName::new(parent)?),
            None => parent.cloned(),
        };
        Ok(CategoryOption {
            id: CategoryId::new(self.id)?,
            name: CategoryName::new(self.name)?,
            parent,
        })
    }
}

impl TryFrom<CategoryNode> for CategoryOption {
    type Error = TypeConstraintError;

    fn try_from(node: CategoryNode) -> Result<Self, Self::Error> {
        node.into_option(None)
    }
}
