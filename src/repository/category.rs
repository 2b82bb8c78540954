use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::category::CategoryOption;
use crate::domain::types::CategoryName;
use crate::models::category::CategoryConnection;
use crate::repository::{CategoryReader, GraphQlRepository, RepositoryError, RepositoryResult};

const GET_CATEGORIES: &str = r#"
query categories($parentQuery: String) {
  categories(parentQuery: $parentQuery) {
    nodes {
      id
      name
      parent
    }
  }
}
"#;

#[derive(Deserialize)]
struct CategoriesData {
    categories: CategoryConnection,
}

#[async_trait]
impl CategoryReader for GraphQlRepository {
    async fn parent_categories(&self) -> RepositoryResult<Vec<CategoryOption>> {
        let data: CategoriesData = self
            .execute(GET_CATEGORIES, json!({ "parentQuery": null }))
            .await?;

        data.categories
            .nodes
            .into_iter()
            .map(|node| node.into_option(None).map_err(RepositoryError::from))
            .collect()
    }

    async fn child_categories(
        &self,
        parent: &CategoryName,
    ) -> RepositoryResult<Vec<CategoryOption>> {
        let data: CategoriesData = self
            .execute(GET_CATEGORIES, json!({ "parentQuery": parent.as_str() }))
            .await?;

        data.categories
            .nodes
            .into_iter()
            .map(|node| node.into_option(Some(parent)).map_err(RepositoryError::from))
            .collect()
    }
}
