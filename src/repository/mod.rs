use std::time::Duration;

use async_trait::async_trait;

use crate::domain::category::CategoryOption;
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryName, ImageUrl};
use crate::domain::upload::UploadFile;
use crate::domain::user::CurrentUser;

pub mod account;
pub mod cache;
pub mod category;
pub mod errors;
pub mod graphql;
pub mod image_host;
pub mod product;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository backed by the admin GraphQL API.
///
/// The underlying `reqwest::Client` is cheap to clone, allowing the
/// repository to be shared between sessions.
#[derive(Clone)]
pub struct GraphQlRepository {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl GraphQlRepository {
    /// Create a repository posting to `endpoint` with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            auth_token,
        })
    }
}

/// Pagination parameters for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of records preceding the requested page.
    pub fn skip(&self) -> usize {
        (self.page.max(1) - 1) * self.per_page
    }
}

/// Query parameters used when listing or searching products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Name search string.
    pub search: Option<String>,
    /// Discount range filter, for example `"10-20"`.
    pub discount: Option<String>,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

/// Read-only operations for category reference data.
#[async_trait]
pub trait CategoryReader: Send + Sync {
    /// List top-level categories.
    async fn parent_categories(&self) -> RepositoryResult<Vec<CategoryOption>>;
    /// List the children of the named parent category.
    async fn child_categories(&self, parent: &CategoryName)
    -> RepositoryResult<Vec<CategoryOption>>;
}

/// Read-only operations for product entities.
#[async_trait]
pub trait ProductReader: Send + Sync {
    /// List products matching the supplied query, with the total count.
    async fn list_products(&self, query: ProductListQuery)
    -> RepositoryResult<(usize, Vec<Product>)>;
}

/// Write operations for product entities.
#[async_trait]
pub trait ProductWriter: Send + Sync {
    /// Create a product and return the stored record.
    async fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
}

/// Operations behind the account menu.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    /// The signed-in user.
    async fn current_user(&self) -> RepositoryResult<CurrentUser>;
    /// End the current session.
    async fn logout(&self) -> RepositoryResult<()>;
}

/// Uploads one file to the external image host.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> RepositoryResult<ImageUrl>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_skips_previous_pages() {
        assert_eq!(Pagination { page: 3, per_page: 20 }.skip(), 40);
        assert_eq!(Pagination { page: 0, per_page: 20 }.skip(), 0);
    }
}
