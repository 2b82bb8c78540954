//! Helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pushkind_catalog_admin::domain::category::CategoryOption;
use pushkind_catalog_admin::domain::notice::{Notice, NoticeLevel};
use pushkind_catalog_admin::domain::product::{NewProduct, Product};
use pushkind_catalog_admin::domain::types::{CategoryId, CategoryName, ImageUrl, ProductId};
use pushkind_catalog_admin::domain::upload::UploadFile;
use pushkind_catalog_admin::repository::cache::ProductListingCache;
use pushkind_catalog_admin::repository::{
    CategoryReader, ImageUploader, ProductListQuery, ProductReader, ProductWriter,
    RepositoryError, RepositoryResult,
};
use pushkind_catalog_admin::routes::{Navigator, Notifier};
use pushkind_catalog_admin::services::products::SessionContext;

/// In-memory stand-in for the GraphQL backend.
#[derive(Default)]
pub struct Backend {
    pub created: Mutex<Vec<NewProduct>>,
    pub reject_with: Option<String>,
}

impl Backend {
    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn option(id: &str, name: &str, parent: Option<&str>) -> CategoryOption {
        CategoryOption {
            id: CategoryId::new(id).expect("valid category id"),
            name: CategoryName::new(name).expect("valid category name"),
            parent: parent.map(|p| CategoryName::new(p).expect("valid parent name")),
        }
    }
}

#[async_trait]
impl CategoryReader for Backend {
    async fn parent_categories(&self) -> RepositoryResult<Vec<CategoryOption>> {
        Ok(vec![
            Self::option("fruits", "Fruits", None),
            Self::option("dairy", "Dairy", None),
        ])
    }

    async fn child_categories(
        &self,
        parent: &CategoryName,
    ) -> RepositoryResult<Vec<CategoryOption>> {
        let children = match parent.as_str() {
            "Fruits" => vec![
                Self::option("apples", "Apples", Some("Fruits")),
                Self::option("citrus", "Citrus", Some("Fruits")),
            ],
            "Dairy" => vec![Self::option("cheese", "Cheese", Some("Dairy"))],
            _ => Vec::new(),
        };
        Ok(children)
    }
}

#[async_trait]
impl ProductReader for Backend {
    async fn list_products(
        &self,
        _query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<Product>)> {
        Ok((0, Vec::new()))
    }
}

#[async_trait]
impl ProductWriter for Backend {
    async fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        if let Some(message) = &self.reject_with {
            return Err(RepositoryError::Server(message.clone()));
        }
        let mut created = self.created.lock();
        created.push(product.clone());
        Ok(Product {
            id: ProductId::new(format!("prod-{}", created.len())).expect("valid product id"),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            discount: product.discount,
            sale_price: product.sale_price,
            sku: product.sku.clone(),
            unit: product.unit.clone(),
            category: None,
            images: product.images.clone(),
        })
    }
}

/// Image host answering after a fixed per-file delay.
#[derive(Default)]
pub struct Uploader {
    pub delays: Vec<(String, Duration)>,
}

#[async_trait]
impl ImageUploader for Uploader {
    async fn upload(&self, file: &UploadFile) -> RepositoryResult<ImageUrl> {
        if let Some((_, delay)) = self.delays.iter().find(|(name, _)| *name == file.name) {
            tokio::time::sleep(*delay).await;
        }
        ImageUrl::new(format!("https://cdn.example.com/{}", file.name))
            .map_err(|e| RepositoryError::Validation(e.to_string()))
    }
}

#[derive(Default)]
pub struct Screen {
    pub notices: Mutex<Vec<Notice>>,
    pub visited: Mutex<Vec<String>>,
}

impl Screen {
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for Screen {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

impl Navigator for Screen {
    fn navigate(&self, path: &str) {
        self.visited.lock().push(path.to_string());
    }
}

pub fn context(
    backend: Arc<Backend>,
    uploader: Uploader,
    screen: Arc<Screen>,
) -> SessionContext {
    SessionContext {
        categories: backend.clone(),
        products: backend,
        uploader: Arc::new(uploader),
        cache: ProductListingCache::new(),
        notifier: screen.clone(),
        navigator: screen,
        upload_timeout: Duration::from_secs(30),
        navigation_delay: Duration::from_millis(100),
        products_path: "/products".to_string(),
    }
}

pub fn image(name: &str) -> UploadFile {
    UploadFile::new(name, Some("image/png".to_string()), vec![0, 1, 2, 3])
}
