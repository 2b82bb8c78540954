use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::product::Product;

/// Cached result of the product listing query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub total_count: usize,
}

/// Client-side cache of the product listing shared between views.
///
/// Cloning yields another handle to the same listing.
#[derive(Debug, Clone, Default)]
pub struct ProductListingCache {
    inner: Arc<RwLock<Option<ProductListing>>>,
}

impl ProductListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the result of a listing query, replacing any previous one.
    pub fn prime(&self, products: Vec<Product>, total_count: usize) {
        *self.inner.write() = Some(ProductListing {
            products,
            total_count,
        });
    }

    /// Appends a created product to the cached listing in place.
    ///
    /// Returns `false` when nothing has been cached yet; the next listing
    /// query will include the product anyway.
    pub fn append(&self, product: Product) -> bool {
        match self.inner.write().as_mut() {
            Some(listing) => {
                listing.products.push(product);
                listing.total_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn is_primed(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn snapshot(&self) -> Option<ProductListing> {
        self.inner.read().clone()
    }

    /// Drops the cached listing.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}
