use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, CategoryName, DiscountPercent, ImageUrl, ProductDescription, ProductId,
    ProductName, ProductPrice, ProductSku, ProductUnits, SalePrice,
};

/// One remote image attached to a product, serialized as `{ "image": url }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductImage {
    pub image: ImageUrl,
}

impl From<ImageUrl> for ProductImage {
    fn from(image: ImageUrl) -> Self {
        Self { image }
    }
}

/// Category reference embedded in a product listing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductCategory {
    pub name: CategoryName,
    pub parent: Option<CategoryName>,
}

/// A product as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub discount: DiscountPercent,
    pub sale_price: SalePrice,
    pub sku: ProductSku,
    pub unit: ProductUnits,
    pub category: Option<ProductCategory>,
    pub images: Vec<ProductImage>,
}

/// Information required to create a new [`Product`].
///
/// Field names follow the creation endpoint's camelCase variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: ProductName,
    pub description: ProductDescription,
    pub discount: DiscountPercent,
    pub price: ProductPrice,
    pub sale_price: SalePrice,
    pub sku: ProductSku,
    pub unit: ProductUnits,
    pub category_id: CategoryId,
    pub images: Vec<ProductImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_serializes_with_endpoint_variable_names() {
        let product = NewProduct {
            name: ProductName::new("Apple").unwrap(),
            description: ProductDescription::new("Green apple").unwrap(),
            discount: DiscountPercent::new(20).unwrap(),
            price: ProductPrice::new(100).unwrap(),
            sale_price: SalePrice::new(80).unwrap(),
            sku: ProductSku::new("APL-1").unwrap(),
            unit: ProductUnits::new("kg").unwrap(),
            category_id: CategoryId::new("cat-7").unwrap(),
            images: vec![ProductImage::from(
                ImageUrl::new("https://img.example.com/a.jpg").unwrap(),
            )],
        };

        let value = serde_json::to_value(&product).unwrap();

        assert_eq!(value["salePrice"], 80);
        assert_eq!(value["categoryId"], "cat-7");
        assert_eq!(value["images"][0]["image"], "https://img.example.com/a.jpg");
        assert!(value.get("sale_price").is_none());
    }
}
