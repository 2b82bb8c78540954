use serde::{Deserialize, Serialize};

use crate::domain::product::{Product as DomainProduct, ProductCategory, ProductImage};
use crate::domain::types::{
    CategoryName, DiscountPercent, ImageUrl, ProductDescription, ProductId, ProductName,
    ProductPrice, ProductSku, ProductUnits, SalePrice, TypeConstraintError,
};

/// Product record as returned by the GraphQL API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: f64,
    pub sale_price: f64,
    pub sku: String,
    pub unit: String,
    #[serde(rename = "Category", default)]
    pub category: Option<CategoryRef>,
    #[serde(rename = "ProductImages", default)]
    pub product_images: Vec<ImageNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub name: String,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageNode {
    pub image: String,
}

/// `products` connection: one page of nodes and the total count.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    pub nodes: Vec<ProductNode>,
    #[serde(default)]
    pub total_count: usize,
}

fn whole_number(value: f64, field: &'static str) -> Result<u32, TypeConstraintError> {
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Ok(value.round() as u32)
    } else {
        Err(TypeConstraintError::InvalidValue(format!(
            "{field} must be a non-negative number"
        )))
    }
}

impl TryFrom<ProductNode> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(node: ProductNode) -> Result<Self, Self::Error> {
        let category = match node.category {
            Some(category) => Some(ProductCategory {
                name: CategoryName::new(category.name)?,
                parent: category
                    .parent
                    .filter(|parent| !parent.trim().is_empty())
                    .map(CategoryName::new)
                    .transpose()?,
            }),
            None => None,
        };

        Ok(Self {
            id: ProductId::new(node.id)?,
            name: ProductName::new(node.name)?,
            description: ProductDescription::new(node.description)?,
            price: ProductPrice::new(whole_number(node.price, "price")?)?,
            discount: DiscountPercent::new(whole_number(node.discount, "discount")?)?,
            sale_price: SalePrice::new(whole_number(node.sale_price, "sale price")?)?,
            sku: ProductSku::new(node.sku)?,
            unit: ProductUnits::new(node.unit)?,
            category,
            images: node
                .product_images
                .into_iter()
                .map(|image| ImageUrl::new(image.image).map(ProductImage::from))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
