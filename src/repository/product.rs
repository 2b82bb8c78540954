use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::product::{NewProduct, Product};
use crate::models::product::{ProductConnection, ProductNode};
use crate::repository::{
    GraphQlRepository, ProductListQuery, ProductReader, ProductWriter, RepositoryResult,
};

const PRODUCT_FIELDS: &str = r#"
    id
    name
    price
    discount
    salePrice
    sku
    unit
    description
    Category {
        name
        parent
    }
    ProductImages {
        image
    }
"#;

const DEFAULT_PAGE_SIZE: usize = 20;

fn get_products_query() -> String {
    format!(
        r#"
query products(
  $orderBy: ProductOrderByInput = {{updatedAt: desc}},
  $first: Int,
  $skip: Int,
  $nameQuery: String,
  $discount: String
) {{
  products(first: $first, skip: $skip, orderBy: $orderBy, nameQuery: $nameQuery, discountRange: $discount) {{
    nodes {{ {PRODUCT_FIELDS} }}
    totalCount
  }}
}}
"#
    )
}

fn create_product_mutation() -> String {
    format!(
        r#"
mutation createProduct(
  $name: String!,
  $description: String!,
  $discount: Int!,
  $price: Int!,
  $salePrice: Int!,
  $sku: String!,
  $unit: String!,
  $categoryId: String!,
  $images: [ProductImageInput!]
) {{
  createProduct(
    name: $name,
    description: $description,
    discount: $discount,
    price: $price,
    salePrice: $salePrice,
    sku: $sku,
    unit: $unit,
    categoryId: $categoryId,
    images: $images
  ) {{ {PRODUCT_FIELDS} }}
}}
"#
    )
}

#[derive(Deserialize)]
struct ProductsData {
    products: ProductConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductData {
    create_product: ProductNode,
}

#[async_trait]
impl ProductReader for GraphQlRepository {
    async fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<Product>)> {
        let (first, skip) = match query.pagination {
            Some(pagination) => (pagination.per_page, pagination.skip()),
            None => (DEFAULT_PAGE_SIZE, 0),
        };
        let variables = json!({
            "first": first,
            "skip": skip,
            "nameQuery": query.search,
            "discount": query.discount,
        });

        let data: ProductsData = self.execute(&get_products_query(), variables).await?;

        let products = data
            .products
            .nodes
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((data.products.total_count, products))
    }
}

#[async_trait]
impl ProductWriter for GraphQlRepository {
    async fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let data: CreateProductData = self.execute(&create_product_mutation(), product).await?;
        Ok(Product::try_from(data.create_product)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_declares_every_creation_variable() {
        let mutation = create_product_mutation();
        for variable in [
            "$name", "$description", "$discount", "$price", "$salePrice", "$sku", "$unit",
            "$categoryId", "$images",
        ] {
            assert!(mutation.contains(variable), "missing {variable}");
        }
    }

    #[test]
    fn listing_query_requests_total_count() {
        let query = get_products_query();
        assert!(query.contains("totalCount"));
        assert!(query.contains("ProductImages"));
    }
}
