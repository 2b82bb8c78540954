//! Sale price derivation.
//!
//! The sale price is never entered directly: it is recomputed from the price
//! and the discount whenever either of them is committed.

use crate::domain::types::{DiscountPercent, ProductPrice, SalePrice};

/// Returns `floor(price - price * discount / 100)`.
///
/// Integer arithmetic gives the same result as the floating point formula for
/// every whole price and a discount in `0..=100`: the subtracted amount is
/// rounded up, so the remainder is rounded down.
pub fn recompute_sale_price(price: ProductPrice, discount: DiscountPercent) -> SalePrice {
    let price = u64::from(price.get());
    let discount = u64::from(discount.get().min(100));
    let discounted = (price * (100 - discount)) / 100;
    // `discounted <= price <= ProductPrice::MAX == SalePrice::MAX`
    SalePrice::new(discounted as u32).unwrap_or_default()
}
