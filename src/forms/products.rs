use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::pricing::recompute_sale_price;
use crate::domain::product::{NewProduct, ProductImage};
use crate::domain::types::{
    CategoryId, DiscountPercent, ProductDescription, ProductName, ProductPrice, ProductSku,
    ProductUnits, SalePrice, TypeConstraintError,
};

/// Maximum number of digits accepted in the price input.
pub const PRICE_MAX_DIGITS: usize = 6;
/// Maximum number of digits accepted in the discount input.
pub const DISCOUNT_MAX_DIGITS: usize = 3;

/// Fields of the add product form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormField {
    Name,
    Description,
    Price,
    Discount,
    SalePrice,
    Sku,
    Unit,
    ParentCategory,
    ChildCategory,
}

/// Fields the sale price is derived from.
pub const SALE_PRICE_SOURCES: [FormField; 2] = [FormField::Price, FormField::Discount];

impl FormField {
    pub const ALL: [FormField; 9] = [
        Self::Name,
        Self::Description,
        Self::Price,
        Self::Discount,
        Self::SalePrice,
        Self::Sku,
        Self::Unit,
        Self::ParentCategory,
        Self::ChildCategory,
    ];

    /// Key used for this field in [`ValidationErrors`].
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Discount => "discount",
            Self::SalePrice => "sale_price",
            Self::Sku => "sku",
            Self::Unit => "unit",
            Self::ParentCategory => "parent_category",
            Self::ChildCategory => "child_category",
        }
    }

    /// Whether committing this field requires recomputing the sale price.
    pub fn affects_sale_price(self) -> bool {
        SALE_PRICE_SOURCES.contains(&self)
    }

    const fn max_digits(self) -> Option<usize> {
        match self {
            Self::Price => Some(PRICE_MAX_DIGITS),
            Self::Discount => Some(DISCOUNT_MAX_DIGITS),
            _ => None,
        }
    }
}

impl Display for FormField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl TryFrom<&str> for FormField {
    type Error = FormError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == value.trim())
            .ok_or_else(|| FormError::UnknownField(value.to_string()))
    }
}

/// Keeps ASCII digits only, truncates to `max_digits` and parses the rest.
///
/// An input without digits yields zero.
pub fn sanitize_numeric_input(raw: &str, max_digits: usize) -> u32 {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(max_digits)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

fn validate_discount(value: u32) -> Result<(), ValidationError> {
    let message = match value {
        0 => "Please enter discount",
        1..=100 => return Ok(()),
        _ => "Please enter valid discount in percent",
    };
    let mut error = ValidationError::new("discount");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}

/// Raw values of the add product form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AddProductForm {
    #[validate(length(min = 1, message = "Please enter name"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please enter description"))]
    pub description: String,
    #[validate(range(min = 1, message = "Please enter price"))]
    pub price: u32,
    #[validate(custom(function = "validate_discount"))]
    pub discount: u32,
    pub sale_price: u32,
    #[validate(length(min = 1, message = "Please enter sku"))]
    pub sku: String,
    #[validate(length(min = 1, message = "Please enter unit"))]
    pub unit: String,
    /// Name of the selected parent category.
    #[validate(length(min = 1, message = "Please select parent category"))]
    pub parent_category: String,
    /// Identifier of the selected child category.
    #[validate(length(min = 1, message = "Please select child category"))]
    pub child_category: String,
}

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidation {
    pub valid: bool,
    pub message: String,
}

impl FieldValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

impl AddProductForm {
    /// Copy with surrounding whitespace removed from text fields.
    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            sku: self.sku.trim().to_string(),
            unit: self.unit.trim().to_string(),
            parent_category: self.parent_category.trim().to_string(),
            child_category: self.child_category.trim().to_string(),
            ..self.clone()
        }
    }

    /// Runs every rule against the trimmed values.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        self.trimmed().validate()
    }

    /// Whether every rule passes.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Runs the rules for one field.
    pub fn validate_field(&self, field: FormField) -> FieldValidation {
        let Err(errors) = self.check() else {
            return FieldValidation::ok();
        };
        match first_message(&errors, field) {
            Some(message) => FieldValidation::failed(message),
            None => FieldValidation::ok(),
        }
    }

    /// Error messages keyed by field, in field order.
    pub fn errors(&self) -> Vec<(FormField, String)> {
        let Err(errors) = self.check() else {
            return Vec::new();
        };
        FormField::ALL
            .into_iter()
            .filter_map(|field| first_message(&errors, field).map(|m| (field, m)))
            .collect()
    }

    /// Current value of a field rendered as text.
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Name => self.name.clone(),
            FormField::Description => self.description.clone(),
            FormField::Price => self.price.to_string(),
            FormField::Discount => self.discount.to_string(),
            FormField::SalePrice => self.sale_price.to_string(),
            FormField::Sku => self.sku.clone(),
            FormField::Unit => self.unit.clone(),
            FormField::ParentCategory => self.parent_category.clone(),
            FormField::ChildCategory => self.child_category.clone(),
        }
    }

    /// Recomputes the derived sale price from price and discount.
    pub fn recompute_sale_price(&mut self) {
        self.sale_price = derived_sale_price(self.price, self.discount).get();
    }
}

fn derived_sale_price(price: u32, discount: u32) -> SalePrice {
    let price = ProductPrice::new(price.min(ProductPrice::MAX)).unwrap_or_default();
    let discount = DiscountPercent::new(discount.min(DiscountPercent::MAX)).unwrap_or_default();
    recompute_sale_price(price, discount)
}

fn first_message(errors: &ValidationErrors, field: FormField) -> Option<String> {
    let field_errors = errors.field_errors();
    let error = field_errors.get(field.key())?.first()?;
    Some(
        error
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| error.code.to_string()),
    )
}

/// Errors raised when the form is driven incorrectly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("field {0} is derived and cannot be edited")]
    ReadOnlyField(FormField),
    #[error("field {0} is set by selecting a category")]
    SelectionField(FormField),
    #[error("unknown form field: {0}")]
    UnknownField(String),
}

/// Live state of the add product form: values plus touched fields.
///
/// Errors are advisory: they never block edits and are only displayed for a
/// field once it has been blurred or a submit was attempted.
#[derive(Debug, Clone, Default)]
pub struct ProductFormState {
    values: AddProductForm,
    touched: BTreeSet<FormField>,
}

impl ProductFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &AddProductForm {
        &self.values
    }

    /// Applies a keystroke-level change to a text or numeric field.
    ///
    /// Numeric inputs are sanitized to their digit budget before parsing.
    pub fn change(&mut self, field: FormField, raw: &str) -> Result<FieldValidation, FormError> {
        match field {
            FormField::SalePrice => return Err(FormError::ReadOnlyField(field)),
            FormField::ParentCategory | FormField::ChildCategory => {
                return Err(FormError::SelectionField(field));
            }
            FormField::Name => self.values.name = raw.to_string(),
            FormField::Description => self.values.description = raw.to_string(),
            FormField::Sku => self.values.sku = raw.to_string(),
            FormField::Unit => self.values.unit = raw.to_string(),
            FormField::Price | FormField::Discount => {
                let max_digits = field.max_digits().unwrap_or(PRICE_MAX_DIGITS);
                let value = sanitize_numeric_input(raw, max_digits);
                if field == FormField::Price {
                    self.values.price = value;
                } else {
                    self.values.discount = value;
                }
            }
        }
        Ok(self.values.validate_field(field))
    }

    /// Marks a field as touched and recomputes derived values it feeds.
    pub fn blur(&mut self, field: FormField) -> FieldValidation {
        self.touched.insert(field);
        if field.affects_sale_price() {
            self.values.recompute_sale_price();
        }
        self.values.validate_field(field)
    }

    pub(crate) fn set_parent_category(&mut self, parent: &str) {
        self.values.parent_category = parent.to_string();
        self.values.child_category.clear();
    }

    pub(crate) fn set_child_category(&mut self, child: &str) {
        self.values.child_category = child.to_string();
    }

    /// Marks every field as touched, as a submit attempt does.
    pub fn touch_all(&mut self) {
        self.touched.extend(FormField::ALL);
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    pub fn is_valid(&self) -> bool {
        self.values.is_valid()
    }

    /// Message to display next to `field`, if any.
    pub fn visible_error(&self, field: FormField) -> Option<String> {
        if !self.is_touched(field) {
            return None;
        }
        let validation = self.values.validate_field(field);
        (!validation.valid).then_some(validation.message)
    }

    /// Clears values and touched fields.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Typed, validated contents of the add product form.
#[derive(Debug, Clone, PartialEq)]
pub struct AddProductFormPayload {
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub discount: DiscountPercent,
    pub sale_price: SalePrice,
    pub sku: ProductSku,
    pub unit: ProductUnits,
    pub category_id: CategoryId,
}

impl AddProductFormPayload {
    pub fn into_new_product(self, images: Vec<ProductImage>) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            discount: self.discount,
            price: self.price,
            sale_price: self.sale_price,
            sku: self.sku,
            unit: self.unit,
            category_id: self.category_id,
            images,
        }
    }
}

#[derive(Debug, Error)]
pub enum AddProductFormError {
    #[error("Add product form validation failed: {0}")]
    Validation(String),
    #[error("Add product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddProductForm> for AddProductFormPayload {
    type Error = AddProductFormError;

    fn try_from(value: AddProductForm) -> Result<Self, Self::Error> {
        value.check()?;
        let price = ProductPrice::new(value.price)?;
        let discount = DiscountPercent::new(value.discount)?;

        Ok(Self {
            name: ProductName::new(value.name)?,
            description: ProductDescription::new(value.description)?,
            price,
            discount,
            // Derived again so a value typed without a blur never goes out stale.
            sale_price: recompute_sale_price(price, discount),
            sku: ProductSku::new(value.sku)?,
            unit: ProductUnits::new(value.unit)?,
            category_id: CategoryId::new(value.child_category)?,
        })
    }
}
