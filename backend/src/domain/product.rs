//! Catalogue products and their stock levels.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ProductId;
use super::money::{AmountError, check_amount};

/// Threshold applied when a product is created without one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

/// Validation errors raised while building or updating a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    EmptyName,
    NonPositivePrice,
    Price(AmountError),
    NegativeStock,
    NegativeThreshold,
    StockOutOfRange,
    ThresholdOutOfRange,
    InsufficientStock { requested: u32, available: u32 },
}

impl fmt::Display for ProductValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "product name must not be empty"),
            Self::NonPositivePrice => write!(f, "price must be greater than zero"),
            Self::Price(err) => write!(f, "price {err}"),
            Self::NegativeStock => write!(f, "stock cannot be negative"),
            Self::NegativeThreshold => write!(f, "low stock threshold cannot be negative"),
            Self::StockOutOfRange => write!(f, "stock is out of range"),
            Self::ThresholdOutOfRange => write!(f, "low stock threshold is out of range"),
            Self::InsufficientStock {
                requested,
                available,
            } => write!(
                f,
                "insufficient stock: requested {requested}, available {available}"
            ),
        }
    }
}

impl std::error::Error for ProductValidationError {}

/// Unvalidated product fields consumed by [`Product::new`].
///
/// Counts are signed so negative input can be reported rather than wrapped.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the descriptive fields. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

/// A product in the catalogue.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `price` is strictly positive with at most two decimal places.
/// - `stock` and `low_stock_threshold` lie in `0..=i32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    category: Option<String>,
    stock: u32,
    low_stock_threshold: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate a draft into a product.
    pub fn new(draft: ProductDraft) -> Result<Self, ProductValidationError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if draft.price <= Decimal::ZERO {
            return Err(ProductValidationError::NonPositivePrice);
        }
        check_amount(draft.price).map_err(ProductValidationError::Price)?;
        let stock = count(
            draft.stock,
            ProductValidationError::NegativeStock,
            ProductValidationError::StockOutOfRange,
        )?;
        let low_stock_threshold = count(
            draft.low_stock_threshold,
            ProductValidationError::NegativeThreshold,
            ProductValidationError::ThresholdOutOfRange,
        )?;
        Ok(Self {
            id: draft.id,
            name: name.to_owned(),
            description: draft.description,
            price: draft.price,
            image_url: non_blank(draft.image_url),
            category: non_blank(draft.category),
            stock,
            low_stock_threshold,
            created_at: draft.created_at,
            updated_at: draft.updated_at,
        })
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stock has fallen to or below the threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether `quantity` units can be taken from stock.
    pub fn can_fulfil(&self, quantity: u32) -> bool {
        quantity <= self.stock
    }

    /// Take `quantity` units out of stock.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use rust_decimal::Decimal;
    /// use storefront::domain::{Product, ProductDraft, ProductId};
    ///
    /// let now = Utc::now();
    /// let product = Product::new(ProductDraft {
    ///     id: ProductId::random(),
    ///     name: "Kettle".into(),
    ///     description: String::new(),
    ///     price: Decimal::new(2999, 2),
    ///     image_url: None,
    ///     category: None,
    ///     stock: 5,
    ///     low_stock_threshold: 5,
    ///     created_at: now,
    ///     updated_at: now,
    /// })
    /// .unwrap();
    /// let reduced = product.reduce_stock(2, now).unwrap();
    /// assert_eq!(reduced.stock(), 3);
    /// ```
    pub fn reduce_stock(
        self,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Result<Self, ProductValidationError> {
        let Some(remaining) = self.stock.checked_sub(quantity) else {
            return Err(ProductValidationError::InsufficientStock {
                requested: quantity,
                available: self.stock,
            });
        };
        Ok(Self {
            stock: remaining,
            updated_at: at,
            ..self
        })
    }

    /// Replace the stock level.
    pub fn update_stock(self, stock: i64, at: DateTime<Utc>) -> Result<Self, ProductValidationError> {
        let stock = count(
            stock,
            ProductValidationError::NegativeStock,
            ProductValidationError::StockOutOfRange,
        )?;
        Ok(Self {
            stock,
            updated_at: at,
            ..self
        })
    }

    /// Apply descriptive changes, returning a revalidated product.
    pub fn update_details(
        self,
        changes: ProductChanges,
        at: DateTime<Utc>,
    ) -> Result<Self, ProductValidationError> {
        let mut draft = self.into_draft();
        if let Some(name) = changes.name {
            draft.name = name;
        }
        if let Some(description) = changes.description {
            draft.description = description;
        }
        if let Some(price) = changes.price {
            draft.price = price;
        }
        if let Some(image_url) = changes.image_url {
            draft.image_url = Some(image_url);
        }
        if let Some(category) = changes.category {
            draft.category = Some(category);
        }
        if let Some(threshold) = changes.low_stock_threshold {
            draft.low_stock_threshold = threshold;
        }
        draft.updated_at = at;
        Self::new(draft)
    }

    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            category: self.category,
            stock: i64::from(self.stock),
            low_stock_threshold: i64::from(self.low_stock_threshold),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Counts are stored as INTEGER columns.
fn count(
    value: i64,
    negative: ProductValidationError,
    too_large: ProductValidationError,
) -> Result<u32, ProductValidationError> {
    if value < 0 {
        return Err(negative);
    }
    i32::try_from(value)
        .map(i32::unsigned_abs)
        .map_err(|_| too_large)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
