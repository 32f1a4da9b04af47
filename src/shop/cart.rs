use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{models::Product, shop::ClientResult};

pub const DEFAULT_CART_PATH: &str = "cart.json";

/// Flat sales tax applied to the cart subtotal (10%).
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// A product snapshot plus the quantity the shopper wants.
///
/// Serializes as the product's own fields with `quantity` added, which is
/// also the line shape the order endpoint reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn id(&self) -> i32 {
        self.product.id
    }

    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("Only {available} more of {name} can be added to your cart")]
    NotEnough { name: String, available: u32 },
}

/// Ordered cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: i32) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == product_id)
    }

    /// Add `quantity` (default and minimum 1) of `product`. A product already
    /// in the cart keeps its line and has its quantity increased.
    pub fn add(&mut self, product: Product, quantity: Option<u32>) {
        let quantity = quantity.filter(|q| *q > 0).unwrap_or(1);
        match self.items.iter_mut().find(|item| item.id() == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { product, quantity }),
        }
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: i32) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != product_id);
        self.items.len() != before
    }

    /// Set a line's quantity, bounded by the product's stock and never below 1.
    /// Returns the stored quantity, or `None` when the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: i32, quantity: u32) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.id() == product_id)?;
        item.quantity = quantity.min(stock_limit(item.product.stock)).max(1);
        Some(item.quantity)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units, as shown on the header badge.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }

    /// Check that `requested` more units of `product` (zero meaning one) fit
    /// in its stock alongside what the cart already holds.
    pub fn check_stock(&self, product: &Product, requested: u32) -> Result<u32, StockError> {
        let stock = stock_limit(product.stock);
        if stock == 0 {
            return Err(StockError::OutOfStock(product.name.clone()));
        }
        let in_cart = self.get(product.id).map_or(0, |item| item.quantity);
        let available = stock.saturating_sub(in_cart);
        let requested = requested.max(1);
        if requested > available {
            return Err(StockError::NotEnough {
                name: product.name.clone(),
                available,
            });
        }
        Ok(requested)
    }

    pub fn totals(&self) -> CartTotals {
        let subtotal: Decimal = self.items.iter().map(CartItem::line_total).sum();
        let tax = (subtotal * TAX_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        CartTotals {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

fn stock_limit(stock: i32) -> u32 {
    u32::try_from(stock).unwrap_or(0)
}

/// A cart mirrored to a JSON file after every change.
#[derive(Debug)]
pub struct CartStore {
    path: PathBuf,
    cart: Cart,
}

impl CartStore {
    /// Load the cart at `path`. A missing file is an empty cart; an unreadable
    /// one is discarded with a warning.
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        let cart = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "discarding corrupt cart file");
                Cart::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Cart::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, cart })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Apply `change` to the cart and persist the result.
    pub fn update<R>(&mut self, change: impl FnOnce(&mut Cart) -> R) -> ClientResult<R> {
        let result = change(&mut self.cart);
        self.save()?;
        Ok(result)
    }

    pub fn clear(&mut self) -> ClientResult<()> {
        self.update(Cart::clear)
    }

    fn save(&self) -> ClientResult<()> {
        let json = serde_json::to_vec_pretty(&self.cart)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
