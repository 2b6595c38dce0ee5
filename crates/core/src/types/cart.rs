//! Cart line items and the ordered cart collection.
//!
//! [`Cart`] owns the transition rules for line quantities. It is a plain
//! value: the `cart` crate wraps it with shared state and persistence.
//!
//! ## Invariants
//!
//! - No two items share an `id`.
//! - Every item has `quantity >= 1`. Decrementing an item at quantity 1
//!   removes it instead of keeping a zero line.
//! - Insertion order is preserved.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Decrement was called for an ID that is not in the cart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("product {0} is not in the cart")]
pub struct ItemNotFound(pub ProductId);

/// Decoded items break a cart invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCart {
    /// The same product appears on more than one line.
    #[error("duplicate cart line for product {0}")]
    DuplicateId(ProductId),
    /// A line has quantity zero.
    #[error("cart line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
}

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// A product being added to the cart. Quantity is owned by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: Price,
}

impl NewCartItem {
    fn into_line(self) -> CartItem {
        CartItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

/// Totals derived from the cart for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
    /// Sum of all line quantities.
    pub item_count: u32,
    /// Sum of all line totals.
    pub total: Price,
}

/// Ordered collection of cart lines, keyed by product ID.
///
/// Serializes as a JSON array of [`CartItem`]. Deserializing validates the
/// invariants, so a decoded `Cart` is always well formed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from existing lines, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCart`] if an ID repeats or a line has zero quantity.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, InvalidCart> {
        for (i, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(InvalidCart::ZeroQuantity(item.id.clone()));
            }
            if items.iter().take(i).any(|prev| prev.id == item.id) {
                return Err(InvalidCart::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consumes the cart and returns its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id == *id)
    }

    /// Add one unit of a product and return the new line quantity.
    ///
    /// A product already in the cart is incremented; the incoming title,
    /// image and price are ignored in favour of the stored line.
    pub fn add(&mut self, item: NewCartItem) -> u32 {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.items.push(item.into_line());
        1
    }

    /// Increment a line and return its new quantity.
    ///
    /// Returns `None` and leaves the cart untouched if the product is absent.
    pub fn increment(&mut self, id: &ProductId) -> Option<u32> {
        let line = self.items.iter_mut().find(|line| line.id == *id)?;
        line.quantity = line.quantity.saturating_add(1);
        Some(line.quantity)
    }

    /// Decrement a line, removing it when it would drop below one.
    ///
    /// Returns the remaining quantity, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`ItemNotFound`] if the product is absent; the cart is unchanged.
    pub fn decrement(&mut self, id: &ProductId) -> Result<Option<u32>, ItemNotFound> {
        let index = self
            .position(id)
            .ok_or_else(|| ItemNotFound(id.clone()))?;

        let remaining = match self.items.get_mut(index) {
            Some(line) if line.quantity > 1 => {
                line.quantity -= 1;
                Some(line.quantity)
            }
            _ => None,
        };

        if remaining.is_none() {
            self.items.remove(index);
        }
        Ok(remaining)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total item count and price.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self
                .items
                .iter()
                .fold(0_u32, |count, item| count.saturating_add(item.quantity)),
            total: self.items.iter().map(CartItem::line_total).sum(),
        }
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
