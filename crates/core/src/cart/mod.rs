//! Cart state container, reducer, and price derivation.
//!
//! The cart is client-held state: an ordered list of line items plus a
//! shipping address and payment method choice, with a derived price
//! breakdown that is recomputed on every mutation. The state is modeled as
//! an explicit value passed through a pure reducer (`(State, Action) ->
//! State`) rather than ambient mutable state, and every mutation writes the
//! resulting snapshot to a durable [`slot`](crate::cart::slot) so a later
//! process start restores the identical cart without recomputation.
//!
//! # Example
//!
//! ```
//! use proshop_core::ProductId;
//! use proshop_core::cart::{Cart, CartAction, CartItem, MemoryCartSlot};
//! use rust_decimal::Decimal;
//!
//! let mut cart = Cart::restore(MemoryCartSlot::default()).unwrap();
//! cart.dispatch(CartAction::AddItem(CartItem {
//!     id: ProductId::new(1),
//!     name: "Airpods".into(),
//!     image: "/images/airpods.jpg".into(),
//!     price: Decimal::new(8999, 2),
//!     count_in_stock: 10,
//!     qty: 1,
//! }))
//! .unwrap();
//!
//! assert_eq!(cart.state().total_price.to_string(), "113.49");
//! ```

mod pricing;
mod slot;

pub use pricing::{PriceBreakdown, price_breakdown, round2};
pub use slot::{CART_KEY, CartSlot, CartSlotError, FileCartSlot, MemoryCartSlot};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A cart line item: a product snapshot plus the desired quantity.
///
/// The product fields are carried along for display; pricing only reads
/// `price` and `qty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identity; "add to cart" upserts by this id.
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub count_in_stock: i64,
    pub qty: u32,
}

/// Shipping address chosen during checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// The full client-held cart state, including the derived price breakdown.
///
/// The derived fields are never hand-edited; [`reduce`] recomputes them on
/// every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartState {
    pub cart_items: Vec<CartItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: String,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            cart_items: Vec::new(),
            shipping_address: None,
            payment_method: "PayPal".to_owned(),
            items_price: Decimal::ZERO,
            shipping_price: Decimal::ZERO,
            tax_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
        }
    }
}

impl CartState {
    /// Recompute the derived price fields from the current line items.
    fn recompute(&mut self) {
        let breakdown = price_breakdown(&self.cart_items);
        self.items_price = breakdown.items_price;
        self.shipping_price = breakdown.shipping_price;
        self.tax_price = breakdown.tax_price;
        self.total_price = breakdown.total_price;
    }
}

/// Enumerated cart mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Upsert a line item by identity. An item with the same id replaces
    /// the existing entry in place (position preserved); it does not merge
    /// quantities.
    AddItem(CartItem),
    /// Remove the line item with the given id, if present.
    RemoveItem(ProductId),
    /// Replace the shipping address wholesale.
    SetShippingAddress(ShippingAddress),
    /// Select the payment method.
    SetPaymentMethod(String),
}

/// Pure cart reducer.
///
/// Applies the action and recomputes the derived price fields. Every action
/// takes the same recompute path, including the ones that cannot change the
/// totals, so the snapshot written afterwards is always self-consistent.
#[must_use]
pub fn reduce(mut state: CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem(item) => {
            if let Some(existing) = state.cart_items.iter_mut().find(|i| i.id == item.id) {
                *existing = item;
            } else {
                state.cart_items.push(item);
            }
        }
        CartAction::RemoveItem(id) => {
            state.cart_items.retain(|i| i.id != id);
        }
        CartAction::SetShippingAddress(address) => {
            state.shipping_address = Some(address);
        }
        CartAction::SetPaymentMethod(method) => {
            state.payment_method = method;
        }
    }

    state.recompute();
    state
}

/// A cart coupled to its persistence slot.
///
/// Wraps [`reduce`] so that every dispatched action synchronously writes
/// the updated snapshot; the persisted state is never stale relative to the
/// in-memory state.
#[derive(Debug)]
pub struct Cart<S: CartSlot> {
    state: CartState,
    slot: S,
}

impl<S: CartSlot> Cart<S> {
    /// Restore a cart from its slot, or start empty if no snapshot exists.
    ///
    /// The restored state is used as-is; derived fields are not recomputed
    /// until the next mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or the snapshot cannot
    /// be deserialized.
    pub fn restore(slot: S) -> Result<Self, CartSlotError> {
        let state = slot.load()?.unwrap_or_default();
        Ok(Self { state, slot })
    }

    /// Current cart state.
    #[must_use]
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Apply an action and persist the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written. The in-memory
    /// state is updated regardless, mirroring a failed browser-storage
    /// write.
    pub fn dispatch(&mut self, action: CartAction) -> Result<&CartState, CartSlotError> {
        self.state = reduce(std::mem::take(&mut self.state), action);
        self.slot.save(&self.state)?;
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, price: &str, qty: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            image: format!("/images/{id}.jpg"),
            price: price.parse().unwrap(),
            count_in_stock: 10,
            qty,
        }
    }

    #[test]
    fn add_item_appends_and_recomputes() {
        let state = reduce(CartState::default(), CartAction::AddItem(item(1, "89.99", 1)));

        assert_eq!(state.cart_items.len(), 1);
        assert_eq!(state.items_price.to_string(), "89.99");
        assert_eq!(state.shipping_price.to_string(), "10.00");
        assert_eq!(state.tax_price.to_string(), "13.50");
        assert_eq!(state.total_price.to_string(), "113.49");
    }

    #[test]
    fn add_existing_item_replaces_in_place() {
        let mut state = CartState::default();
        state = reduce(state, CartAction::AddItem(item(1, "10.00", 1)));
        state = reduce(state, CartAction::AddItem(item(2, "20.00", 1)));
        state = reduce(state, CartAction::AddItem(item(1, "10.00", 5)));

        // Replaced, not merged or re-appended: same length, same position.
        assert_eq!(state.cart_items.len(), 2);
        assert_eq!(state.cart_items[0].id, ProductId::new(1));
        assert_eq!(state.cart_items[0].qty, 5);
        assert_eq!(state.cart_items[1].id, ProductId::new(2));
        assert_eq!(state.items_price.to_string(), "70.00");
    }

    #[test]
    fn remove_item_filters_by_identity() {
        let mut state = CartState::default();
        state = reduce(state, CartAction::AddItem(item(1, "10.00", 1)));
        state = reduce(state, CartAction::AddItem(item(2, "20.00", 1)));
        state = reduce(state, CartAction::RemoveItem(ProductId::new(1)));

        assert_eq!(state.cart_items.len(), 1);
        assert_eq!(state.cart_items[0].id, ProductId::new(2));
        assert_eq!(state.items_price.to_string(), "20.00");
    }

    #[test]
    fn removing_missing_item_is_a_no_op() {
        let mut state = reduce(CartState::default(), CartAction::AddItem(item(1, "10.00", 1)));
        state = reduce(state, CartAction::RemoveItem(ProductId::new(99)));
        assert_eq!(state.cart_items.len(), 1);
    }

    #[test]
    fn address_and_payment_actions_take_the_recompute_path() {
        let mut state = reduce(CartState::default(), CartAction::AddItem(item(1, "50.00", 2)));
        state = reduce(
            state,
            CartAction::SetShippingAddress(ShippingAddress {
                address: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
                country: "USA".into(),
            }),
        );
        state = reduce(state, CartAction::SetPaymentMethod("Stripe".into()));

        assert_eq!(state.payment_method, "Stripe");
        assert!(state.shipping_address.is_some());
        // Price fields unchanged by address/payment, still consistent.
        assert_eq!(state.items_price.to_string(), "100.00");
        assert_eq!(state.shipping_price.to_string(), "10.00");
    }

    #[test]
    fn dispatch_persists_every_mutation() {
        let slot = MemoryCartSlot::default();
        let mut cart = Cart::restore(slot.clone()).unwrap();
        cart.dispatch(CartAction::AddItem(item(1, "89.99", 1))).unwrap();

        let persisted = slot.load().unwrap().expect("snapshot written");
        assert_eq!(&persisted, cart.state());
        assert_eq!(persisted.total_price.to_string(), "113.49");
    }

    #[test]
    fn restore_reproduces_the_identical_cart() {
        let slot = MemoryCartSlot::default();
        let mut cart = Cart::restore(slot.clone()).unwrap();
        cart.dispatch(CartAction::AddItem(item(1, "89.99", 1))).unwrap();
        cart.dispatch(CartAction::AddItem(item(2, "599.99", 2))).unwrap();
        let expected = cart.state().clone();

        let restored = Cart::restore(slot).unwrap();
        assert_eq!(restored.state(), &expected);
    }

    #[test]
    fn restore_starts_empty_without_a_snapshot() {
        let cart = Cart::restore(MemoryCartSlot::default()).unwrap();
        assert!(cart.state().cart_items.is_empty());
        assert_eq!(cart.state().payment_method, "PayPal");
    }

    #[test]
    fn snapshot_json_uses_the_storage_field_names() {
        let state = reduce(CartState::default(), CartAction::AddItem(item(1, "89.99", 1)));
        let json = serde_json::to_value(&state).unwrap();

        assert!(json.get("cartItems").is_some());
        assert_eq!(json["itemsPrice"], "89.99");
        assert_eq!(json["shippingPrice"], "10.00");
        assert_eq!(json["taxPrice"], "13.50");
        assert_eq!(json["totalPrice"], "113.49");
    }
}
