//! Cart model and reducer.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s plus two derived values,
//! `total` and `item_count`. The derived values are recomputed with a full pass
//! over the items after every mutation and after deserialization; the numbers
//! found in a persisted cart are never trusted.
//!
//! All mutations go through [`Cart::apply`] with a [`CartAction`], so the
//! reducer is the only code that touches the item list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, Price, Product, ProductId};

/// Quantity used when an add does not specify one.
pub const DEFAULT_ADD_QUANTITY: i64 = 1;

/// A product line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// `<product-id>-<unix-millis>` of the first add.
    pub id: CartItemId,
    /// Snapshot of the product taken when it was first added.
    pub product: Product,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Create a new line item for `product`.
    #[must_use]
    pub fn new(product: Product, quantity: i64, added_at: DateTime<Utc>) -> Self {
        Self {
            id: CartItemId::for_product(&product.id, added_at),
            product,
            quantity,
            added_at,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of price times quantity across items.
    pub total: Price,
    /// Sum of quantities across items.
    pub item_count: i64,
}

/// Compute totals with a full pass over `items`.
#[must_use]
pub fn calculate_totals(items: &[CartItem]) -> CartTotals {
    CartTotals {
        total: items.iter().map(CartItem::line_total).sum(),
        item_count: items
            .iter()
            .fold(0_i64, |count, item| count.saturating_add(item.quantity)),
    }
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `quantity` of `product`, merging with an existing line for the same product.
    Add {
        product: Product,
        quantity: i64,
        added_at: DateTime<Utc>,
    },
    /// Drop every line for `product_id`.
    Remove { product_id: ProductId },
    /// Set the quantity of `product_id`, clamped at zero.
    UpdateQuantity { product_id: ProductId, quantity: i64 },
    /// Drop every line.
    Clear,
}

impl CartAction {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::Clear => "clear",
        }
    }
}

/// The shopping cart.
///
/// Serializes as `{ "items": [...], "total": number, "itemCount": number }`.
/// Deserialization only reads `items`; totals are recomputed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCart")]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
    item_count: i64,
}

/// Shape accepted when reading a cart back.
#[derive(Deserialize)]
struct StoredCart {
    items: Vec<CartItem>,
}

impl From<StoredCart> for Cart {
    fn from(stored: StoredCart) -> Self {
        Self::from_items(stored.items)
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from line items, computing totals.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self {
            items,
            total: Price::ZERO,
            item_count: 0,
        };
        cart.recompute();
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of price times quantity.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Sum of quantities.
    #[must_use]
    pub const fn item_count(&self) -> i64 {
        self.item_count
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total: self.total,
            item_count: self.item_count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn item(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    /// Apply a mutation and recompute totals.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add {
                product,
                quantity,
                added_at,
            } => self.add(product, quantity, added_at),
            CartAction::Remove { product_id } => {
                self.items.retain(|item| item.product.id != product_id);
            }
            CartAction::UpdateQuantity {
                product_id,
                quantity,
            } => {
                let quantity = quantity.max(0);
                for item in &mut self.items {
                    if item.product.id == product_id {
                        item.quantity = quantity;
                    }
                }
                self.items.retain(|item| item.quantity > 0);
            }
            CartAction::Clear => self.items.clear(),
        }
        self.recompute();
    }

    // Zero means "not given" and falls back to the default. Negative
    // quantities pass through unvalidated.
    fn add(&mut self, product: Product, quantity: i64, added_at: DateTime<Utc>) {
        let quantity = if quantity == 0 {
            DEFAULT_ADD_QUANTITY
        } else {
            quantity
        };

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem::new(product, quantity, added_at));
        }
    }

    fn recompute(&mut self) {
        let totals = calculate_totals(&self.items);
        self.total = totals.total;
        self.item_count = totals.item_count;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn product(id: &str, cents: i64) -> Product {
        Product::new(id, format!("Product {id}"), Price::from_cents(cents))
    }

    fn add(cart: &mut Cart, id: &str, cents: i64, quantity: i64) {
        cart.apply(CartAction::Add {
            product: product(id, cents),
            quantity,
            added_at: at(1_700_000_000_000),
        });
    }

    #[test]
    fn test_scenario_add_same_product_twice() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 1);
        add(&mut cart, "p1", 1000, 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product.id.as_str(), "p1");
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Price::from_cents(3000));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_merges_into_single_line() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 500, 2);
        add(&mut cart, "p1", 500, 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_add_keeps_first_snapshot_and_id() {
        let mut cart = Cart::new();
        cart.apply(CartAction::Add {
            product: product("p1", 1000),
            quantity: 1,
            added_at: at(1_000),
        });
        cart.apply(CartAction::Add {
            product: product("p1", 9999),
            quantity: 1,
            added_at: at(2_000),
        });

        let item = cart.item(&ProductId::new("p1")).unwrap();
        assert_eq!(item.id.as_str(), "p1-1000");
        assert_eq!(item.added_at, at(1_000));
        assert_eq!(item.product.price, Price::from_cents(1000));
        assert_eq!(cart.total(), Price::from_cents(2000));
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        add(&mut cart, "b", 100, 1);
        add(&mut cart, "a", 100, 1);
        add(&mut cart, "b", 100, 1);

        let ids: Vec<&str> = cart.items().iter().map(|i| i.product.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_add_zero_quantity_falls_back_to_default() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 0);

        assert_eq!(cart.items()[0].quantity, DEFAULT_ADD_QUANTITY);
        assert_eq!(cart.item_count(), 1);
    }

    /// Ambiguous behaviour: a negative add is accepted as-is and can leave a
    /// line with a non-positive quantity. Kept until product decides whether
    /// "decrement via add" is a feature.
    #[test]
    fn test_add_negative_quantity_is_accepted_unvalidated() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 2);
        add(&mut cart, "p1", 1000, -5);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, -3);
        assert_eq!(cart.item_count(), -3);
        assert_eq!(cart.total(), Price::from_cents(-3000));
    }

    #[test]
    fn test_remove_drops_product() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 1);
        add(&mut cart, "p2", 250, 4);

        cart.apply(CartAction::Remove {
            product_id: ProductId::new("p1"),
        });

        assert!(cart.item(&ProductId::new("p1")).is_none());
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), Price::from_cents(1000));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 2);
        let before = cart.clone();

        cart.apply(CartAction::Remove {
            product_id: ProductId::new("missing"),
        });

        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 2);

        cart.apply(CartAction::UpdateQuantity {
            product_id: ProductId::new("p1"),
            quantity: 7,
        });

        assert_eq!(cart.items()[0].quantity, 7);
        assert_eq!(cart.total(), Price::from_cents(7000));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 2);
        add(&mut cart, "p2", 1000, 1);

        cart.apply(CartAction::UpdateQuantity {
            product_id: ProductId::new("p1"),
            quantity: 0,
        });

        assert!(cart.item(&ProductId::new("p1")).is_none());
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_update_quantity_negative_clamps_and_removes() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 2);

        cart.apply(CartAction::UpdateQuantity {
            product_id: ProductId::new("p1"),
            quantity: -4,
        });

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_update_quantity_sweeps_non_positive_lines() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, -1);
        add(&mut cart, "p2", 1000, 1);

        cart.apply(CartAction::UpdateQuantity {
            product_id: ProductId::new("p2"),
            quantity: 2,
        });

        assert!(cart.item(&ProductId::new("p1")).is_none());
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cart = Cart::new();
        add(&mut cart, "p1", 1000, 2);
        cart.apply(CartAction::Clear);

        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_serialized_shape() {
        let mut cart = Cart::new();
        cart.apply(CartAction::Add {
            product: product("p1", 1000),
            quantity: 3,
            added_at: at(1_700_000_000_000),
        });

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(value["itemCount"], 3);
        assert_eq!(value["total"], 30.0);
        assert_eq!(value["items"][0]["id"], "p1-1700000000000");
        assert_eq!(value["items"][0]["quantity"], 3);
        assert_eq!(value["items"][0]["product"]["price"], 10.0);
        assert!(value["items"][0]["addedAt"].is_string());
    }

    #[test]
    fn test_deserialize_recomputes_totals() {
        let json = r#"{
            "items": [{
                "id": "p1-1",
                "product": {"id": "p1", "title": "Lamp", "price": 10},
                "quantity": 3,
                "addedAt": "2024-01-01T00:00:00Z"
            }],
            "total": 999,
            "itemCount": 42
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(3000));
    }

    #[test]
    fn test_deserialize_rejects_non_list_items() {
        assert!(serde_json::from_str::<Cart>(r#"{"items":"not-a-list"}"#).is_err());
        assert!(serde_json::from_str::<Cart>(r#"{"total":0}"#).is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize, i64),
        Remove(usize),
        Update(usize, i64),
        Clear,
    }

    const CATALOG: [(&str, i64); 4] = [("p1", 1000), ("p2", 1999), ("p3", 5), ("p4", 123_456)];

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0..CATALOG.len(), -3_i64..10).prop_map(|(p, q)| Op::Add(p, q)),
            2 => (0..CATALOG.len()).prop_map(Op::Remove),
            2 => (0..CATALOG.len(), -3_i64..10).prop_map(|(p, q)| Op::Update(p, q)),
            1 => Just(Op::Clear),
        ]
    }

    fn to_action(op: Op, step: i64) -> CartAction {
        match op {
            Op::Add(p, quantity) => {
                let (id, cents) = CATALOG[p];
                CartAction::Add {
                    product: product(id, cents),
                    quantity,
                    added_at: at(step),
                }
            }
            Op::Remove(p) => CartAction::Remove {
                product_id: ProductId::new(CATALOG[p].0),
            },
            Op::Update(p, quantity) => CartAction::UpdateQuantity {
                product_id: ProductId::new(CATALOG[p].0),
                quantity,
            },
            Op::Clear => CartAction::Clear,
        }
    }

    proptest! {
        /// Totals always match an independent recomputation.
        #[test]
        fn prop_totals_match_items(ops in proptest::collection::vec(arb_op(), 0..40)) {
            let mut cart = Cart::new();
            for (step, op) in ops.into_iter().enumerate() {
                cart.apply(to_action(op, i64::try_from(step).unwrap()));

                let mut expected_total = rust_decimal::Decimal::ZERO;
                let mut expected_count = 0_i64;
                for item in cart.items() {
                    expected_total += item.product.price.amount()
                        * rust_decimal::Decimal::from(item.quantity);
                    expected_count += item.quantity;
                }
                prop_assert_eq!(cart.total().amount(), expected_total);
                prop_assert_eq!(cart.item_count(), expected_count);
            }
        }

        /// A product never appears on more than one line.
        #[test]
        fn prop_one_line_per_product(ops in proptest::collection::vec(arb_op(), 0..40)) {
            let mut cart = Cart::new();
            for (step, op) in ops.into_iter().enumerate() {
                cart.apply(to_action(op, i64::try_from(step).unwrap()));
            }
            let mut ids: Vec<&str> = cart.items().iter().map(|i| i.product.id.as_str()).collect();
            let len = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), len);
        }
    }
}
