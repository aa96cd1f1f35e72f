//! Cart commands.
//!
//! Each invocation opens the configured cart store, hydrates it, applies one
//! operation and exits. Writes go through the same store the server uses, so
//! the durable copy stays in the shape the server expects.

use storefront::config::StorefrontConfig;
use storefront::services::{CartStore, Catalog};
use storefront::state::{SharedCartStore, open_cart_store};
use storefront::storage::KeyValueStore;
use storefront_core::cart::DEFAULT_ADD_QUANTITY;
use storefront_core::{Cart, ProductId};
use tracing::info;

use super::CommandError;

/// Open and hydrate the configured cart store.
///
/// # Errors
///
/// Returns `CommandError::Storage` if the configured key is invalid.
pub fn open(config: &StorefrontConfig) -> Result<SharedCartStore, CommandError> {
    let mut store = open_cart_store(&config.cart)?;
    let outcome = store.hydrate();
    info!(
        storage_dir = %config.cart.storage_dir.display(),
        key = store.key(),
        ?outcome,
        "Cart loaded"
    );
    Ok(store)
}

/// Log every line and the totals.
pub fn show<S: KeyValueStore>(store: &CartStore<S>) {
    let Some(cart) = store.state().ready() else {
        info!("Cart is still loading");
        return;
    };
    summarize(cart);
}

/// Add a catalog product.
///
/// # Errors
///
/// Returns `CommandError::UnknownProduct` if the id is not in the catalog.
pub fn add<S: KeyValueStore>(
    store: &mut CartStore<S>,
    catalog: &Catalog,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<(), CommandError> {
    let product = catalog
        .get(&ProductId::new(product_id))
        .cloned()
        .ok_or_else(|| CommandError::UnknownProduct(product_id.to_string()))?;

    let cart = store.add(product, quantity.unwrap_or(DEFAULT_ADD_QUANTITY));
    summarize(cart);
    Ok(())
}

pub fn remove<S: KeyValueStore>(store: &mut CartStore<S>, product_id: &str) {
    let product_id = ProductId::new(product_id);
    let present = store
        .state()
        .ready()
        .is_some_and(|cart| cart.item(&product_id).is_some());
    if !present {
        info!(product_id = %product_id, "Product not in cart; nothing removed");
    }
    let cart = store.remove(&product_id);
    summarize(cart);
}

pub fn update<S: KeyValueStore>(store: &mut CartStore<S>, product_id: &str, quantity: i64) {
    let cart = store.update_quantity(&ProductId::new(product_id), quantity);
    summarize(cart);
}

pub fn clear<S: KeyValueStore>(store: &mut CartStore<S>) {
    store.clear();
    info!("Cart cleared");
}

fn summarize(cart: &Cart) {
    if cart.is_empty() {
        info!("Cart is empty");
        return;
    }
    for item in cart.items() {
        info!(
            product_id = %item.product.id,
            title = %item.product.title,
            quantity = item.quantity,
            unit_price = %item.product.price,
            line_total = %item.line_total(),
            "Cart line"
        );
    }
    info!(
        item_count = cart.item_count(),
        total = %cart.total(),
        "Cart totals"
    );
}
