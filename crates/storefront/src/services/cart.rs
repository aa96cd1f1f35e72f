//! Cart store: the authoritative in-memory cart plus its durable copy.
//!
//! The store owns a [`Cart`], a [`KeyValueStore`] backend, and a lifecycle:
//!
//! ```text
//! Uninitialized --hydrate()--> Hydrating --> Ready
//! ```
//!
//! `hydrate()` runs at most once. Readers go through [`CartStore::state`],
//! which returns [`CartState::Loading`] until hydration has finished, so a
//! freshly constructed (empty) cart is never mistaken for the user's real one.
//!
//! Persistence is best-effort. Every mutation succeeds in memory; a failed
//! write or read is logged and otherwise ignored.

use chrono::Utc;
use storefront_core::{Cart, CartAction, Product, ProductId};
use tracing::{debug, info, warn};

use crate::storage::{KeyValueStore, StorageError, validate_key};

/// Storage key the cart is persisted under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

/// Where the store is in its one-way startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartLifecycle {
    Uninitialized,
    Hydrating,
    Ready,
}

/// Read view handed to consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CartState<'a> {
    /// Hydration has not finished; item counts are not trustworthy yet.
    Loading,
    Ready(&'a Cart),
}

impl<'a> CartState<'a> {
    /// The cart, if ready.
    #[must_use]
    pub const fn ready(self) -> Option<&'a Cart> {
        match self {
            Self::Loading => None,
            Self::Ready(cart) => Some(cart),
        }
    }
}

/// What `hydrate()` found in durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// A valid cart was adopted.
    Restored { items: usize },
    /// Nothing was stored.
    Empty,
    /// The stored value was malformed and has been deleted.
    Discarded,
    /// Storage could not be read; the cart starts empty.
    Unavailable,
    /// Hydration already ran; nothing was done.
    AlreadyHydrated,
}

/// The cart store.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    cart: Cart,
    lifecycle: CartLifecycle,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Store persisting under [`DEFAULT_CART_KEY`].
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: DEFAULT_CART_KEY.to_string(),
            cart: Cart::new(),
            lifecycle: CartLifecycle::Uninitialized,
        }
    }

    /// Store persisting under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if `key` is not a valid storage key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self {
            key,
            ..Self::new(storage)
        })
    }

    /// Load the durable copy. Only the first call does anything.
    pub fn hydrate(&mut self) -> HydrationOutcome {
        if self.lifecycle != CartLifecycle::Uninitialized {
            debug!(key = %self.key, "Cart already hydrated, skipping");
            return HydrationOutcome::AlreadyHydrated;
        }
        self.lifecycle = CartLifecycle::Hydrating;

        let outcome = match self.storage.get(&self.key) {
            Ok(None) => HydrationOutcome::Empty,
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => {
                    let items = cart.items().len();
                    self.cart = cart;
                    HydrationOutcome::Restored { items }
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Discarding corrupt persisted cart");
                    if let Err(e) = self.storage.remove(&self.key) {
                        warn!(key = %self.key, error = %e, "Failed to remove corrupt cart");
                    }
                    HydrationOutcome::Discarded
                }
            },
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted cart");
                HydrationOutcome::Unavailable
            }
        };

        self.lifecycle = CartLifecycle::Ready;
        info!(
            key = %self.key,
            ?outcome,
            item_count = self.cart.item_count(),
            "Cart hydrated"
        );
        outcome
    }

    #[must_use]
    pub const fn lifecycle(&self) -> CartLifecycle {
        self.lifecycle
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lifecycle == CartLifecycle::Ready
    }

    /// Current cart, gated on hydration.
    #[must_use]
    pub fn state(&self) -> CartState<'_> {
        if self.is_ready() {
            CartState::Ready(&self.cart)
        } else {
            CartState::Loading
        }
    }

    /// Storage key of the durable copy.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Tear the store down, handing back the storage backend.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Add `quantity` of `product`, merging with an existing line.
    pub fn add(&mut self, product: Product, quantity: i64) -> &Cart {
        self.dispatch(CartAction::Add {
            product,
            quantity,
            added_at: Utc::now(),
        })
    }

    /// Remove every line for `product_id`. Unknown ids are a no-op.
    pub fn remove(&mut self, product_id: &ProductId) -> &Cart {
        self.dispatch(CartAction::Remove {
            product_id: product_id.clone(),
        })
    }

    /// Set the quantity for `product_id`; zero or less removes the line.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> &Cart {
        self.dispatch(CartAction::UpdateQuantity {
            product_id: product_id.clone(),
            quantity,
        })
    }

    /// Empty the cart and delete the durable copy.
    pub fn clear(&mut self) -> &Cart {
        self.dispatch(CartAction::Clear)
    }

    /// Apply `action` and sync the durable copy.
    pub fn dispatch(&mut self, action: CartAction) -> &Cart {
        if !self.is_ready() {
            warn!(
                action = action.name(),
                "Cart mutated before hydration; hydration may replace this state"
            );
        }

        let name = action.name();
        let clears = matches!(action, CartAction::Clear);
        self.cart.apply(action);

        debug!(
            action = name,
            item_count = self.cart.item_count(),
            total = %self.cart.total(),
            "Cart updated"
        );

        if clears {
            self.erase();
        } else {
            self.persist();
        }
        &self.cart
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.cart) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &serialized) {
            warn!(key = %self.key, error = %e, "Failed to save cart");
        }
    }

    fn erase(&mut self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to clear persisted cart");
        }
    }
}
