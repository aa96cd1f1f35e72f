//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Reads render a loading state until the cart store has hydrated; writes are
//! refused with `503` until then.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use storefront_core::cart::DEFAULT_ADD_QUANTITY;
use storefront_core::{Cart, CartItem, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::CartState;
use crate::state::AppState;

/// Largest count the badge shows before switching to `99+`.
const BADGE_MAX: i64 = 99;

/// Cart item display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub title: String,
    pub quantity: i64,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: i64,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id.to_string(),
            title: item.product.title.clone(),
            quantity: item.quantity,
            price: item.product.price.to_string(),
            line_price: item.line_total().to_string(),
            image: item.product.primary_image().map(String::from),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

/// Text for the cart count badge, or `None` when the badge should be hidden.
#[must_use]
pub fn badge_label(count: i64) -> Option<String> {
    match count {
        ..=0 => None,
        1..=BADGE_MAX => Some(count.to_string()),
        _ => Some(format!("{BADGE_MAX}+")),
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<i64>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template. `cart` is `None` while the store is loading.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: Option<CartView>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub label: Option<String>,
}

/// JSON view of the cart store.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CartSnapshot<'a> {
    Loading,
    Ready { cart: &'a Cart },
}

impl<'a> From<CartState<'a>> for CartSnapshot<'a> {
    fn from(state: CartState<'a>) -> Self {
        match state {
            CartState::Loading => Self::Loading,
            CartState::Ready(cart) => Self::Ready { cart },
        }
    }
}

/// Items fragment plus the trigger that refreshes the badge.
fn items_fragment(cart: &Cart) -> Response {
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<CartShowTemplate> {
    let store = state.cart()?;
    Ok(CartShowTemplate {
        cart: store.state().ready().map(CartView::from),
    })
}

/// Add item to cart (HTMX).
///
/// Returns the count badge with an HTMX trigger to refresh other elements.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let product = state
        .catalog()
        .get(&product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    let quantity = form.quantity.unwrap_or(DEFAULT_ADD_QUANTITY);

    let mut store = state.ready_cart()?;
    let cart = store.add(product, quantity);

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", product_id.as_str()),
            ("quantity", &quantity.to_string()),
        ]),
    );
    tracing::info!(
        product_id = %product_id,
        quantity,
        item_count = cart.item_count(),
        "Added to cart"
    );

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            label: badge_label(cart.item_count()),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX). Zero or less removes the line.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let mut store = state.ready_cart()?;
    let cart = store.update_quantity(&product_id, form.quantity);

    add_breadcrumb(
        "cart",
        "Updated cart quantity",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(items_fragment(cart))
}

/// Remove item from cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let mut store = state.ready_cart()?;
    let cart = store.remove(&product_id);

    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", product_id.as_str())]),
    );
    Ok(items_fragment(cart))
}

/// Empty the cart (HTMX).
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Response> {
    let mut store = state.ready_cart()?;
    let cart = store.clear();

    add_breadcrumb("cart", "Cleared cart", None);
    tracing::info!("Cart cleared");
    Ok(items_fragment(cart))
}

/// Get cart count badge (HTMX). Empty while loading.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<CartCountTemplate> {
    let store = state.cart()?;
    let label = match store.state() {
        CartState::Loading => None,
        CartState::Ready(cart) => badge_label(cart.item_count()),
    };
    Ok(CartCountTemplate { label })
}

/// JSON snapshot of the cart, gated on hydration.
#[instrument(skip(state))]
pub async fn snapshot(State(state): State<AppState>) -> Result<Response> {
    let store = state.cart()?;
    Ok(Json(CartSnapshot::from(store.state())).into_response())
}
