//! Product listing route handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use storefront_core::{Price, ProductCondition, ProductFilters, ProductPage, SortBy};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::catalog::DEFAULT_PAGE_SIZE;
use crate::state::AppState;

/// Upper bound on `per_page`.
const MAX_PAGE_SIZE: usize = 100;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub location: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl ProductQuery {
    /// Convert to catalog filters, rejecting malformed values.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown condition or an
    /// unparsable price bound.
    pub fn filters(&self) -> Result<ProductFilters> {
        let condition = non_empty(self.condition.as_deref())
            .map(ProductCondition::from_str)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(ProductFilters {
            search: self.search.clone(),
            category: self.category.clone(),
            condition,
            min_price: parse_price("min_price", self.min_price.as_deref())?,
            max_price: parse_price("max_price", self.max_price.as_deref())?,
            location: self.location.clone(),
        })
    }

    /// Requested sort order. Unknown values keep catalog order.
    #[must_use]
    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort.as_deref().and_then(|s| s.parse().ok())
    }

    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &str, value: Option<&str>) -> Result<Option<Price>> {
    non_empty(value)
        .map(|raw| {
            Decimal::from_str(raw)
                .map(Price::from)
                .map_err(|e| AppError::BadRequest(format!("invalid {field}: {e}")))
        })
        .transpose()
}

/// Display product listing as JSON.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductPage>> {
    let filters = query.filters()?;
    let page = state.catalog().query(
        &filters,
        query.sort_by(),
        query.page.unwrap_or(1),
        query.per_page(),
    );

    tracing::debug!(
        total_items = page.pagination.total_items,
        current_page = page.pagination.current_page,
        "Product listing"
    );
    Ok(Json(page))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_filters() {
        let query = ProductQuery::default();
        assert_eq!(query.filters().unwrap(), ProductFilters::default());
        assert_eq!(query.sort_by(), None);
        assert_eq!(query.per_page(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_parses_prices_and_condition() {
        let query = ProductQuery {
            condition: Some("like-new".to_string()),
            min_price: Some("10".to_string()),
            max_price: Some("49.99".to_string()),
            ..ProductQuery::default()
        };
        let filters = query.filters().unwrap();
        assert_eq!(filters.condition, Some(ProductCondition::LikeNew));
        assert_eq!(filters.min_price, Some(Price::from_cents(1000)));
        assert_eq!(filters.max_price, Some(Price::from_cents(4999)));
    }

    #[test]
    fn test_rejects_bad_price() {
        let query = ProductQuery {
            min_price: Some("cheap".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(query.filters(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_rejects_unknown_condition() {
        let query = ProductQuery {
            condition: Some("mint".to_string()),
            ..ProductQuery::default()
        };
        assert!(matches!(query.filters(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_unknown_sort_is_ignored() {
        let query = ProductQuery {
            sort: Some("random".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(query.sort_by(), None);

        let query = ProductQuery {
            sort: Some("price-high".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(query.sort_by(), Some(SortBy::PriceHigh));
    }

    #[test]
    fn test_per_page_is_clamped() {
        let query = ProductQuery {
            per_page: Some(1000),
            ..ProductQuery::default()
        };
        assert_eq!(query.per_page(), MAX_PAGE_SIZE);

        let query = ProductQuery {
            per_page: Some(0),
            ..ProductQuery::default()
        };
        assert_eq!(query.per_page(), 1);
    }
}
