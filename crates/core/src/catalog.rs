//! Catalog query helpers: filtering, sorting, and pagination.
//!
//! These are pure functions over product slices. The storefront's catalog
//! service and the CLI both feed them a loaded product list.

use serde::{Deserialize, Serialize};

use crate::types::{ParseEnumError, Price, Product, ProductCondition};

/// Product listing filters. Every field is optional; an empty filter set
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    /// Case-insensitive match against title, description, and location.
    pub search: Option<String>,
    /// Exact category match. `"all"` disables the filter.
    pub category: Option<String>,
    pub condition: Option<ProductCondition>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    /// Case-insensitive substring match against location.
    pub location: Option<String>,
}

impl ProductFilters {
    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = non_empty(self.search.as_deref()) {
            let term = search.to_lowercase();
            let hit = product.title.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
                || product.location.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }

        if let Some(category) = non_empty(self.category.as_deref())
            && category != "all"
            && product.category.as_deref() != Some(category)
        {
            return false;
        }

        if let Some(condition) = self.condition
            && product.condition != Some(condition)
        {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }

        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        if let Some(location) = non_empty(self.location.as_deref())
            && !product
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
        {
            return false;
        }

        true
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    /// Featured listings first, then newest.
    Featured,
}

impl std::str::FromStr for SortBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "featured" => Ok(Self::Featured),
            _ => Err(ParseEnumError::new("sort order", s)),
        }
    }
}

/// Products that pass `filters`, in catalog order.
#[must_use]
pub fn filter_products(products: &[Product], filters: &ProductFilters) -> Vec<Product> {
    products
        .iter()
        .filter(|product| filters.matches(product))
        .cloned()
        .collect()
}

/// Stable sort of `products` by `sort_by`.
///
/// Products without a creation date sort as the oldest.
pub fn sort_products(products: &mut [Product], sort_by: SortBy) {
    match sort_by {
        SortBy::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Oldest => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortBy::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortBy::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortBy::Featured => products.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
    }
}

/// Pagination metadata for a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: PaginationInfo,
}

/// Slice out 1-based `page` of `per_page` products.
///
/// Page 0 is treated as page 1 and a zero page size as 1. Pages past the end
/// are empty but still report the real totals.
#[must_use]
pub fn paginate(products: Vec<Product>, page: usize, per_page: usize) -> ProductPage {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total_items = products.len();
    let start = (page - 1).saturating_mul(per_page);

    let products = products
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();

    ProductPage {
        products,
        pagination: PaginationInfo {
            current_page: page,
            total_pages: total_items.div_ceil(per_page),
            total_items,
            items_per_page: per_page,
        },
    }
}
