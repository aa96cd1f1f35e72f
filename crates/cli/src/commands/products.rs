//! Catalog listing command.

use storefront::services::Catalog;
use storefront_core::{ProductFilters, ProductPage, SortBy};
use tracing::info;

use super::CommandError;

/// Listing options as given on the command line.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: usize,
    pub per_page: usize,
}

/// Filter, sort and paginate the catalog, then log the page.
///
/// # Errors
///
/// Returns `CommandError::InvalidSort` for an unknown sort order.
pub fn list(catalog: &Catalog, query: &ListQuery) -> Result<ProductPage, CommandError> {
    let sort_by = query
        .sort
        .as_deref()
        .map(str::parse::<SortBy>)
        .transpose()?;

    let filters = ProductFilters {
        search: query.search.clone(),
        category: query.category.clone(),
        ..ProductFilters::default()
    };
    let page = catalog.query(&filters, sort_by, query.page, query.per_page);

    for product in &page.products {
        info!(
            id = %product.id,
            title = %product.title,
            price = %product.price,
            category = product.category.as_deref().unwrap_or("-"),
            "Product"
        );
    }
    info!(
        page = page.pagination.current_page,
        total_pages = page.pagination.total_pages,
        total_items = page.pagination.total_items,
        "Listing"
    );
    Ok(page)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storefront_core::{Price, Product};

    use super::*;

    fn catalog() -> Catalog {
        let mut lamp = Product::new("p1", "Brass Lamp", Price::from_cents(1000));
        lamp.category = Some("lighting".to_string());
        let chair = Product::new("p2", "Oak Chair", Price::from_cents(4550));
        let mut sconce = Product::new("p3", "Wall Sconce", Price::from_cents(2500));
        sconce.category = Some("lighting".to_string());
        Catalog::new(vec![lamp, chair, sconce]).unwrap()
    }

    fn query() -> ListQuery {
        ListQuery {
            search: None,
            category: None,
            sort: None,
            page: 1,
            per_page: 12,
        }
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let page = list(
            &catalog(),
            &ListQuery {
                category: Some("lighting".to_string()),
                sort: Some("price-high".to_string()),
                ..query()
            },
        )
        .unwrap();

        let ids: Vec<&str> = page.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p3", "p1"]);
        assert_eq!(page.pagination.total_items, 2);
    }

    #[test]
    fn test_list_rejects_unknown_sort() {
        let err = list(
            &catalog(),
            &ListQuery {
                sort: Some("cheapest".to_string()),
                ..query()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CommandError::InvalidSort(_)));
    }

    #[test]
    fn test_list_paginates() {
        let page = list(
            &catalog(),
            &ListQuery {
                page: 2,
                per_page: 2,
                ..query()
            },
        )
        .unwrap();
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.pagination.total_pages, 2);
    }
}
