//! # Catalog
//!
//! Resource locators for the read-only catalog endpoints and a helper that
//! hands out already-observing [`AsyncResource`]s for them.
//!
//! ```text
//! GET /products[?q=..&category_id=..&brand_id=..]   newest first
//! GET /products/:id
//! GET /categories                                    by name
//! GET /brands                                        by name
//! ```

use storefront_core::{Brand, Category, Product};
use url::form_urlencoded;

use crate::api::ApiClient;
use crate::resource::{AsyncResource, ResourceKey};

// =============================================================================
// Locators
// =============================================================================

/// Product list locator for a free-text search. Blank means the full list.
///
/// ```rust
/// use storefront_client::catalog::products_locator;
///
/// assert_eq!(products_locator(""), "/products");
/// assert_eq!(products_locator(" red lamp "), "/products?q=red+lamp");
/// ```
pub fn products_locator(query: &str) -> String {
    ProductFilter::search(query).locator()
}

pub fn product_locator(id: i64) -> String {
    format!("/products/{}", id)
}

pub fn categories_locator() -> String {
    "/categories".to_string()
}

pub fn brands_locator() -> String {
    "/brands".to_string()
}

/// Product list filters understood by `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: String,
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
}

impl ProductFilter {
    pub fn search(query: impl Into<String>) -> Self {
        ProductFilter {
            search: query.into(),
            ..Default::default()
        }
    }

    pub fn in_category(mut self, id: i64) -> Self {
        self.category_id = Some(id);
        self
    }

    pub fn by_brand(mut self, id: i64) -> Self {
        self.brand_id = Some(id);
        self
    }

    /// `/products` plus whichever filters are set, percent-encoded.
    pub fn locator(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());

        let search = self.search.trim();
        if !search.is_empty() {
            params.append_pair("q", search);
        }
        if let Some(id) = self.category_id {
            params.append_pair("category_id", &id.to_string());
        }
        if let Some(id) = self.brand_id {
            params.append_pair("brand_id", &id.to_string());
        }

        let query = params.finish();
        if query.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?{}", query)
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.locator())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Factory for catalog resources.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    pub fn new(api: ApiClient) -> Self {
        Catalog { api }
    }

    /// Product list, fetching immediately.
    ///
    /// When the filter changes, call `observe(new_filter.key())` on the
    /// returned resource; older in-flight searches are then discarded.
    pub fn products(&self, filter: &ProductFilter) -> AsyncResource<Vec<Product>> {
        self.observing(filter.key())
    }

    /// Single product; `None` (no id yet) leaves the resource idle and empty.
    pub fn product(&self, id: Option<i64>) -> AsyncResource<Product> {
        let key = match id {
            Some(id) => ResourceKey::new(product_locator(id)),
            None => ResourceKey::absent(),
        };
        self.observing(key)
    }

    pub fn categories(&self) -> AsyncResource<Vec<Category>> {
        self.observing(ResourceKey::new(categories_locator()))
    }

    pub fn brands(&self) -> AsyncResource<Vec<Brand>> {
        self.observing(ResourceKey::new(brands_locator()))
    }

    fn observing<T>(&self, key: ResourceKey) -> AsyncResource<T>
    where
        T: serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        let resource = AsyncResource::new(self.api.clone());
        // the spawned task is tracked through the resource's own state
        let _ = resource.observe(key);
        resource
    }
}

/// Splices a freshly created product at the front of an already-loaded
/// list, without refetching. Does nothing if the list has not loaded.
pub fn prepend_product(list: &AsyncResource<Vec<Product>>, product: Product) {
    list.update_data(|data| {
        if let Some(products) = data {
            products.insert(0, product);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, TokenSlot};
    use crate::testing::StubTransport;
    use crate::transport::Method;
    use serde_json::json;
    use std::sync::Arc;

    fn catalog(stub: &Arc<StubTransport>) -> Catalog {
        Catalog::new(ApiClient::new(
            stub.clone(),
            TokenSlot::session(Arc::new(MemoryStore::new())),
        ))
    }

    fn product(id: i64, name: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "price": 100.0, "discount": 0, "stock": 1,
               "colors": "", "description": "", "category": null, "brand": null,
               "images": [null, null, null]})
    }

    #[test]
    fn test_products_locator_encodes_query() {
        assert_eq!(products_locator("   "), "/products");
        assert_eq!(products_locator("a&b=c"), "/products?q=a%26b%3Dc");
        assert_eq!(
            ProductFilter::search("mug").in_category(2).by_brand(5).locator(),
            "/products?q=mug&category_id=2&brand_id=5"
        );
        assert_eq!(ProductFilter::default().by_brand(1).locator(), "/products?brand_id=1");
    }

    #[test]
    fn test_single_resource_locators() {
        assert_eq!(product_locator(12), "/products/12");
        assert_eq!(categories_locator(), "/categories");
        assert_eq!(brands_locator(), "/brands");
    }

    #[tokio::test]
    async fn test_products_resource_loads_and_prepends() {
        let stub = StubTransport::new();
        stub.respond(Method::Get, "/products", 200, json!([product(1, "Old")]));

        let list = catalog(&stub).products(&ProductFilter::default());
        let state = list.settled().await;
        assert_eq!(state.data.as_ref().map(Vec::len), Some(1));

        let created: Product = serde_json::from_value(product(2, "New")).unwrap();
        prepend_product(&list, created);

        let names: Vec<String> = list
            .data()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
        assert_eq!(stub.request_count(), 1);
    }

    #[tokio::test]
    async fn test_prepend_before_load_is_noop() {
        let stub = StubTransport::new();
        let list = catalog(&stub).products(&ProductFilter::default());
        list.stop();

        let created: Product = serde_json::from_value(product(2, "New")).unwrap();
        prepend_product(&list, created);
        assert!(list.data().is_none());
    }

    #[tokio::test]
    async fn test_product_without_id_is_idle() {
        let stub = StubTransport::new();
        let detail = catalog(&stub).product(None);

        assert!(!detail.is_loading());
        assert!(detail.data().is_none());
        assert_eq!(stub.request_count(), 0);
    }
}
