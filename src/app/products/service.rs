//! 产品业务服务
//!
//! 每个操作都重新读取完整集合，在内存中修改后写回整份文档。写操作共享一把进程级写锁，
//! 同一进程内的并发写入不会互相覆盖。

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use super::model::{client_fields, Product, ProductQuery, Review};
use crate::core::error::{ApiError, ApiResult};
use crate::infrastructure::store::ProductStore;

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 创建产品，返回新 id
    pub fn create_product(&self, payload: Map<String, Value>) -> ApiResult<String> {
        let _guard = self.write_lock.lock();
        let mut products = self.store.load()?;

        let now = Utc::now();
        let product = Product {
            id: fresh_id(&products),
            created_at: now,
            updated_at: now,
            reviews: None,
            attributes: client_fields(payload),
        };
        let id = product.id.clone();

        products.push(product);
        self.store.persist(&products)?;

        info!(id = %id, "产品已创建");
        Ok(id)
    }

    /// 获取产品列表，可按 category 精确过滤
    pub fn list_products(&self, query: &ProductQuery) -> ApiResult<Vec<Product>> {
        let mut products = self.store.load()?;
        if let Some(category) = &query.category {
            products.retain(|p| p.category() == Some(category.as_str()));
        }
        Ok(products)
    }

    pub fn get_product(&self, id: &str) -> ApiResult<Product> {
        self.store
            .load()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    /// 浅合并更新，返回合并后的记录
    pub fn update_product(&self, id: &str, payload: Map<String, Value>) -> ApiResult<Product> {
        let _guard = self.write_lock.lock();
        let mut products = self.store.load()?;

        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        product.merge(payload);
        product.updated_at = next_timestamp(product.updated_at);
        let updated = product.clone();

        self.store.persist(&products)?;

        info!(id = %id, "产品已更新");
        Ok(updated)
    }

    /// 删除所有 id 匹配的产品
    pub fn delete_product(&self, id: &str) -> ApiResult<()> {
        let _guard = self.write_lock.lock();
        let products = self.store.load()?;
        let before = products.len();

        let remaining: Vec<Product> = products.into_iter().filter(|p| p.id != id).collect();
        if remaining.len() == before {
            return Err(ApiError::NotFound(id.to_string()));
        }

        self.store.persist(&remaining)?;

        info!(id = %id, removed = before - remaining.len(), "产品已删除");
        Ok(())
    }

    /// 为产品追加一条评论，返回评论 id
    pub fn create_review(&self, product_id: &str, payload: Map<String, Value>) -> ApiResult<String> {
        let _guard = self.write_lock.lock();
        let mut products = self.store.load()?;

        let product = products
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::NotFound(product_id.to_string()))?;

        let reviews = product.reviews.get_or_insert_with(Vec::new);
        let review = Review {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            attributes: client_fields(payload),
        };
        let review_id = review.id.clone();
        reviews.push(review);

        self.store.persist(&products)?;

        info!(product_id = %product_id, review_id = %review_id, "评论已创建");
        Ok(review_id)
    }

    pub fn list_reviews(&self, product_id: &str) -> ApiResult<Vec<Review>> {
        let product = self.get_product(product_id)?;
        Ok(product.reviews.unwrap_or_default())
    }

    pub fn count(&self) -> ApiResult<usize> {
        Ok(self.store.load()?.len())
    }
}

fn fresh_id(products: &[Product]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !products.iter().any(|p| p.id == id) {
            return id;
        }
    }
}

/// 保证 updatedAt 严格递增
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::{JsonFileStore, StoreError};
    use serde_json::json;
    use tempfile::TempDir;

    /// 只保存在内存中的存储
    #[derive(Default)]
    struct MemoryStore {
        products: Mutex<Vec<Product>>,
    }

    impl ProductStore for MemoryStore {
        fn load(&self) -> Result<Vec<Product>, StoreError> {
            Ok(self.products.lock().clone())
        }

        fn persist(&self, products: &[Product]) -> Result<(), StoreError> {
            *self.products.lock() = products.to_vec();
            Ok(())
        }
    }

    fn service() -> ProductService {
        ProductService::new(Arc::new(MemoryStore::default()))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn foo(category: &str) -> Map<String, Value> {
        object(json!({
            "name": "Foo",
            "description": "Bar",
            "brand": "Acme",
            "category": category
        }))
    }

    #[test]
    fn test_create_then_get() {
        let service = service();
        let id = service.create_product(foo("tools")).unwrap();

        let product = service.get_product(&id).unwrap();
        assert_eq!(product.id, id);
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.attribute("name"), Some(&json!("Foo")));
        assert_eq!(product.category(), Some("tools"));
        assert!(product.reviews.is_none());
    }

    #[test]
    fn test_create_ignores_server_managed_fields() {
        let service = service();
        let mut payload = foo("tools");
        payload.insert("id".to_string(), json!("client-id"));
        payload.insert("createdAt".to_string(), json!("1999-01-01T00:00:00Z"));
        payload.insert("color".to_string(), json!("red"));

        let id = service.create_product(payload).unwrap();
        assert_ne!(id, "client-id");

        let product = service.get_product(&id).unwrap();
        assert_eq!(product.attribute("color"), Some(&json!("red")));
        assert!(product.attribute("id").is_none());
        assert!(product.attribute("createdAt").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let service = service();
        let a = service.create_product(foo("tools")).unwrap();
        let b = service.create_product(foo("tools")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_list_filters_by_category_preserving_order() {
        let service = service();
        let a = service.create_product(foo("tools")).unwrap();
        service.create_product(foo("garden")).unwrap();
        let c = service.create_product(foo("tools")).unwrap();
        service.create_product(foo("Tools")).unwrap();

        let all = service.list_products(&ProductQuery::default()).unwrap();
        assert_eq!(all.len(), 4);

        let tools = service
            .list_products(&ProductQuery {
                category: Some("tools".to_string()),
            })
            .unwrap();
        let ids: Vec<_> = tools.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_update_merges_and_refreshes_timestamp() {
        let service = service();
        let id = service.create_product(foo("tools")).unwrap();
        let before = service.get_product(&id).unwrap();

        let updated = service
            .update_product(&id, object(json!({"category": "hardware", "id": "hijack"})))
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.category(), Some("hardware"));
        assert_eq!(updated.attribute("brand"), Some(&json!("Acme")));
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(service.get_product(&id).unwrap(), updated);
    }

    #[test]
    fn test_delete_removes_product() {
        let service = service();
        let id = service.create_product(foo("tools")).unwrap();
        service.create_product(foo("garden")).unwrap();

        service.delete_product(&id).unwrap();

        assert_eq!(service.count().unwrap(), 1);
        assert!(matches!(service.get_product(&id), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_delete_removes_every_matching_record() {
        let now = Utc::now();
        let record = |id: &str| Product {
            id: id.to_string(),
            created_at: now,
            updated_at: now,
            reviews: None,
            attributes: foo("tools"),
        };
        let store = MemoryStore::default();
        *store.products.lock() = vec![record("dup"), record("other"), record("dup")];
        let service = ProductService::new(Arc::new(store));

        service.delete_product("dup").unwrap();

        let remaining = service.list_products(&ProductQuery::default()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "other");
        assert!(matches!(service.delete_product("dup"), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let service = service();
        service.create_product(foo("tools")).unwrap();

        assert!(matches!(service.get_product("nope"), Err(ApiError::NotFound(_))));
        assert!(matches!(
            service.update_product("nope", Map::new()),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(service.delete_product("nope"), Err(ApiError::NotFound(_))));
        assert!(matches!(service.list_reviews("nope"), Err(ApiError::NotFound(_))));
        assert!(matches!(
            service.create_review("nope", Map::new()),
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_reviews_are_nested_under_product() {
        let service = service();
        let id = service.create_product(foo("tools")).unwrap();
        let other = service.create_product(foo("tools")).unwrap();
        assert!(service.list_reviews(&id).unwrap().is_empty());

        let review_id = service
            .create_review(&id, object(json!({"rating": 5, "text": "great"})))
            .unwrap();

        let reviews = service.list_reviews(&id).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, review_id);
        assert_eq!(reviews[0].attributes["rating"], json!(5));
        assert!(service.list_reviews(&other).unwrap().is_empty());
        assert_eq!(service.count().unwrap(), 2);
    }

    #[test]
    fn test_update_cannot_replace_reviews() {
        let service = service();
        let id = service.create_product(foo("tools")).unwrap();
        service.create_review(&id, object(json!({"rating": 4}))).unwrap();

        service
            .update_product(&id, object(json!({"reviews": []})))
            .unwrap();

        assert_eq!(service.list_reviews(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_next_timestamp_is_strictly_increasing() {
        let future = Utc::now() + Duration::hours(1);
        assert!(next_timestamp(future) > future);
    }

    #[test]
    fn test_concurrent_writes_are_not_lost() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("products.json"));
        store.initialize().unwrap();
        let service = ProductService::new(Arc::new(store));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        service.create_product(foo("tools")).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.count().unwrap(), 80);
    }

    #[test]
    fn test_storage_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let service = ProductService::new(Arc::new(JsonFileStore::new(
            dir.path().join("missing.json"),
        )));

        assert!(matches!(
            service.list_products(&ProductQuery::default()),
            Err(ApiError::Storage(StoreError::Read { .. }))
        ));
    }
}
