mod seed;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use pickup_core::{
    default_categories, BlogPost, Category, ContactMessage, Faq, PickupRequest, PickupStatus,
    PickupUpdate, Product, Testimonial,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

pub trait CatalogRepository: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
}

pub trait ContentRepository: Send + Sync {
    async fn list_faqs(&self) -> Result<Vec<Faq>>;
    async fn list_posts(&self) -> Result<Vec<BlogPost>>;
    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>>;
}

pub trait LeadRepository: Send + Sync {
    async fn insert_pickup_request(&self, request: PickupRequest) -> Result<()>;
    /// Newest first; `None` lists every status.
    async fn list_pickup_requests(&self, status: Option<PickupStatus>)
        -> Result<Vec<PickupRequest>>;
    async fn update_pickup_request(
        &self,
        id: &str,
        update: &PickupUpdate,
    ) -> Result<Option<PickupRequest>>;
    async fn insert_contact_message(&self, message: ContactMessage) -> Result<()>;
    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>>;
    async fn subscribe_newsletter(&self, email: &str) -> Result<SubscribeOutcome>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    products: Arc<RwLock<Vec<Product>>>,
    categories: Arc<RwLock<Vec<Category>>>,
    faqs: Arc<RwLock<Vec<Faq>>>,
    posts: Arc<RwLock<Vec<BlogPost>>>,
    testimonials: Arc<RwLock<Vec<Testimonial>>>,
    pickup_requests: Arc<RwLock<HashMap<String, PickupRequest>>>,
    contact_messages: Arc<RwLock<Vec<ContactMessage>>>,
    subscribers: Arc<RwLock<BTreeSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the demo catalog, content and sample leads.
    pub fn seeded() -> Self {
        let store = Self {
            products: Arc::new(RwLock::new(seed::products())),
            categories: Arc::new(RwLock::new(default_categories())),
            faqs: Arc::new(RwLock::new(seed::faqs())),
            posts: Arc::new(RwLock::new(seed::posts())),
            testimonials: Arc::new(RwLock::new(seed::testimonials())),
            pickup_requests: Arc::new(RwLock::new(
                seed::pickup_requests()
                    .into_iter()
                    .map(|request| (request.id.clone(), request))
                    .collect(),
            )),
            ..Self::default()
        };

        tracing::debug!(
            products = store.products.read().len(),
            faqs = store.faqs.read().len(),
            posts = store.posts.read().len(),
            "memory store seeded"
        );
        store
    }
}

impl CatalogRepository for MemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().clone())
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(pickup_core::find_by_slug(&self.products.read(), slug).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.read().clone())
    }
}

impl ContentRepository for MemoryStore {
    async fn list_faqs(&self) -> Result<Vec<Faq>> {
        Ok(self.faqs.read().clone())
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        Ok(self.posts.read().clone())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        Ok(self
            .posts
            .read()
            .iter()
            .find(|post| post.slug == slug)
            .cloned())
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        Ok(self.testimonials.read().clone())
    }
}

impl LeadRepository for MemoryStore {
    async fn insert_pickup_request(&self, request: PickupRequest) -> Result<()> {
        self.pickup_requests
            .write()
            .insert(request.id.clone(), request);
        Ok(())
    }

    async fn list_pickup_requests(
        &self,
        status: Option<PickupStatus>,
    ) -> Result<Vec<PickupRequest>> {
        let mut requests = self
            .pickup_requests
            .read()
            .values()
            .filter(|request| status.map_or(true, |wanted| request.status == wanted))
            .cloned()
            .collect::<Vec<_>>();
        requests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(requests)
    }

    async fn update_pickup_request(
        &self,
        id: &str,
        update: &PickupUpdate,
    ) -> Result<Option<PickupRequest>> {
        let mut guard = self.pickup_requests.write();
        let Some(request) = guard.get_mut(id) else {
            return Ok(None);
        };
        request.apply(update);
        Ok(Some(request.clone()))
    }

    async fn insert_contact_message(&self, message: ContactMessage) -> Result<()> {
        self.contact_messages.write().push(message);
        Ok(())
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>> {
        Ok(self.contact_messages.read().clone())
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<SubscribeOutcome> {
        let inserted = self.subscribers.write().insert(email.to_lowercase());
        Ok(if inserted {
            SubscribeOutcome::Subscribed
        } else {
            SubscribeOutcome::AlreadySubscribed
        })
    }
}

/// Backend selected at startup; every repository call dispatches through it.
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub fn seeded() -> Self {
        Self::Memory(MemoryStore::seeded())
    }
}

impl From<MemoryStore> for Store {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl CatalogRepository for Store {
    async fn list_products(&self) -> Result<Vec<Product>> {
        match self {
            Store::Memory(store) => store.list_products().await,
        }
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        match self {
            Store::Memory(store) => store.product_by_slug(slug).await,
        }
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        match self {
            Store::Memory(store) => store.list_categories().await,
        }
    }
}

impl ContentRepository for Store {
    async fn list_faqs(&self) -> Result<Vec<Faq>> {
        match self {
            Store::Memory(store) => store.list_faqs().await,
        }
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        match self {
            Store::Memory(store) => store.list_posts().await,
        }
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        match self {
            Store::Memory(store) => store.post_by_slug(slug).await,
        }
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        match self {
            Store::Memory(store) => store.list_testimonials().await,
        }
    }
}

impl LeadRepository for Store {
    async fn insert_pickup_request(&self, request: PickupRequest) -> Result<()> {
        match self {
            Store::Memory(store) => store.insert_pickup_request(request).await,
        }
    }

    async fn list_pickup_requests(
        &self,
        status: Option<PickupStatus>,
    ) -> Result<Vec<PickupRequest>> {
        match self {
            Store::Memory(store) => store.list_pickup_requests(status).await,
        }
    }

    async fn update_pickup_request(
        &self,
        id: &str,
        update: &PickupUpdate,
    ) -> Result<Option<PickupRequest>> {
        match self {
            Store::Memory(store) => store.update_pickup_request(id, update).await,
        }
    }

    async fn insert_contact_message(&self, message: ContactMessage) -> Result<()> {
        match self {
            Store::Memory(store) => store.insert_contact_message(message).await,
        }
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>> {
        match self {
            Store::Memory(store) => store.list_contact_messages().await,
        }
    }

    async fn subscribe_newsletter(&self, email: &str) -> Result<SubscribeOutcome> {
        match self {
            Store::Memory(store) => store.subscribe_newsletter(email).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pickup_core::PickupRequestForm;

    use super::*;

    fn form() -> PickupRequestForm {
        PickupRequestForm {
            name: "Asha Rao".to_string(),
            phone: "9876543212".to_string(),
            email: "asha@example.com".to_string(),
            address: "Powai, Mumbai 400076".to_string(),
            category: "appliances".to_string(),
            items: "Washing machine, 6 years old".to_string(),
            preferred_date: "2025-02-01".to_string(),
            preferred_time: "3:00 PM - 6:00 PM".to_string(),
        }
    }

    #[tokio::test]
    async fn seeded_store_has_demo_data() {
        let store = MemoryStore::seeded();
        assert_eq!(store.list_products().await.unwrap().len(), 6);
        assert_eq!(store.list_faqs().await.unwrap().len(), 8);
        assert!(store
            .product_by_slug("iphone-14-pro-excellent")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .post_by_slug("best-price-used-electronics")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn pickup_requests_filter_and_update() {
        let store = MemoryStore::seeded();
        let request = PickupRequest::from_form(form(), Utc::now()).unwrap();
        let id = request.id.clone();
        store.insert_pickup_request(request).await.unwrap();

        let pending = store
            .list_pickup_requests(Some(PickupStatus::Pending))
            .await
            .unwrap();
        assert_eq!(pending[0].id, id);

        let updated = store
            .update_pickup_request(
                &id,
                &PickupUpdate {
                    status: Some(PickupStatus::Completed),
                    estimated_value: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PickupStatus::Completed);

        let missing = store
            .update_pickup_request("nope", &PickupUpdate::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn store_dispatches_to_memory_backend() {
        let store = Store::seeded();
        assert_eq!(store.list_testimonials().await.unwrap().len(), 3);
        assert_eq!(store.list_pickup_requests(None).await.unwrap().len(), 2);

        let empty = Store::memory();
        assert!(empty.list_products().await.unwrap().is_empty());
        assert_eq!(
            empty.subscribe_newsletter("x@y.co").await.unwrap(),
            SubscribeOutcome::Subscribed
        );
    }

    #[tokio::test]
    async fn newsletter_is_idempotent_and_case_insensitive() {
        let store = MemoryStore::new();
        assert_eq!(
            store.subscribe_newsletter("a@b.co").await.unwrap(),
            SubscribeOutcome::Subscribed
        );
        assert_eq!(
            store.subscribe_newsletter("A@B.CO").await.unwrap(),
            SubscribeOutcome::AlreadySubscribed
        );
    }
}
