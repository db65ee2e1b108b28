pub mod catalog;
pub mod config;
pub mod content;
pub mod leads;
pub mod seo;
pub mod text;
pub mod whatsapp;

pub use catalog::{
    default_categories, featured_products, filter_products, find_by_slug, Category, Condition,
    Page, Product, ProductQuery,
};
pub use config::{BusinessProfile, ConfigError, DestinationNumber, RateLimitConfig, SiteConfig};
pub use content::{paginate_posts, search_faqs, BlogPost, Faq, Testimonial};
pub use leads::{
    validate_email, ContactForm, ContactMessage, DashboardStats, PickupRequest, PickupRequestForm,
    PickupStatus, PickupUpdate, ValidationErrors,
};
pub use seo::{PageMeta, PageType, SeoInput, SitemapEntry};
pub use text::{normalize_optional, normalize_text};
pub use whatsapp::{
    compose, compose_message, IntentFields, IntentKind, MessageIntent, WhatsAppConfig,
    WhatsAppLink,
};
