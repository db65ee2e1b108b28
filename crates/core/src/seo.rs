use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::Product;
use crate::config::BusinessProfile;
use crate::content::{BlogPost, Faq};

const DEFAULT_DESCRIPTION: &str = "Professional electronics and furniture pickup and resale service. Get instant quotes, schedule free pickups, and sell your items hassle-free.";
const SITE_KEYWORDS: &[&str] = &[
    "electronics pickup",
    "furniture resale",
    "sell electronics",
    "furniture buyer",
];
const OG_IMAGE_WIDTH: u32 = 1200;
const OG_IMAGE_HEIGHT: u32 = 630;

pub const STATIC_PAGES: &[&str] = &[
    "",
    "/products",
    "/pickup-request",
    "/about",
    "/contact",
    "/blog",
    "/faq",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    #[default]
    Website,
    Article,
    Product,
}

#[derive(Debug, Clone, Default)]
pub struct SeoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub page_type: PageType,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenGraphImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenGraph {
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub images: Vec<OpenGraphImage>,
    pub site_name: String,
    pub locale: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwitterCard {
    pub card: &'static str,
    pub site: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub open_graph: OpenGraph,
    pub twitter: TwitterCard,
    pub robots: &'static str,
    pub canonical: Option<String>,
}

impl PageMeta {
    pub fn build(business: &BusinessProfile, input: SeoInput) -> Self {
        let title = match input.title.as_deref() {
            Some(title) => format!("{title} | {}", business.name),
            None => format!("{} - Electronics & Furniture Resale Service", business.name),
        };
        let description = input
            .description
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let image = input
            .image
            .unwrap_or_else(|| business.default_image.clone());
        let keywords = input
            .keywords
            .iter()
            .map(String::as_str)
            .chain(SITE_KEYWORDS.iter().copied())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            keywords,
            open_graph: OpenGraph {
                page_type: input.page_type,
                title: title.clone(),
                description: description.clone(),
                url: input.url.clone(),
                images: vec![OpenGraphImage {
                    url: image.clone(),
                    width: OG_IMAGE_WIDTH,
                    height: OG_IMAGE_HEIGHT,
                    alt: input.title.unwrap_or_else(|| business.name.clone()),
                }],
                site_name: business.name.clone(),
                locale: "en_US",
                published_time: input.published_time,
                modified_time: input.modified_time,
                authors: input.author.into_iter().collect(),
            },
            twitter: TwitterCard {
                card: "summary_large_image",
                site: business.twitter_handle.clone(),
                title: title.clone(),
                description: description.clone(),
                images: vec![image],
            },
            robots: "index, follow",
            canonical: input.url,
            title,
            description,
        }
    }

    /// `site_url` makes the canonical and `og:url` links absolute.
    pub fn for_product(business: &BusinessProfile, site_url: &str, product: &Product) -> Self {
        let mut keywords = vec![product.name.clone(), product.category.clone()];
        keywords.extend(product.brand.clone());
        keywords.extend(["buy".to_string(), "resale".to_string()]);

        Self::build(
            business,
            SeoInput {
                title: Some(format!("{} - ₹{}", product.name, group_thousands(product.price))),
                description: Some(product.description.clone()),
                keywords,
                image: product.images.first().cloned(),
                url: Some(page_url(site_url, "product", &product.slug)),
                page_type: PageType::Product,
                ..SeoInput::default()
            },
        )
    }

    pub fn for_post(business: &BusinessProfile, site_url: &str, post: &BlogPost) -> Self {
        Self::build(
            business,
            SeoInput {
                title: Some(post.title.clone()),
                description: Some(post.excerpt.clone()),
                keywords: vec![post.category.clone()],
                image: Some(post.featured_image.clone()),
                url: Some(page_url(site_url, "blog", &post.slug)),
                page_type: PageType::Article,
                published_time: Some(post.published_at.to_string()),
                modified_time: Some(post.updated_at.to_string()),
                author: Some(post.author.clone()),
            },
        )
    }
}

fn page_url(site_url: &str, section: &str, slug: &str) -> String {
    format!("{}/{section}/{slug}", site_url.trim_end_matches('/'))
}

pub fn local_business_schema(business: &BusinessProfile, site_url: &str) -> Value {
    json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "@id": site_url,
        "name": business.name,
        "image": business.default_image,
        "telephone": business.phone,
        "email": business.email,
        "address": {
            "@type": "PostalAddress",
            "addressLocality": business.locality,
            "addressRegion": business.region,
            "addressCountry": business.country_code,
        },
        "geo": {
            "@type": "GeoCoordinates",
            "latitude": business.latitude,
            "longitude": business.longitude,
        },
        "openingHoursSpecification": {
            "@type": "OpeningHoursSpecification",
            "dayOfWeek": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
            "opens": "09:00",
            "closes": "19:00",
        },
        "serviceType": "Electronics and Furniture Pickup and Resale",
        "areaServed": business.address,
    })
}

pub fn product_schema(business: &BusinessProfile, product: &Product) -> Value {
    let availability = if product.in_stock {
        "https://schema.org/InStock"
    } else {
        "https://schema.org/OutOfStock"
    };

    json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": product.name,
        "image": product.images,
        "description": product.description,
        "offers": {
            "@type": "Offer",
            "price": product.price,
            "priceCurrency": "INR",
            "availability": availability,
            "seller": {
                "@type": "Organization",
                "name": business.name,
            },
        },
        "brand": product.brand,
        "category": product.category,
        "condition": product.condition.label(),
    })
}

pub fn article_schema(business: &BusinessProfile, post: &BlogPost) -> Value {
    let author = if post.author.is_empty() {
        &business.name
    } else {
        &post.author
    };

    json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": post.title,
        "description": post.excerpt,
        "image": post.featured_image,
        "datePublished": post.published_at.to_string(),
        "dateModified": post.updated_at.to_string(),
        "author": {
            "@type": "Person",
            "name": author,
        },
        "publisher": {
            "@type": "Organization",
            "name": business.name,
            "logo": {
                "@type": "ImageObject",
                "url": business.default_image,
            },
        },
    })
}

pub fn faq_schema(faqs: &[Faq]) -> Value {
    let entities = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": faq.answer,
                },
            })
        })
        .collect::<Vec<_>>();

    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: Option<NaiveDate>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

pub fn sitemap_entries(
    site_url: &str,
    today: NaiveDate,
    products: &[Product],
    posts: &[BlogPost],
) -> Vec<SitemapEntry> {
    let base = site_url.trim_end_matches('/');

    let static_pages = STATIC_PAGES.iter().map(|route| SitemapEntry {
        loc: format!("{base}{route}"),
        last_modified: Some(today),
        change_frequency: "weekly",
        priority: if route.is_empty() { 1.0 } else { 0.8 },
    });
    let product_pages = products.iter().map(|product| SitemapEntry {
        loc: format!("{base}/product/{}", product.slug),
        last_modified: None,
        change_frequency: "weekly",
        priority: 0.7,
    });
    let post_pages = posts.iter().map(|post| SitemapEntry {
        loc: format!("{base}/blog/{}", post.slug),
        last_modified: Some(post.updated_at),
        change_frequency: "monthly",
        priority: 0.6,
    });

    static_pages.chain(product_pages).chain(post_pages).collect()
}

pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        if let Some(date) = entry.last_modified {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", date.format("%Y-%m-%d")));
        }
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `65000` -> `65,000`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Condition;

    fn product() -> Product {
        Product {
            id: "1".to_string(),
            slug: "iphone-14-pro-excellent".to_string(),
            name: "iPhone 14 Pro".to_string(),
            description: "Battery health at 95%".to_string(),
            price: 65_000,
            original_price: Some(75_000),
            condition: Condition::Excellent,
            category: "electronics".to_string(),
            brand: Some("Apple".to_string()),
            images: vec!["https://img.test/1.jpg".to_string()],
            specifications: Vec::new(),
            in_stock: false,
            featured: true,
        }
    }

    #[test]
    fn default_title_and_keywords() {
        let meta = PageMeta::build(&BusinessProfile::default(), SeoInput::default());
        assert_eq!(
            meta.title,
            "ElectroFurni Pickup - Electronics & Furniture Resale Service"
        );
        assert_eq!(
            meta.keywords,
            "electronics pickup, furniture resale, sell electronics, furniture buyer"
        );
        assert_eq!(meta.open_graph.images[0].url, "/og-image.jpg");
    }

    #[test]
    fn product_meta_uses_price_and_first_image() {
        let meta = PageMeta::for_product(
            &BusinessProfile::default(),
            "https://shop.test/",
            &product(),
        );
        assert_eq!(meta.title, "iPhone 14 Pro - ₹65,000 | ElectroFurni Pickup");
        assert_eq!(
            meta.canonical.as_deref(),
            Some("https://shop.test/product/iphone-14-pro-excellent")
        );
        assert_eq!(meta.open_graph.url, meta.canonical);
        assert!(meta.keywords.starts_with("iPhone 14 Pro, electronics, Apple"));
    }

    #[test]
    fn product_schema_reports_stock() {
        let schema = product_schema(&BusinessProfile::default(), &product());
        assert_eq!(schema["offers"]["availability"], "https://schema.org/OutOfStock");
        assert_eq!(schema["offers"]["priceCurrency"], "INR");
    }

    #[test]
    fn sitemap_lists_static_and_dynamic_pages() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let entries = sitemap_entries("https://shop.test/", today, &[product()], &[]);
        assert_eq!(entries.len(), STATIC_PAGES.len() + 1);
        assert_eq!(entries[0].loc, "https://shop.test");
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[1].priority, 0.8);

        let xml = render_sitemap(&entries);
        assert!(xml.contains("<loc>https://shop.test/product/iphone-14-pro-excellent</loc>"));
        assert!(xml.contains("<priority>0.7</priority>"));
    }

    #[test]
    fn xml_is_escaped() {
        assert_eq!(escape_xml("a&b<c>"), "a&amp;b&lt;c&gt;");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_250_000), "1,250,000");
    }
}
