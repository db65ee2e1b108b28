use serde::{Deserialize, Serialize};

use crate::text::contains_ignore_case;

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const MAX_PAGE_SIZE: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    LikeNew,
    Excellent,
    Good,
    Fair,
}

impl Condition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "like new" | "new" => Some(Self::LikeNew),
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "fair" | "used" => Some(Self::Fair),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LikeNew => "Like New",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Whole rupees.
    pub price: u64,
    pub original_price: Option<u64>,
    pub condition: Condition,
    pub category: String,
    pub brand: Option<String>,
    pub images: Vec<String>,
    pub specifications: Vec<(String, String)>,
    pub in_stock: bool,
    pub featured: bool,
}

impl Product {
    pub fn discount_percent(&self) -> u8 {
        match self.original_price {
            Some(original) if original > self.price => {
                let saved = (original - self.price) as f64;
                (saved / original as f64 * 100.0).round() as u8
            }
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub description: String,
}

pub fn default_categories() -> Vec<Category> {
    [
        ("electronics", "Electronics", "Phones, laptops, TVs, cameras"),
        ("furniture", "Furniture", "Sofas, chairs, tables, beds"),
        ("appliances", "Appliances", "Washing machines, refrigerators"),
        ("office", "Office Equipment", "Desks, chairs, computers"),
        ("gaming", "Gaming", "Consoles, PCs, accessories"),
        ("others", "Others", "Everything else worth a second life"),
    ]
    .into_iter()
    .map(|(slug, name, description)| Category {
        slug: slug.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T: Clone> Page<T> {
    /// Slices `items` for a 1-based `page`; page 0 is treated as page 1.
    pub fn slice(items: &[T], page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total = items.len();
        let items = items
            .iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();

        Self {
            items,
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}

pub fn filter_products(products: &[Product], query: &ProductQuery) -> Page<Product> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"));
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let matching = products
        .iter()
        .filter(|product| category.map_or(true, |c| product.category.eq_ignore_ascii_case(c)))
        .filter(|product| search.map_or(true, |s| contains_ignore_case(&product.name, s)))
        .cloned()
        .collect::<Vec<_>>();

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    Page::slice(&matching, query.page.unwrap_or(1), limit)
}

pub fn featured_products(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|product| product.featured)
        .cloned()
        .collect()
}

pub fn find_by_slug<'a>(products: &'a [Product], slug: &str) -> Option<&'a Product> {
    products.iter().find(|product| product.slug == slug)
}
