use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Page;
use crate::text::contains_ignore_case;

pub const DEFAULT_POSTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub author: String,
    pub published_at: NaiveDate,
    pub updated_at: NaiveDate,
    pub category: String,
    pub read_time_minutes: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub rating: u8,
    pub comment: String,
    pub location: String,
    pub date: NaiveDate,
}

pub fn search_faqs(faqs: &[Faq], query: Option<&str>) -> Vec<Faq> {
    let Some(query) = query.map(str::trim).filter(|value| !value.is_empty()) else {
        return faqs.to_vec();
    };

    faqs.iter()
        .filter(|faq| {
            contains_ignore_case(&faq.question, query) || contains_ignore_case(&faq.answer, query)
        })
        .cloned()
        .collect()
}

/// Newest first, ties broken by id so paging is stable.
pub fn paginate_posts(posts: &[BlogPost], page: usize, limit: usize) -> Page<BlogPost> {
    let mut sorted = posts.to_vec();
    sorted.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    Page::slice(&sorted, page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, published: &str) -> BlogPost {
        let date = published.parse::<NaiveDate>().unwrap();
        BlogPost {
            id: id.to_string(),
            slug: format!("post-{id}"),
            title: format!("Post {id}"),
            excerpt: String::new(),
            content: String::new(),
            featured_image: String::new(),
            author: "Staff".to_string(),
            published_at: date,
            updated_at: date,
            category: "Tips".to_string(),
            read_time_minutes: 3,
        }
    }

    #[test]
    fn posts_are_newest_first() {
        let posts = vec![post("1", "2025-01-10"), post("2", "2025-01-15")];
        let page = paginate_posts(&posts, 1, DEFAULT_POSTS_PER_PAGE);
        assert_eq!(page.items[0].id, "2");
        assert_eq!(page.total, 2);
    }

    #[test]
    fn faq_search_matches_answer_text() {
        let faqs = vec![Faq {
            id: "1".to_string(),
            question: "Is pickup free?".to_string(),
            answer: "Yes, within our service areas.".to_string(),
            category: "Service".to_string(),
        }];
        assert_eq!(search_faqs(&faqs, Some("SERVICE AREAS")).len(), 1);
        assert!(search_faqs(&faqs, Some("warranty")).is_empty());
        assert_eq!(search_faqs(&faqs, Some("  ")).len(), 1);
    }
}
