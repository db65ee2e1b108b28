use chrono::{DateTime, NaiveDate, Utc};
use pickup_core::{BlogPost, Condition, Faq, PickupRequest, PickupStatus, Product, Testimonial};

const PEXELS: &str = "https://images.pexels.com/photos";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    date(year, month, day)
        .and_hms_opt(hour, minute, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn image(path: &str, width: u32) -> String {
    format!("{PEXELS}/{path}?auto=compress&cs=tinysrgb&w={width}")
}

fn specs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    slug: &str,
    name: &str,
    price: u64,
    original_price: u64,
    condition: Condition,
    category: &str,
    brand: Option<&str>,
    image_path: &str,
    description: &str,
) -> Product {
    Product {
        id: id.to_string(),
        slug: slug.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        original_price: Some(original_price),
        condition,
        category: category.to_string(),
        brand: brand.map(str::to_string),
        images: vec![image(image_path, 800)],
        specifications: specs(&[("Condition", condition.label())]),
        in_stock: true,
        featured: false,
    }
}

pub(crate) fn products() -> Vec<Product> {
    let mut iphone = product(
        "1",
        "iphone-14-pro-excellent",
        "iPhone 14 Pro - Excellent Condition",
        65_000,
        75_000,
        Condition::Excellent,
        "electronics",
        Some("Apple"),
        "1275929/pexels-photo-1275929.jpeg",
        "iPhone 14 Pro in excellent condition with minimal signs of use. Includes original charger and case. Battery health at 95%.",
    );
    iphone.images.push(image("47261/pexels-photo-47261.jpeg", 800));
    iphone.specifications = specs(&[
        ("Storage", "128GB"),
        ("Color", "Deep Purple"),
        ("Condition", "Excellent"),
        ("Battery Health", "95%"),
        ("Warranty", "3 months"),
        ("Accessories", "Charger, Case"),
    ]);
    iphone.featured = true;

    let mut macbook = product(
        "3",
        "macbook-air-m2-like-new",
        "MacBook Air M2 - Like New",
        85_000,
        95_000,
        Condition::LikeNew,
        "electronics",
        Some("Apple"),
        "18105/pexels-photo.jpg",
        "MacBook Air with the M2 chip, barely used, with original box and charger.",
    );
    macbook.featured = true;

    vec![
        iphone,
        product(
            "2",
            "modern-l-shaped-sofa",
            "Modern L-Shaped Sofa Set",
            25_000,
            35_000,
            Condition::Good,
            "furniture",
            None,
            "1350789/pexels-photo-1350789.jpeg",
            "Five-seater L-shaped sofa in grey fabric. Cleaned and inspected.",
        ),
        macbook,
        product(
            "4",
            "executive-office-chair",
            "Executive Office Chair",
            8_000,
            12_000,
            Condition::Good,
            "furniture",
            None,
            "2635038/pexels-photo-2635038.jpeg",
            "High-back ergonomic chair with adjustable armrests and lumbar support.",
        ),
        product(
            "5",
            "samsung-55-smart-tv",
            "Samsung 55\" Smart TV",
            35_000,
            45_000,
            Condition::Excellent,
            "electronics",
            Some("Samsung"),
            "1201996/pexels-photo-1201996.jpeg",
            "55-inch 4K smart TV with remote and wall mount.",
        ),
        product(
            "6",
            "wooden-dining-table-set",
            "Wooden Dining Table Set",
            18_000,
            25_000,
            Condition::Good,
            "furniture",
            None,
            "1126384/pexels-photo-1126384.jpeg",
            "Solid sheesham wood dining table with six chairs.",
        ),
    ]
}

pub(crate) fn faqs() -> Vec<Faq> {
    [
        ("How does the pickup process work?", "Simply submit a pickup request through our website or WhatsApp. We'll evaluate your items, provide a quote, and schedule a convenient pickup time. Our team will come to your location, verify the items, and pay you on the spot.", "Process"),
        ("What types of electronics do you buy?", "We purchase a wide range of electronics including smartphones, laptops, tablets, TVs, cameras, gaming consoles, and more. Items should be in working condition or have minor issues that can be repaired.", "Products"),
        ("Do you buy damaged furniture?", "We consider furniture with minor damage or wear. The final price depends on the condition and repairability. We evaluate each piece individually to provide the best possible quote.", "Products"),
        ("How do you determine the price?", "Our pricing is based on current market rates, item condition, brand value, age, and demand. We use industry-standard evaluation criteria to ensure fair and competitive pricing.", "Pricing"),
        ("Is the pickup service really free?", "Yes! We provide completely free pickup service within our service areas. There are no hidden charges or fees. You only pay for the items we purchase from you.", "Service"),
        ("How quickly do you respond to requests?", "We typically respond to pickup requests within 2-4 hours during business hours. Pickups are usually scheduled within 24-48 hours based on your preferred time slot.", "Service"),
        ("What payment methods do you offer?", "We offer immediate payment via cash, bank transfer, or UPI. Payment is processed on the spot after item verification during pickup.", "Payment"),
        ("Do you provide any warranty on purchased items?", "Yes, we provide a 1-3 month warranty on electronics and furniture we sell, depending on the item category and condition. Warranty terms are clearly specified for each product.", "Warranty"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (question, answer, category))| Faq {
        id: (index + 1).to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
        category: category.to_string(),
    })
    .collect()
}

pub(crate) fn posts() -> Vec<BlogPost> {
    let post = |id: &str,
                slug: &str,
                title: &str,
                excerpt: &str,
                image_path: &str,
                author: &str,
                published: NaiveDate,
                category: &str,
                read_time_minutes: u16| BlogPost {
        id: id.to_string(),
        slug: slug.to_string(),
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        content: String::new(),
        featured_image: image(image_path, 800),
        author: author.to_string(),
        published_at: published,
        updated_at: published,
        category: category.to_string(),
        read_time_minutes,
    };

    vec![
        post(
            "1",
            "best-price-used-electronics",
            "How to Get the Best Price for Your Used Electronics",
            "Learn the insider tips and tricks to maximize the value of your electronics when selling.",
            "325229/pexels-photo-325229.jpeg",
            "Rajesh Kumar",
            date(2025, 1, 15),
            "Tips",
            5,
        ),
        post(
            "2",
            "sustainable-furniture-pre-owned",
            "Sustainable Furniture: Why Buying Pre-owned Makes Sense",
            "Discover the environmental and financial benefits of choosing pre-owned furniture over new items.",
            "1350789/pexels-photo-1350789.jpeg",
            "Priya Patel",
            date(2025, 1, 12),
            "Sustainability",
            7,
        ),
        post(
            "3",
            "electronics-recycling-process",
            "Electronics Recycling: What Happens to Your Old Devices?",
            "Follow the journey of your old electronics through our responsible recycling process.",
            "356056/pexels-photo-356056.jpeg",
            "Amit Singh",
            date(2025, 1, 10),
            "Environment",
            4,
        ),
    ]
}

pub(crate) fn testimonials() -> Vec<Testimonial> {
    [
        ("Priya Sharma", "1239291/pexels-photo-1239291.jpeg", "Excellent service! They picked up my old furniture and gave me a great price. Very professional and punctual.", date(2025, 1, 15)),
        ("Rahul Gupta", "220453/pexels-photo-220453.jpeg", "Sold my iPhone through them. Process was smooth, payment was instant. Highly recommend!", date(2025, 1, 10)),
        ("Anita Singh", "774909/pexels-photo-774909.jpeg", "Amazing experience! They handled everything professionally and offered the best price in the market.", date(2025, 1, 8)),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (name, avatar, comment, when))| Testimonial {
        id: (index + 1).to_string(),
        name: name.to_string(),
        avatar: image(avatar, 100),
        rating: 5,
        comment: comment.to_string(),
        location: "Mumbai".to_string(),
        date: when,
    })
    .collect()
}

pub(crate) fn pickup_requests() -> Vec<PickupRequest> {
    vec![
        PickupRequest {
            id: "1".to_string(),
            name: "Rahul Sharma".to_string(),
            phone: "+91-9876543210".to_string(),
            email: "rahul@example.com".to_string(),
            address: "Bandra West, Mumbai, Maharashtra 400050".to_string(),
            category: "electronics".to_string(),
            items: "iPhone 12, MacBook Air, iPad".to_string(),
            preferred_date: date(2025, 1, 20),
            preferred_time: "9:00 AM - 12:00 PM".to_string(),
            status: PickupStatus::Pending,
            created_at: at(2025, 1, 15, 10, 30),
            estimated_value: Some(75_000),
        },
        PickupRequest {
            id: "2".to_string(),
            name: "Priya Patel".to_string(),
            phone: "+91-9876543211".to_string(),
            email: "priya@example.com".to_string(),
            address: "Andheri East, Mumbai, Maharashtra 400069".to_string(),
            category: "furniture".to_string(),
            items: "Sofa set, dining table, wardrobe".to_string(),
            preferred_date: date(2025, 1, 21),
            preferred_time: "12:00 PM - 3:00 PM".to_string(),
            status: PickupStatus::Confirmed,
            created_at: at(2025, 1, 14, 14, 20),
            estimated_value: Some(45_000),
        },
    ]
}
