use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::text::{char_count, normalize_optional, normalize_text};
use crate::whatsapp::MessageIntent;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub const PICKUP_CATEGORIES: &[(&str, &str)] = &[
    ("electronics", "Electronics"),
    ("furniture", "Furniture"),
    ("appliances", "Appliances"),
    ("office", "Office Equipment"),
    ("others", "Others"),
];

pub const PICKUP_TIME_SLOTS: &[&str] = &[
    "9:00 AM - 12:00 PM",
    "12:00 PM - 3:00 PM",
    "3:00 PM - 6:00 PM",
    "6:00 PM - 9:00 PM",
];

const MIN_NAME_LEN: usize = 2;
const MIN_PHONE_DIGITS: usize = 10;
const MIN_ADDRESS_LEN: usize = 10;
const MIN_ITEMS_LEN: usize = 10;
const MIN_CONTACT_MESSAGE_LEN: usize = 10;
const MAX_FIELD_LEN: usize = 2_000;

/// Field name to message, for every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields().collect::<Vec<_>>();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl PickupStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupRequestForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub category: String,
    pub items: String,
    #[serde(alias = "preferredDate")]
    pub preferred_date: String,
    #[serde(alias = "preferredTime")]
    pub preferred_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupRequest {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub category: String,
    pub items: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub status: PickupStatus,
    pub created_at: DateTime<Utc>,
    pub estimated_value: Option<u64>,
}

impl PickupRequest {
    pub fn from_form(form: PickupRequestForm, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = normalize_text(&form.name);
        check_min_len(&mut errors, "name", &name, MIN_NAME_LEN, "Name must be at least 2 characters");

        let phone = normalize_text(&form.phone);
        if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            errors.add("phone", "Phone number must be at least 10 digits");
        }

        let email = check_email(&mut errors, &form.email);

        let address = normalize_text(&form.address);
        check_min_len(
            &mut errors,
            "address",
            &address,
            MIN_ADDRESS_LEN,
            "Address must be at least 10 characters",
        );

        let category = canonical_category(&form.category);
        if category.is_none() {
            errors.add("category", "Please select a category");
        }

        let items = form.items.trim().to_string();
        check_min_len(
            &mut errors,
            "items",
            &items,
            MIN_ITEMS_LEN,
            "Please provide detailed description of items",
        );

        let preferred_date = NaiveDate::parse_from_str(form.preferred_date.trim(), "%Y-%m-%d").ok();
        if preferred_date.is_none() {
            errors.add("preferred_date", "Please select preferred date");
        }

        let preferred_time = PICKUP_TIME_SLOTS
            .iter()
            .find(|slot| slot.eq_ignore_ascii_case(form.preferred_time.trim()));
        if preferred_time.is_none() {
            errors.add("preferred_time", "Please select preferred time slot");
        }

        let (Some(category), Some(preferred_date), Some(preferred_time)) =
            (category, preferred_date, preferred_time)
        else {
            return Err(errors);
        };

        errors.into_result(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            phone,
            email,
            address,
            category: category.to_string(),
            items,
            preferred_date,
            preferred_time: preferred_time.to_string(),
            status: PickupStatus::Pending,
            created_at: now,
            estimated_value: None,
        })
    }

    /// Follow-up chat message carrying the customer's details.
    pub fn whatsapp_intent(&self) -> MessageIntent {
        MessageIntent::Pickup {
            customer_name: Some(self.name.clone()),
            customer_phone: Some(self.phone.clone()),
            custom_message: None,
        }
        .normalized()
    }

    pub fn apply(&mut self, update: &PickupUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(value) = update.estimated_value {
            self.estimated_value = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickupUpdate {
    pub status: Option<PickupStatus>,
    #[serde(alias = "estimatedValue")]
    pub estimated_value: Option<u64>,
}

impl PickupUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.estimated_value.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_requests: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_estimated_value: u64,
    pub avg_estimated_value: f64,
}

impl DashboardStats {
    pub fn from_requests(requests: &[PickupRequest]) -> Self {
        let mut stats = Self {
            total_requests: requests.len(),
            ..Self::default()
        };
        let mut valued = 0_u64;

        for request in requests {
            match request.status {
                PickupStatus::Pending => stats.pending += 1,
                PickupStatus::Confirmed => stats.confirmed += 1,
                PickupStatus::Completed => stats.completed += 1,
                PickupStatus::Cancelled => stats.cancelled += 1,
            }
            if let Some(value) = request.estimated_value {
                stats.total_estimated_value = stats.total_estimated_value.saturating_add(value);
                valued += 1;
            }
        }

        if valued > 0 {
            stats.avg_estimated_value = stats.total_estimated_value as f64 / valued as f64;
        }
        stats
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn from_form(form: ContactForm, now: DateTime<Utc>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = normalize_text(&form.name);
        check_min_len(&mut errors, "name", &name, MIN_NAME_LEN, "Name must be at least 2 characters");
        let email = check_email(&mut errors, &form.email);
        let message = form.message.trim().to_string();
        check_min_len(
            &mut errors,
            "message",
            &message,
            MIN_CONTACT_MESSAGE_LEN,
            "Message must be at least 10 characters",
        );

        errors.into_result(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone: normalize_optional(form.phone),
            subject: normalize_optional(form.subject),
            message,
            created_at: now,
        })
    }
}

/// Trimmed, lower-cased address or a single `email` field error.
pub fn validate_email(raw: &str) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let email = check_email(&mut errors, raw);
    errors.into_result(email)
}

fn check_email(errors: &mut ValidationErrors, raw: &str) -> String {
    let email = raw.trim().to_lowercase();
    if email.len() > MAX_FIELD_LEN || !EMAIL_RE.is_match(&email) {
        errors.add("email", "Invalid email address");
    }
    email
}

fn check_min_len(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    min: usize,
    message: &str,
) {
    let len = char_count(value);
    if len < min {
        errors.add(field, message);
    } else if len > MAX_FIELD_LEN {
        errors.add(field, format!("{field} must be at most {MAX_FIELD_LEN} characters"));
    }
}

fn canonical_category(value: &str) -> Option<&'static str> {
    let value = value.trim();
    PICKUP_CATEGORIES
        .iter()
        .find(|(slug, label)| slug.eq_ignore_ascii_case(value) || label.eq_ignore_ascii_case(value))
        .map(|(slug, _)| *slug)
}
