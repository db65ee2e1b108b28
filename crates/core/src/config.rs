use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::whatsapp::WhatsAppConfig;

const DEFAULT_WHATSAPP_NUMBER: &str = "+919876543210";
const DEFAULT_SITE_URL: &str = "https://electrofurni.com";
const DEFAULT_BIND: &str = "0.0.0.0:8080";
const MIN_NUMBER_DIGITS: usize = 7;
const MAX_NUMBER_DIGITS: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("whatsapp number is empty")]
    EmptyNumber,
    #[error("whatsapp number contains invalid character {0:?}")]
    InvalidNumberCharacter(char),
    #[error("whatsapp number must have 7-15 digits, got {0}")]
    InvalidNumberLength(usize),
    #[error("whatsapp number must not start with 0")]
    LeadingZero,
    #[error("site url {value:?} is invalid: {reason}")]
    InvalidSiteUrl { value: String, reason: String },
    #[error("{name} must not be empty")]
    EmptyField { name: &'static str },
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Destination phone number in international form, digits only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DestinationNumber(String);

impl DestinationNumber {
    /// Accepts `+91 98765-43210`, `(91) 9876543210` and similar; the
    /// separators and a single leading `+` are dropped.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if body.is_empty() {
            return Err(ConfigError::EmptyNumber);
        }

        let mut digits = String::with_capacity(body.len());
        for ch in body.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(ConfigError::InvalidNumberCharacter(other)),
            }
        }

        if digits.is_empty() {
            return Err(ConfigError::EmptyNumber);
        }
        if !(MIN_NUMBER_DIGITS..=MAX_NUMBER_DIGITS).contains(&digits.len()) {
            return Err(ConfigError::InvalidNumberLength(digits.len()));
        }
        if digits.starts_with('0') {
            return Err(ConfigError::LeadingZero);
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: String,
    pub locality: String,
    pub region: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub twitter_handle: String,
    pub default_image: String,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            name: "ElectroFurni Pickup".to_string(),
            phone: "+91-9876543210".to_string(),
            email: "contact@electrofurni.com".to_string(),
            address: "Mumbai, Maharashtra, India".to_string(),
            hours: "Mon-Sat: 9AM-7PM, Sun: 10AM-5PM".to_string(),
            locality: "Mumbai".to_string(),
            region: "Maharashtra".to_string(),
            country_code: "IN".to_string(),
            latitude: 19.0760,
            longitude: 72.8777,
            twitter_handle: "@electrofurni".to_string(),
            default_image: "/og-image.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub business: BusinessProfile,
    pub whatsapp: WhatsAppConfig,
    /// Public origin without a trailing slash.
    pub site_url: String,
    pub bind: String,
    pub form_rate_limit: RateLimitConfig,
    pub allowed_origins: Vec<String>,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut business = BusinessProfile::default();
        if let Some(name) = lookup("PICKUP_BUSINESS_NAME") {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    name: "PICKUP_BUSINESS_NAME",
                });
            }
            business.name = name.trim().to_string();
        }
        if let Some(phone) = read("PICKUP_BUSINESS_PHONE") {
            business.phone = phone;
        }
        if let Some(email) = read("PICKUP_BUSINESS_EMAIL") {
            business.email = email;
        }

        let number = lookup("PICKUP_WHATSAPP_NUMBER")
            .unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string());
        let whatsapp = WhatsAppConfig::new(DestinationNumber::parse(&number)?);

        let site_url = parse_site_url(
            read("PICKUP_SITE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_SITE_URL),
        )?;

        let mut form_rate_limit = RateLimitConfig::default();
        if let Some(value) = read("PICKUP_FORM_RATE_LIMIT_WINDOW_SECONDS") {
            form_rate_limit.window =
                Duration::from_secs(parse_positive("PICKUP_FORM_RATE_LIMIT_WINDOW_SECONDS", &value)?);
        }
        if let Some(value) = read("PICKUP_FORM_RATE_LIMIT_MAX") {
            form_rate_limit.max_requests =
                parse_positive("PICKUP_FORM_RATE_LIMIT_MAX", &value)? as usize;
        }

        let allowed_origins = read("PICKUP_ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().trim_end_matches('/').to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| default_origins(&site_url));

        Ok(Self {
            business,
            whatsapp,
            bind: read("PICKUP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            site_url,
            form_rate_limit,
            allowed_origins,
        })
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let site_url = DEFAULT_SITE_URL.to_string();
        Self {
            business: BusinessProfile::default(),
            whatsapp: WhatsAppConfig::new(DestinationNumber(
                DEFAULT_WHATSAPP_NUMBER.trim_start_matches('+').to_string(),
            )),
            bind: DEFAULT_BIND.to_string(),
            form_rate_limit: RateLimitConfig::default(),
            allowed_origins: default_origins(&site_url),
            site_url,
        }
    }
}

fn parse_site_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw.trim()).map_err(|error| ConfigError::InvalidSiteUrl {
        value: raw.to_string(),
        reason: error.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidSiteUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|parsed| *parsed > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

fn default_origins(site_url: &str) -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        site_url.to_string(),
    ]
}
