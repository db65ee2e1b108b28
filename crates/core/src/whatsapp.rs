//! WhatsApp deep-link composition.
//!
//! A [`MessageIntent`] describes why a visitor is reaching out; [`compose`]
//! turns it into the pre-filled `wa.me` link for the configured business
//! number. Composition is pure: opening the link is left to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DestinationNumber;

const CHAT_BASE_URL: &str = "https://wa.me";

const PICKUP_OPENING: &str = "Hello! I would like to schedule a pickup for my items.";
const PICKUP_CLOSING: &str = "Please let me know the next available slot.";
const PRODUCT_FALLBACK_NAME: &str = "this product";
const PRODUCT_CLOSING: &str =
    ". Could you please provide more details about availability and pricing?";
const CONTACT_OPENING: &str =
    "Hello! I would like to get in touch regarding your pickup and resale services.";
const CONTACT_CLOSING: &str = "Please contact me at your earliest convenience.";
const GENERAL_DEFAULT: &str = "Hello! I would like to know more about your services.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageIntent {
    Pickup {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        customer_phone: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_message: Option<String>,
    },
    Product {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_id: Option<String>,
    },
    Contact {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_message: Option<String>,
    },
    General {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        custom_message: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Pickup,
    Product,
    Contact,
    General,
}

impl IntentKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pickup" => Some(Self::Pickup),
            "product" => Some(Self::Product),
            "contact" => Some(Self::Contact),
            "general" | "" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Product => "product",
            Self::Contact => "contact",
            Self::General => "general",
        }
    }
}

/// Loose field bag used by flat inputs (query strings, CLI flags). Fields
/// irrelevant to the chosen kind are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentFields {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub custom_message: Option<String>,
    pub product_name: Option<String>,
    pub product_id: Option<String>,
}

impl MessageIntent {
    pub fn from_parts(kind: IntentKind, fields: IntentFields) -> Self {
        let intent = match kind {
            IntentKind::Pickup => Self::Pickup {
                customer_name: fields.customer_name,
                customer_phone: fields.customer_phone,
                custom_message: fields.custom_message,
            },
            IntentKind::Product => Self::Product {
                product_name: fields.product_name,
                product_id: fields.product_id,
            },
            IntentKind::Contact => Self::Contact {
                custom_message: fields.custom_message,
            },
            IntentKind::General => Self::General {
                custom_message: fields.custom_message,
            },
        };
        intent.normalized()
    }

    pub fn general() -> Self {
        Self::General {
            custom_message: None,
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Pickup { .. } => IntentKind::Pickup,
            Self::Product { .. } => IntentKind::Product,
            Self::Contact { .. } => IntentKind::Contact,
            Self::General { .. } => IntentKind::General,
        }
    }

    /// Maps blank optional fields to `None`; non-blank text is kept as given.
    pub fn normalized(self) -> Self {
        match self {
            Self::Pickup {
                customer_name,
                customer_phone,
                custom_message,
            } => Self::Pickup {
                customer_name: present(customer_name),
                customer_phone: present(customer_phone),
                custom_message: present(custom_message),
            },
            Self::Product {
                product_name,
                product_id,
            } => Self::Product {
                product_name: present(product_name),
                product_id: present(product_id),
            },
            Self::Contact { custom_message } => Self::Contact {
                custom_message: present(custom_message),
            },
            Self::General { custom_message } => Self::General {
                custom_message: present(custom_message),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppConfig {
    number: DestinationNumber,
}

impl WhatsAppConfig {
    pub fn new(number: DestinationNumber) -> Self {
        Self { number }
    }

    pub fn number(&self) -> &DestinationNumber {
        &self.number
    }

    pub fn chat_url(&self) -> String {
        format!("{CHAT_BASE_URL}/{}", self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhatsAppLink {
    url: String,
    message: String,
}

impl WhatsAppLink {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_url(self) -> String {
        self.url
    }
}

impl fmt::Display for WhatsAppLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

pub fn compose(config: &WhatsAppConfig, intent: &MessageIntent) -> WhatsAppLink {
    let message = compose_message(intent);
    let url = format!("{}?text={}", config.chat_url(), pct_encode(&message));
    WhatsAppLink { url, message }
}

pub fn compose_message(intent: &MessageIntent) -> String {
    match intent {
        MessageIntent::Pickup {
            customer_name,
            customer_phone,
            custom_message,
        } => {
            let mut parts = vec![PICKUP_OPENING.to_string()];
            if let Some(name) = given(customer_name) {
                parts.push(format!("My name is {name}."));
            }
            if let Some(phone) = given(customer_phone) {
                parts.push(format!("My phone number is {phone}."));
            }
            parts.push(given(custom_message).unwrap_or(PICKUP_CLOSING).to_string());
            parts.join(" ")
        }
        MessageIntent::Product {
            product_name,
            product_id,
        } => {
            let name = given(product_name).unwrap_or(PRODUCT_FALLBACK_NAME);
            let id = given(product_id)
                .map(|id| format!(" (ID: {id})"))
                .unwrap_or_default();
            format!("Hi! I'm interested in {name}{id}{PRODUCT_CLOSING}")
        }
        MessageIntent::Contact { custom_message } => format!(
            "{CONTACT_OPENING} {}",
            given(custom_message).unwrap_or(CONTACT_CLOSING)
        ),
        MessageIntent::General { custom_message } => {
            given(custom_message).unwrap_or(GENERAL_DEFAULT).to_string()
        }
    }
}

/// Percent-encodes every byte outside the RFC 3986 unreserved set.
pub fn pct_encode(input: &str) -> String {
    let mut output = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            output.push(byte as char);
        } else {
            output.push('%');
            output.push_str(&format!("{:02X}", byte));
        }
    }
    output
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

// Struct-literal intents skip `normalized`, so blank fields are re-checked here.
fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}
