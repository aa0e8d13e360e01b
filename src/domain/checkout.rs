//! Shopper details collected by the checkout form.

use serde::{Deserialize, Serialize};
use storefront_api_types::{FieldError, ValidationErrors};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,

    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub card_name: String,

    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutDetails {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let mut require = |field: &'static str, value: &str, message: &'static str| {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, message));
            }
        };

        require("firstName", &self.first_name, "First name is required");
        require("lastName", &self.last_name, "Last name is required");
        require("address", &self.address, "Address is required");
        require("city", &self.city, "City is required");
        require("state", &self.state, "State is required");
        require("country", &self.country, "Country is required");
        require("cardName", &self.card_name, "Cardholder name is required");

        if !looks_like_email(&self.email) {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
        if self.phone.chars().count() < 10 {
            errors.push(FieldError::new(
                "phone",
                "Phone number must be at least 10 digits",
            ));
        }
        if self.zip_code.chars().count() < 5 {
            errors.push(FieldError::new(
                "zipCode",
                "ZIP code must be at least 5 digits",
            ));
        }
        if self.card_number.chars().count() < 16 {
            errors.push(FieldError::new("cardNumber", "Card number must be 16 digits"));
        }
        if !is_expiry(&self.expiry_date) {
            errors.push(FieldError::new(
                "expiryDate",
                "Invalid expiry date (MM/YY)",
            ));
        }
        if self.cvv.chars().count() < 3 {
            errors.push(FieldError::new("cvv", "CVV must be at least 3 digits"));
        }

        ValidationErrors(errors).into_result()
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// `MM/YY` with a month between 01 and 12.
fn is_expiry(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b'/' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let month = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    (1..=12).contains(&month)
}
