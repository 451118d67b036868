//! Per-endpoint interpretation of legacy API bodies.
//!
//! # Responsibilities
//! - Structural validators run on 200 responses (quote, reservation create)
//! - Reservation ID extraction in a fixed priority order
//! - Reading the caller's payment options for the payment-link follow-up
//!
//! # Design Decisions
//! - Shape checks are explicit and ordered; the first match wins
//! - A body carrying an application-level `error` key skips structural checks

use serde_json::Value;

use super::error::Malformed;
use crate::upstream::PaymentProvider;

/// Runs on a 200 body; `Err` vetoes the response.
pub type Validator = fn(&Value) -> Result<(), Malformed>;

fn has_application_error(body: &Value) -> bool {
    body.as_object().is_some_and(|map| map.contains_key("error"))
}

/// A quote needs a list under `items` and an object under `places`.
pub fn validate_quote(body: &Value) -> Result<(), Malformed> {
    if has_application_error(body) {
        return Ok(());
    }
    let map = body.as_object().ok_or(Malformed::NotAnObject)?;
    if !map.get("items").is_some_and(Value::is_array) {
        return Err(Malformed::MissingItems);
    }
    if !map.get("places").is_some_and(Value::is_object) {
        return Err(Malformed::MissingPlaces);
    }
    Ok(())
}

/// A created reservation must expose an identifier.
pub fn validate_reservation_create(body: &Value) -> Result<(), Malformed> {
    if !body.is_object() {
        return Err(Malformed::NotAnObject);
    }
    if has_application_error(body) {
        return Ok(());
    }
    extract_reservation_id(body)
        .map(|_| ())
        .ok_or(Malformed::MissingReservationId)
}

/// Reservation ID from `reservation_id`, `id`, `config.id` or `config.code`, in that order.
pub fn extract_reservation_id(body: &Value) -> Option<String> {
    let config = body.get("config");
    [
        body.get("reservation_id"),
        body.get("id"),
        config.and_then(|c| c.get("id")),
        config.and_then(|c| c.get("code")),
    ]
    .into_iter()
    .flatten()
    .find_map(id_to_string)
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// How the caller intends to pay for a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    Online(PaymentProvider),
}

impl PaymentMethod {
    /// Read `payment_method` from a create payload. Matching is case-insensitive;
    /// absent means cash. Unknown values yield `None`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        match payload.get("payment_method") {
            None | Some(Value::Null) => Some(PaymentMethod::Cash),
            Some(Value::String(raw)) => match raw.trim().to_ascii_uppercase().as_str() {
                "CASH" => Some(PaymentMethod::Cash),
                "STRIPE" => Some(PaymentMethod::Online(PaymentProvider::Stripe)),
                "PAYPAL" => Some(PaymentMethod::Online(PaymentProvider::Paypal)),
                _ => None,
            },
            Some(_) => None,
        }
    }
}

/// Strip scheme and host so the legacy API does not prepend its own domain twice.
///
/// `https://shop.example.com/pay/ok?x=1` becomes `/pay/ok?x=1`. Values that are
/// already relative, or do not parse as absolute URLs, are returned unchanged.
pub fn to_relative_path(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) if url.has_host() => {
            let mut relative = url.path().to_string();
            if let Some(query) = url.query() {
                relative.push('?');
                relative.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                relative.push('#');
                relative.push_str(fragment);
            }
            relative
        }
        _ => raw.to_string(),
    }
}
