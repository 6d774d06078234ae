//! Validation of expense creation payloads.
//!
//! Operates on raw JSON so that type mismatches surface as field errors
//! instead of opaque deserialization failures. All violations are collected
//! before returning; the caller decides the user-facing response.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::parse_expense_date;

/// A creation payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpenseInput {
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: String,
    pub idempotency_key: Option<String>,
}

/// Field-level validation errors, keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ValidationErrors {
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// Validate an arbitrary JSON payload against the creation schema.
pub fn validate(payload: &Value) -> Result<ValidExpenseInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let amount = validate_amount(payload.get("amount"), &mut errors);
    let category = validate_non_empty_string(payload.get("category"), "category", &mut errors);
    let description =
        validate_non_empty_string(payload.get("description"), "description", &mut errors);
    let date = validate_date(payload.get("date"), &mut errors);
    let idempotency_key = validate_idempotency_key(payload.get("idempotencyKey"), &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    // All fields are Some when no errors were recorded
    Ok(ValidExpenseInput {
        amount: amount.unwrap_or_default(),
        category: category.unwrap_or_default(),
        description: description.unwrap_or_default(),
        date: date.unwrap_or_default(),
        idempotency_key,
    })
}

fn validate_amount(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<f64> {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        // Numeric strings are coerced, anything else is rejected
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(a) if a > 0.0 => Some(a),
        Some(_) => {
            errors.push("amount", "Amount must be greater than zero");
            None
        }
        None => {
            errors.push("amount", "Amount must be a number");
            None
        }
    }
}

fn validate_non_empty_string(
    value: Option<&Value>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.push(field, format!("{} must not be empty", capitalize(field)));
            None
        }
        _ => {
            errors.push(field, format!("{} must be a string", capitalize(field)));
            None
        }
    }
}

fn validate_date(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            if parse_expense_date(s).is_some() {
                Some(s.clone())
            } else {
                errors.push("date", "Invalid date");
                None
            }
        }
        _ => {
            errors.push("date", "Date must be a string");
            None
        }
    }
}

fn validate_idempotency_key(
    value: Option<&Value>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push("idempotencyKey", "Idempotency key must be a string");
            None
        }
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
