//! Payment payload shaping
//!
//! Checkout pages collect more than the payment endpoint needs. Shaping keeps
//! the required fields that are present, adds optional fields only when they
//! carry a value, and drops everything else. Nothing is ever defaulted.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::PaymentConfig;

/// Fields copied whenever present
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &[
    "produtoPublicId",
    "numeroCelular",
    "metodo",
    "valor",
    "nomeCliente",
    "emailCliente",
];

/// Fields copied only when present and non-empty
pub const DEFAULT_OPTIONAL_FIELDS: &[&str] = &["whatsappCliente", "cupomDesconto", "afiliadoCodigo"];

/// Which fields survive shaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadShape {
    required: Vec<String>,
    optional: Vec<String>,
}

impl Default for PayloadShape {
    fn default() -> Self {
        Self::new(
            DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
            DEFAULT_OPTIONAL_FIELDS.iter().map(|f| f.to_string()).collect(),
        )
    }
}

impl PayloadShape {
    pub fn new(required: Vec<String>, optional: Vec<String>) -> Self {
        Self { required, optional }
    }

    pub fn from_config(config: &PaymentConfig) -> Self {
        Self::new(config.required_fields.clone(), config.optional_fields.clone())
    }

    /// Build the trimmed payload; the input is left untouched
    pub fn shape(&self, payload: &Map<String, Value>) -> Map<String, Value> {
        let mut shaped = Map::new();

        for field in &self.required {
            if let Some(value) = payload.get(field) {
                shaped.insert(field.clone(), value.clone());
            }
        }

        for field in &self.optional {
            match payload.get(field) {
                Some(value) if is_filled(value) => {
                    shaped.insert(field.clone(), value.clone());
                }
                _ => {}
            }
        }

        debug!(
            input_fields = payload.len(),
            output_fields = shaped.len(),
            "PayloadShape::shape: shaped payload"
        );
        shaped
    }
}

/// Whether an optional value counts as filled in
///
/// Blank strings, `null`, `false` and zero are treated as not filled.
fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
