use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;

/// A supplier quote as submitted. The body is opaque (price, lead time,
/// payment terms, notes...); the only structural requirement is that it is a
/// JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierQuote(Map<String, Value>);

impl SupplierQuote {
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(DomainError::InvalidQuote(format!(
                "quote must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::SupplierQuote;
    use crate::errors::DomainError;

    #[test]
    fn accepts_structured_record_as_is() {
        let quote = SupplierQuote::from_value(json!({
            "supplier": "Acme Tubes",
            "unit_price": 41.5,
            "lead_time_days": 28,
        }))
        .expect("object quote");

        assert_eq!(quote.get("supplier"), Some(&json!("Acme Tubes")));
        assert_eq!(quote.to_value()["lead_time_days"], json!(28));
    }

    #[test]
    fn rejects_non_object_payloads() {
        let error = SupplierQuote::from_value(json!(["not", "a", "record"]))
            .expect_err("array should be rejected");
        assert!(matches!(error, DomainError::InvalidQuote(ref message) if message.contains("array")));
    }
}
