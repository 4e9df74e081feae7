//! Deterministic request fingerprints
//!
//! Two submissions share an in-flight call only when their fingerprints are
//! equal, so the body encoding must not depend on map iteration order. JSON
//! bodies are written with object keys sorted at every level, and numbers with
//! an integral value are written as integers (`100.0` and `100` are the same
//! amount).

use std::fmt;

use serde_json::{Number, Value};

use super::DedupError;
use crate::transport::RequestBody;

/// How the body was supplied; bodies of different kinds never share a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Empty,
    Text,
    Json,
}

/// Dedup key for one logical submission: URL plus canonical body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    url: String,
    kind: BodyKind,
    body: String,
}

impl Fingerprint {
    /// Build the fingerprint for a request
    pub fn new(url: &str, body: Option<&RequestBody>) -> Result<Self, DedupError> {
        let (kind, body) = match body {
            None => (BodyKind::Empty, String::new()),
            Some(RequestBody::Text(text)) => (BodyKind::Text, text.clone()),
            Some(RequestBody::Json(value)) => (BodyKind::Json, canonical_json(value)?),
        };
        Ok(Self {
            url: url.to_string(),
            kind,
            body,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Canonical body encoding this fingerprint was built from
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.url, self.body)
    }
}

/// Serialize a JSON value with sorted object keys and no whitespace
pub fn canonical_json(value: &Value) -> Result<String, DedupError> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), DedupError> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(item, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Number(n) => out.push_str(&canonical_number(n)),
        leaf => out.push_str(&serde_json::to_string(leaf)?),
    }
    Ok(())
}

// 2^63 and 2^64, both exact in f64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
const U64_BOUND: f64 = 18_446_744_073_709_551_616.0;

/// Integral floats that fit an integer type are written as that integer
fn canonical_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 => {
            if (-I64_BOUND..I64_BOUND).contains(&f) {
                (f as i64).to_string()
            } else if (0.0..U64_BOUND).contains(&f) {
                (f as u64).to_string()
            } else {
                n.to_string()
            }
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let value: Value = serde_json::from_str(r#"{"method":"mpesa","amount":100,"meta":{"z":1,"a":[{"y":2,"b":3}]}}"#)
            .unwrap();
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"amount":100,"meta":{"a":[{"b":3,"y":2}],"z":1},"method":"mpesa"}"#
        );
    }

    #[test]
    fn test_key_order_does_not_change_fingerprint() {
        let a: Value = serde_json::from_str(r#"{"amount":100,"method":"mpesa"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"method":"mpesa","amount":100}"#).unwrap();

        let fa = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(a))).unwrap();
        let fb = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(b))).unwrap();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_url_and_body_do_not_bleed_together() {
        let a = Fingerprint::new("/api/pagar1", Some(&RequestBody::Text("23".to_string()))).unwrap();
        let b = Fingerprint::new("/api/pagar", Some(&RequestBody::Text("123".to_string()))).unwrap();
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_text_body_is_verbatim() {
        let fp = Fingerprint::new("/api/pagar", Some(&RequestBody::Text("{\"b\":1, \"a\":2}".to_string()))).unwrap();
        assert_eq!(fp.body(), "{\"b\":1, \"a\":2}");
    }

    #[test]
    fn test_missing_body_is_empty() {
        let fp = Fingerprint::new("/api/pagar", None).unwrap();
        assert_eq!(fp.body(), "");
        assert_eq!(fp.url(), "/api/pagar");

        let empty_json = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(json!({})))).unwrap();
        assert_ne!(fp, empty_json);
    }

    #[test]
    fn test_distinct_amounts_distinct_fingerprints() {
        let a = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(json!({"amount": 100})))).unwrap();
        let b = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(json!({"amount": 200})))).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_integral_float_matches_integer() {
        assert_eq!(canonical_json(&json!({"amount": 100.0})).unwrap(), r#"{"amount":100}"#);
        assert_eq!(canonical_json(&json!([-0.0, 1e3, 2.5])).unwrap(), "[0,1000,2.5]");

        let a = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(json!({"amount": 100})))).unwrap();
        let b = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(json!({"amount": 100.0})))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_large_integral_floats() {
        assert_eq!(canonical_json(&json!(1e19)).unwrap(), "10000000000000000000");
        assert_eq!(canonical_json(&json!(1e300)).unwrap(), serde_json::to_string(&json!(1e300)).unwrap());
        assert_eq!(canonical_json(&json!(u64::MAX)).unwrap(), u64::MAX.to_string());
    }

    #[test]
    fn test_text_and_json_bodies_never_collide() {
        let json = Fingerprint::new("/api/pagar", Some(&RequestBody::Json(json!({"amount": 100})))).unwrap();
        let text = Fingerprint::new("/api/pagar", Some(&RequestBody::Text(r#"{"amount":100}"#.to_string()))).unwrap();
        assert_eq!(json.body(), text.body());
        assert_eq!(json.kind(), BodyKind::Json);
        assert_eq!(text.kind(), BodyKind::Text);
        assert_ne!(json, text);

        let none = Fingerprint::new("/api/pagar", None).unwrap();
        let empty_text = Fingerprint::new("/api/pagar", Some(&RequestBody::Text(String::new()))).unwrap();
        assert_ne!(none, empty_text);
    }

    proptest! {
        #[test]
        fn prop_integral_float_and_integer_agree(amount in -1_000_000_000i64..1_000_000_000) {
            let int = json!({"amount": amount});
            let float = json!({"amount": amount as f64});
            prop_assert_eq!(canonical_json(&int).unwrap(), canonical_json(&float).unwrap());
        }

        #[test]
        fn prop_field_order_is_irrelevant(fields in proptest::collection::btree_map("[a-zA-Z]{1,8}", any::<i64>(), 0..8)) {
            let forward: Vec<String> = fields.iter().map(|(k, v)| format!("\"{}\":{}", k, v)).collect();
            let reversed: Vec<String> = forward.iter().rev().cloned().collect();

            let a: Value = serde_json::from_str(&format!("{{{}}}", forward.join(","))).unwrap();
            let b: Value = serde_json::from_str(&format!("{{{}}}", reversed.join(","))).unwrap();

            prop_assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
        }

        #[test]
        fn prop_canonical_round_trips_to_same_value(fields in proptest::collection::btree_map("[a-z]{1,6}", "[ -~]{0,12}", 0..6)) {
            let value = serde_json::to_value(&fields).unwrap();
            let canonical = canonical_json(&value).unwrap();
            let parsed: Value = serde_json::from_str(&canonical).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
