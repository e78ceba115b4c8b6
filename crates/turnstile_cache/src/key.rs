//! Cache keys derived from an operation name and its arguments.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use turnstile_error::{CacheError, CacheErrorKind};

/// Address of a cached value: the operation plus its canonical arguments.
///
/// Arguments are serialized to JSON with object keys sorted at every depth,
/// so structurally equal arguments always produce the same key no matter
/// how their maps were built.
///
/// Displays as `operation:arguments`, e.g. `getEvent:["42"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    operation: String,
    args: String,
}

impl CacheKey {
    /// Build the key for `operation` called with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheErrorKind::Serialization`] if `args` cannot be
    /// represented as JSON (for example a map with non-string keys).
    ///
    /// # Example
    ///
    /// ```
    /// use turnstile_cache::CacheKey;
    ///
    /// let key = CacheKey::new("getPrice", &[42]).unwrap();
    /// assert_eq!(key.to_string(), "getPrice:[42]");
    /// ```
    pub fn new<A: Serialize + ?Sized>(operation: &str, args: &A) -> Result<Self, CacheError> {
        let value = serde_json::to_value(args).map_err(|e| {
            CacheError::new(CacheErrorKind::Serialization {
                operation: operation.to_string(),
                message: e.to_string(),
            })
        })?;

        let mut canonical = String::new();
        write_canonical(&value, &mut canonical);

        Ok(Self {
            operation: operation.to_string(),
            args: canonical,
        })
    }

    /// The operation (throttle bucket) this key belongs to.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The canonical JSON rendering of the arguments.
    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.args)
    }
}

/// Append `value` as compact JSON with object keys in sorted order.
fn write_canonical(value: &JsonValue, out: &mut String) {
    match value {
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        JsonValue::Object(map) => {
            let mut fields: Vec<_> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Strings always encode
                out.push_str(&JsonValue::String(name.clone()).to_string());
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn object_keys_are_sorted_at_every_depth() {
        let a = json!([{"b": 1, "a": {"y": true, "x": null}}]);
        let b = json!([{"a": {"x": null, "y": true}, "b": 1}]);

        let ka = CacheKey::new("getTicketCategory", &a).unwrap();
        let kb = CacheKey::new("getTicketCategory", &b).unwrap();

        assert_eq!(ka, kb);
        assert_eq!(ka.args(), r#"[{"a":{"x":null,"y":true},"b":1}]"#);
    }

    #[test]
    fn hash_map_arguments_are_stable() {
        let mut first = HashMap::new();
        let mut second = HashMap::new();
        for i in 0..16 {
            first.insert(format!("k{}", i), i);
        }
        for i in (0..16).rev() {
            second.insert(format!("k{}", i), i);
        }

        assert_eq!(
            CacheKey::new("op", &first).unwrap(),
            CacheKey::new("op", &second).unwrap()
        );
    }

    #[test]
    fn display_joins_operation_and_arguments() {
        let key = CacheKey::new("getEvent", &["42"]).unwrap();
        assert_eq!(key.to_string(), r#"getEvent:["42"]"#);
        assert_eq!(key.operation(), "getEvent");
    }

    #[test]
    fn empty_argument_list() {
        let args: [u8; 0] = [];
        let key = CacheKey::new("getEventsCount", &args).unwrap();
        assert_eq!(key.to_string(), "getEventsCount:[]");
    }

    #[test]
    fn non_string_map_keys_fail() {
        let mut args = HashMap::new();
        args.insert(vec![1u8], "x");

        let err = CacheKey::new("op", &args).unwrap_err();
        assert!(matches!(err.kind(), CacheErrorKind::Serialization { .. }));
    }
}
