//! Manifest argument formatting
//!
//! Converts heterogeneous JSON-shaped values into the typed value literals
//! the manifest language understands. The formatter is total over JSON: a
//! value of an odd shape still produces a syntactically valid literal, and
//! a semantically wrong one fails at the network instead of here.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::AddressKind;

/// A typed manifest value literal
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestValue {
    /// Quoted string literal
    String(String),
    /// Ledger address literal
    Address(String),
    /// Decimal literal; holds the decimal text verbatim so source precision
    /// is never rounded through binary floating point
    Decimal(String),
    U8(u8),
    U32(u32),
    U64(u64),
    I64(i64),
    Bool(bool),
    /// Explicit no-value token
    None,
    /// Named bucket reference
    Bucket(String),
    /// Manifest expression, e.g. ENTIRE_WORKTOP
    Expression(String),
    /// Enum literal with a discriminator byte
    Enum {
        discriminator: u8,
        fields: Vec<ManifestValue>,
    },
    Tuple(Vec<ManifestValue>),
    /// Homogeneously typed sequence; `element_type` is inferred from the
    /// first element ("Any" when empty)
    Array {
        element_type: String,
        elements: Vec<ManifestValue>,
    },
    /// String-keyed map; `value_type` inferred from the first value
    Map {
        value_type: String,
        entries: Vec<(String, ManifestValue)>,
    },
}

impl ManifestValue {
    /// Build a decimal literal from a parsed amount
    pub fn decimal(amount: Decimal) -> Self {
        Self::Decimal(amount.normalize().to_string())
    }

    /// The manifest type name of this value, used for container typing
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Address(_) => "Address",
            Self::Decimal(_) => "Decimal",
            Self::U8(_) => "U8",
            Self::U32(_) => "U32",
            Self::U64(_) => "U64",
            Self::I64(_) => "I64",
            Self::Bool(_) => "Bool",
            Self::None => "Enum",
            Self::Bucket(_) => "Bucket",
            Self::Expression(_) => "Expression",
            Self::Enum { .. } => "Enum",
            Self::Tuple(_) => "Tuple",
            Self::Array { .. } => "Array",
            Self::Map { .. } => "Map",
        }
    }

    /// Render this value as manifest text
    pub fn render(&self) -> String {
        match self {
            Self::String(s) => format!("\"{}\"", escape(s)),
            Self::Address(a) => format!("Address(\"{}\")", a),
            Self::Decimal(d) => format!("Decimal(\"{}\")", d),
            Self::U8(n) => format!("{}u8", n),
            Self::U32(n) => format!("{}u32", n),
            Self::U64(n) => format!("{}u64", n),
            Self::I64(n) => format!("{}i64", n),
            Self::Bool(b) => b.to_string(),
            Self::None => "None".to_string(),
            Self::Bucket(name) => format!("Bucket(\"{}\")", name),
            Self::Expression(e) => format!("Expression(\"{}\")", e),
            Self::Enum {
                discriminator,
                fields,
            } => format!("Enum<{}u8>({})", discriminator, render_list(fields)),
            Self::Tuple(fields) => format!("Tuple({})", render_list(fields)),
            Self::Array {
                element_type,
                elements,
            } => format!("Array<{}>({})", element_type, render_list(elements)),
            Self::Map {
                value_type,
                entries,
            } => {
                let body = entries
                    .iter()
                    .map(|(k, v)| format!("\"{}\" => {}", escape(k), v.render()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Map<String, {}>({})", value_type, body)
            }
        }
    }
}

fn render_list(values: &[ManifestValue]) -> String {
    values
        .iter()
        .map(ManifestValue::render)
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Convert a JSON value into a typed manifest value, inferring element and
/// value types recursively. Pure and deterministic; never fails.
pub fn from_json(value: &Value) -> ManifestValue {
    match value {
        Value::Null => ManifestValue::None,
        Value::Bool(b) => ManifestValue::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                if u <= u32::MAX as u64 {
                    ManifestValue::U32(u as u32)
                } else {
                    // Unsigned stays unsigned; casting to i64 would wrap
                    // values above i64::MAX into negative literals
                    ManifestValue::U64(u)
                }
            } else if let Some(i) = n.as_i64() {
                ManifestValue::I64(i)
            } else {
                // Non-integral: keep the source decimal text verbatim,
                // never an f64 arithmetic result
                ManifestValue::Decimal(n.to_string())
            }
        }
        Value::String(s) => {
            if AddressKind::classify(s).is_some() {
                ManifestValue::Address(s.clone())
            } else {
                ManifestValue::String(s.clone())
            }
        }
        Value::Array(items) => {
            let elements: Vec<ManifestValue> = items.iter().map(from_json).collect();
            let element_type = elements
                .first()
                .map(|e| e.type_name())
                .unwrap_or("Any")
                .to_string();
            ManifestValue::Array {
                element_type,
                elements,
            }
        }
        Value::Object(map) => {
            let entries: Vec<(String, ManifestValue)> = map
                .iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect();
            let value_type = entries
                .first()
                .map(|(_, v)| v.type_name())
                .unwrap_or("Any")
                .to_string();
            ManifestValue::Map {
                value_type,
                entries,
            }
        }
    }
}

/// Format a JSON value directly to manifest text
pub fn format_value(value: &Value) -> String {
    from_json(value).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(format_value(&json!("hello")), "\"hello\"");
        assert_eq!(format_value(&json!(42)), "42u32");
        assert_eq!(format_value(&json!(-3)), "-3i64");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(null)), "None");
    }

    #[test]
    fn test_address_detection() {
        let addr = "account_rdx128y6j78mt0aqv6372evz28hrxp8mn06ccddkr7xppc88hyvynvjdwr";
        assert_eq!(format_value(&json!(addr)), format!("Address(\"{}\")", addr));
        // Non-address strings stay quoted strings
        assert_eq!(format_value(&json!("accountant")), "\"accountant\"");
    }

    #[test]
    fn test_non_integral_preserves_decimal_text() {
        assert_eq!(format_value(&json!(1.5)), "Decimal(\"1.5\")");
        assert_eq!(format_value(&json!(0.1)), "Decimal(\"0.1\")");
    }

    #[test]
    fn test_high_precision_decimal_survives_json_parsing() {
        // More significant digits than an f64 can carry; the source text
        // must reach the manifest unchanged
        let value: Value = serde_json::from_str("0.10000000000000000000000001").unwrap();
        assert_eq!(
            format_value(&value),
            "Decimal(\"0.10000000000000000000000001\")"
        );

        let value: Value =
            serde_json::from_str("123456789.123456789123456789").unwrap();
        assert_eq!(
            format_value(&value),
            "Decimal(\"123456789.123456789123456789\")"
        );
    }

    #[test]
    fn test_large_integer_widens_without_wrapping() {
        assert_eq!(format_value(&json!(4294967296u64)), "4294967296u64");
        // Above i64::MAX: must stay unsigned, never wrap negative
        assert_eq!(
            format_value(&json!(u64::MAX)),
            "18446744073709551615u64"
        );
    }

    #[test]
    fn test_array_type_inference() {
        assert_eq!(
            format_value(&json!(["a", "b"])),
            "Array<String>(\"a\", \"b\")"
        );
        assert_eq!(format_value(&json!([1, 2, 3])), "Array<U32>(1u32, 2u32, 3u32)");
        assert_eq!(
            format_value(&json!([1.5, 2.5])),
            "Array<Decimal>(Decimal(\"1.5\"), Decimal(\"2.5\"))"
        );
        assert_eq!(
            format_value(&json!([[1], [2]])),
            "Array<Array>(Array<U32>(1u32), Array<U32>(2u32))"
        );
    }

    #[test]
    fn test_empty_array_placeholder_type() {
        assert_eq!(format_value(&json!([])), "Array<Any>()");
    }

    #[test]
    fn test_object_becomes_string_keyed_map() {
        assert_eq!(
            format_value(&json!({"kind": "fixed", "max": 5})),
            "Map<String, String>(\"kind\" => \"fixed\", \"max\" => 5u32)"
        );
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(format_value(&json!("with \"quotes\"")), "\"with \\\"quotes\\\"\"");
    }

    #[test]
    fn test_manifest_value_decimal_normalizes_trailing_zeros() {
        use std::str::FromStr;
        let d = Decimal::from_str("500000.000").unwrap();
        assert_eq!(ManifestValue::decimal(d).render(), "Decimal(\"500000\")");
    }

    proptest! {
        // Formatting is deterministic and total over arbitrary JSON
        #[test]
        fn prop_format_is_deterministic(s in "\\PC*", n in any::<i64>(), b in any::<bool>()) {
            let value = json!({"s": s, "n": n, "b": b, "list": [s.clone()]});
            let first = format_value(&value);
            let second = format_value(&value);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_integers_render_with_type_suffix(n in 0u32..u32::MAX) {
            let rendered = format_value(&json!(n));
            prop_assert_eq!(rendered, format!("{}u32", n));
        }
    }
}
