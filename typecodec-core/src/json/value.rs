use crate::error::CodecError;
use crate::types::TypeDescriptor;
use crate::Result;
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;
use std::str::FromStr;

/// A JSON number kept in its exact textual form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsNumber(String);

impl JsNumber {
    /// Validate `text` as a JSON number literal and keep it verbatim
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::Number::from_str(text)
            .map(|_| Self(text.to_string()))
            .map_err(|e| CodecError::InvalidValue(format!("{:?} is not a JSON number: {}", text, e)))
    }

    /// A finite float in its shortest round-tripping form
    pub fn from_f64(value: f64) -> Result<Self> {
        serde_json::Number::from_f64(value)
            .map(|n| Self(n.to_string()))
            .ok_or_else(|| CodecError::InvalidValue(format!("{} is not a finite number", value)))
    }

    /// The exact text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value as `i64`, if it is an integer in range
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// The value as `u64`, if it is a non-negative integer in range
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// The value as the nearest `f64`
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for JsNumber {
                fn from(value: $t) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl TryFrom<f64> for JsNumber {
    type Error = CodecError;

    fn try_from(value: f64) -> Result<Self> {
        Self::from_f64(value)
    }
}

impl TryFrom<f32> for JsNumber {
    type Error = CodecError;

    fn try_from(value: f32) -> Result<Self> {
        // Through the decimal text, so 0.1f32 stays "0.1"
        let text = value.to_string();
        if value.is_finite() {
            Self::parse(&text)
        } else {
            Err(CodecError::InvalidValue(format!("{} is not a finite number", text)))
        }
    }
}

impl fmt::Display for JsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered JSON object with unique field names.
///
/// Equality is order-sensitive.
#[derive(Debug, Clone, Default)]
pub struct JsObject {
    fields: IndexMap<String, JsonValue>,
}

impl JsObject {
    /// Create an empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, failing if the name is already present
    pub fn insert(&mut self, name: impl Into<String>, value: JsonValue) -> Result<()> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(CodecError::DuplicateKey(name));
        }
        self.fields.insert(name, value);
        Ok(())
    }

    /// Field by name
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the object has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len() && self.fields.iter().eq(other.fields.iter())
    }
}

/// In-memory JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// `null`
    Null,
    /// `true` or `false`
    Bool(bool),
    /// A number in its exact textual form
    Number(JsNumber),
    /// A string
    String(String),
    /// An ordered sequence of values
    Array(Vec<JsonValue>),
    /// An ordered mapping with unique names
    Object(JsObject),
}

impl JsonValue {
    /// Descriptor of this node's variant, each of which is-a `json.value`
    pub fn descriptor(&self) -> TypeDescriptor {
        match self {
            JsonValue::Null => TypeDescriptor::JSON_NULL,
            JsonValue::Bool(_) => TypeDescriptor::JSON_BOOL,
            JsonValue::Number(_) => TypeDescriptor::JSON_NUMBER,
            JsonValue::String(_) => TypeDescriptor::JSON_STRING,
            JsonValue::Array(_) => TypeDescriptor::JSON_ARRAY,
            JsonValue::Object(_) => TypeDescriptor::JSON_OBJECT,
        }
    }

    /// Check for `null`
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    /// The boolean, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is one
    pub fn as_number(&self) -> Option<&JsNumber> {
        match self {
            JsonValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an array
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The fields, if this is an object
    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsonValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Field of an object node
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|obj| obj.get(name))
    }

    /// Convert to a `serde_json` value; number text is carried over verbatim
    pub fn to_serde(&self) -> Result<serde_json::Value> {
        Ok(match self {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(*b),
            JsonValue::Number(n) => serde_json::Value::Number(
                serde_json::Number::from_str(n.as_str())
                    .map_err(|e| CodecError::InvalidValue(e.to_string()))?,
            ),
            JsonValue::String(s) => serde_json::Value::String(s.clone()),
            JsonValue::Array(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(JsonValue::to_serde)
                    .collect::<Result<Vec<_>>>()?,
            ),
            JsonValue::Object(obj) => {
                let mut map = serde_json::Map::new();
                for (name, value) in obj.iter() {
                    map.insert(name.to_string(), value.to_serde()?);
                }
                serde_json::Value::Object(map)
            }
        })
    }
}

/// A `serde_json::Map` has unique keys already, so no repeat can reach here.
/// Parse text through [`Deserialize`] to have repeated keys rejected.
impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => JsonValue::Number(JsNumber(n.to_string())),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(JsObject {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            }),
        }
    }
}

/// Key serde_json's `arbitrary_precision` mode uses to hand a number's text to `visit_map`
const SERDE_JSON_NUMBER_KEY: &str = "$serde_json::private::Number";

/// Repeated object keys fail with [`CodecError::DuplicateKey`]
impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct JsonValueVisitor;

        impl<'de> Visitor<'de> for JsonValueVisitor {
            type Value = JsonValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a JSON value")
            }

            fn visit_unit<E>(self) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::Null)
            }

            fn visit_none<E>(self) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> std::result::Result<JsonValue, D::Error>
            where
                D: Deserializer<'de>,
            {
                JsonValue::deserialize(deserializer)
            }

            fn visit_bool<E>(self, v: bool) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::Number(v.into()))
            }

            fn visit_u64<E>(self, v: u64) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::Number(v.into()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<JsonValue, E> {
                JsNumber::from_f64(v).map(JsonValue::Number).map_err(E::custom)
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::String(v.to_string()))
            }

            fn visit_string<E>(self, v: String) -> std::result::Result<JsonValue, E> {
                Ok(JsonValue::String(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<JsonValue, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(JsonValue::Array(items))
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<JsonValue, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut obj = JsObject::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == SERDE_JSON_NUMBER_KEY && obj.is_empty() {
                        let text: String = map.next_value()?;
                        return JsNumber::parse(&text)
                            .map(JsonValue::Number)
                            .map_err(de::Error::custom);
                    }
                    let value = map.next_value()?;
                    obj.insert(key, value).map_err(de::Error::custom)?;
                }
                Ok(JsonValue::Object(obj))
            }
        }

        deserializer.deserialize_any(JsonValueVisitor)
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<JsNumber> for JsonValue {
    fn from(value: JsNumber) -> Self {
        JsonValue::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text_is_kept() {
        let n = JsNumber::parse("1.50").unwrap();
        assert_eq!(n.as_str(), "1.50");
        assert_eq!(n.as_f64(), Some(1.5));
        assert_eq!(n.as_i64(), None);

        assert_eq!(JsNumber::from(-7i8).as_i64(), Some(-7));
        assert_eq!(JsNumber::from(u64::MAX).as_u64(), Some(u64::MAX));
    }

    #[test]
    fn test_number_rejects_non_json() {
        for bad in ["", "01", "1.", "+1", "NaN", "0x10", "1 "] {
            assert!(JsNumber::parse(bad).is_err(), "{:?} accepted", bad);
        }
        assert!(JsNumber::from_f64(f64::INFINITY).is_err());
        assert!(JsNumber::try_from(f32::NAN).is_err());
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(JsNumber::from_f64(0.5).unwrap().as_str(), "0.5");
        assert_eq!(JsNumber::try_from(0.1f32).unwrap().as_str(), "0.1");
    }

    #[test]
    fn test_object_equality_is_ordered() {
        let mut a = JsObject::new();
        a.insert("x", JsonValue::Null).unwrap();
        a.insert("y", JsonValue::Bool(true)).unwrap();

        let mut b = JsObject::new();
        b.insert("y", JsonValue::Bool(true)).unwrap();
        b.insert("x", JsonValue::Null).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(
            a.insert("x", JsonValue::Null),
            Err(CodecError::DuplicateKey("x".into()))
        );
    }

    #[test]
    fn test_parse_rejects_repeated_key() {
        let err = serde_json::from_str::<JsonValue>(r#"{"a":1,"a":2}"#).unwrap_err();
        assert!(err.to_string().contains("Duplicate key: a"), "{}", err);

        let nested = serde_json::from_str::<JsonValue>(r#"[{"x":{"b":null,"b":true}}]"#);
        assert!(nested.is_err());

        let ok: JsonValue = serde_json::from_str(r#"{"a":1,"b":{"a":2}}"#).unwrap();
        assert_eq!(ok.get("b").and_then(|b| b.get("a")).and_then(JsonValue::as_number).map(JsNumber::as_str), Some("2"));
    }

    #[test]
    fn test_parse_keeps_number_text() {
        for text in ["1.50", "1e2", "1e400", "-0", "100000000000000000000000", "2.5E-3"] {
            let value: JsonValue = serde_json::from_str(text).unwrap();
            assert_eq!(value.as_number().map(JsNumber::as_str), Some(text));
            assert_eq!(value.to_serde().unwrap().to_string(), text);
        }

        assert_eq!(JsNumber::parse("1e400").unwrap().as_str(), "1e400");
        assert_eq!(JsNumber::parse("1e2").unwrap().as_f64(), Some(100.0));
    }

    #[test]
    fn test_serde_conversion_keeps_order() {
        let source: serde_json::Value =
            serde_json::from_str(r#"{"b":1,"a":[true,null,"s"],"c":{"d":2.5}}"#).unwrap();
        let value = JsonValue::from(source.clone());

        let keys: Vec<&str> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(value.get("c").and_then(|c| c.get("d")).and_then(JsonValue::as_number).map(JsNumber::as_str), Some("2.5"));
        assert_eq!(value.to_serde().unwrap(), source);
    }
}
