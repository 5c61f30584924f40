//! Pure constructors for [`JsonValue`] trees

use super::value::{JsNumber, JsObject, JsonValue};
use crate::Result;

/// `null`
pub fn nul() -> JsonValue {
    JsonValue::Null
}

/// A boolean node
pub fn bool(value: bool) -> JsonValue {
    JsonValue::Bool(value)
}

/// A number node from any integer width
pub fn num(value: impl Into<JsNumber>) -> JsonValue {
    JsonValue::Number(value.into())
}

/// A number node from a float; fails for NaN and infinities
pub fn float(value: f64) -> Result<JsonValue> {
    JsNumber::from_f64(value).map(JsonValue::Number)
}

/// A number node keeping `text` verbatim; fails unless it is a JSON number literal
pub fn num_text(text: &str) -> Result<JsonValue> {
    JsNumber::parse(text).map(JsonValue::Number)
}

/// A string node
pub fn str(value: impl Into<String>) -> JsonValue {
    JsonValue::String(value.into())
}

/// A named field, for [`obj`]
pub fn field(name: impl Into<String>, value: impl Into<JsonValue>) -> (String, JsonValue) {
    (name.into(), value.into())
}

/// An array node in the given order
pub fn arr(items: impl IntoIterator<Item = JsonValue>) -> JsonValue {
    JsonValue::Array(items.into_iter().collect())
}

/// An object node in the given field order.
///
/// Fails with [`crate::CodecError::DuplicateKey`] on the first repeated name.
pub fn obj<K: Into<String>>(fields: impl IntoIterator<Item = (K, JsonValue)>) -> Result<JsonValue> {
    let mut object = JsObject::new();
    for (name, value) in fields {
        object.insert(name, value)?;
    }
    Ok(JsonValue::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_obj_rejects_duplicate() {
        let err = obj([field("a", nul()), field("a", bool(true))]).unwrap_err();
        assert_eq!(err, CodecError::DuplicateKey("a".into()));

        assert!(obj([field("a", nul())]).is_ok());
    }

    #[test]
    fn test_obj_keeps_first_seen_order() {
        let value = obj([
            field("z", num(1u8)),
            field("a", num(-2i64)),
            field("m", str("x")),
        ])
        .unwrap();

        let keys: Vec<&str> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_reports_first_repeat() {
        let err = obj([
            field("a", nul()),
            field("b", nul()),
            field("b", nul()),
            field("a", nul()),
        ])
        .unwrap_err();
        assert_eq!(err, CodecError::DuplicateKey("b".into()));
    }

    #[test]
    fn test_arr_and_numbers() {
        let value = arr([num(1i32), num_text("1.000000000000000000001").unwrap(), float(2.5).unwrap()]);
        let items = value.as_array().unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_number().unwrap().as_str(), "1.000000000000000000001");
        assert_eq!(items[2].as_number().unwrap().as_str(), "2.5");
        assert!(num_text("abc").is_err());
        assert!(float(f64::NAN).is_err());
    }
}
