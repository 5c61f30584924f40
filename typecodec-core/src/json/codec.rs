//! Codec for [`JsonValue`] trees
//!
//! Scalars are written as bare tokens. Arrays open an `arr` element holding
//! one element-label wrapper per item; objects open an `obj` element holding
//! one element per field, labelled with the field name.

use super::build;
use super::value::{JsNumber, JsonValue};
use crate::codec::{Codec, CodecContext};
use crate::constants::names;
use crate::error::CodecError;
use crate::io::{Input, Output, TokenKind};
use crate::registry::RegistryBuilder;
use crate::types::TypeDescriptor;
use crate::Result;

/// Label of the element holding an array's items
pub const ARRAY_LABEL: &str = "arr";

/// Label of the element holding an object's fields
pub const OBJECT_LABEL: &str = "obj";

static JSON_VALUE: TypeDescriptor = TypeDescriptor::JSON_VALUE;

/// Codec for `json.value`; the variant descriptors reach it through the is-a table
#[derive(Debug, Clone, Default)]
pub struct JsonValueCodec;

impl Codec<JsonValue> for JsonValueCodec {
    fn descriptor(&self) -> &TypeDescriptor {
        &JSON_VALUE
    }

    fn encode(&self, value: &JsonValue, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        match value {
            JsonValue::Null => out.write_null(),
            JsonValue::Bool(b) => out.write_bool(*b),
            JsonValue::Number(n) => out.write_number(n.as_str()),
            JsonValue::String(s) => out.write_str(s),
            JsonValue::Array(items) => {
                let elem = &cx.config().elem_name;
                out.start_element(ARRAY_LABEL)?;
                for item in items {
                    out.start_element(elem)?;
                    cx.nested(|cx| self.encode(item, out, cx))?;
                    out.end_element()?;
                }
                out.end_element()
            }
            JsonValue::Object(fields) => {
                out.start_element(OBJECT_LABEL)?;
                for (name, field) in fields.iter() {
                    out.start_element(name)?;
                    cx.nested(|cx| self.encode(field, out, cx))?;
                    out.end_element()?;
                }
                out.end_element()
            }
        }
    }

    fn runtime_descriptor(&self, value: &JsonValue) -> Option<TypeDescriptor> {
        Some(value.descriptor())
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<JsonValue> {
        match input.peek_kind() {
            Some(TokenKind::Bool) => input.read_bool().map(JsonValue::Bool),
            Some(TokenKind::Number) => {
                let text = input.read_number()?;
                JsNumber::parse(&text).map(JsonValue::Number)
            }
            Some(TokenKind::String) => input.read_str().map(JsonValue::String),
            Some(TokenKind::StartElement) => {
                let label = input.start_element(None)?;
                let value = match label.as_str() {
                    ARRAY_LABEL => self.decode_array(input, cx)?,
                    OBJECT_LABEL => self.decode_object(input, cx)?,
                    _ => {
                        return Err(CodecError::UnexpectedLabel {
                            expected: format!("{} or {}", ARRAY_LABEL, OBJECT_LABEL),
                            found: label,
                        })
                    }
                };
                input.end_element()?;
                Ok(value)
            }
            // Null, or a missing value reported as one
            _ => input.read_null().map(|()| JsonValue::Null),
        }
    }
}

impl JsonValueCodec {
    fn decode_array(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<JsonValue> {
        let elem = &cx.config().elem_name;
        let mut items = Vec::new();

        while input.peek_kind() == Some(TokenKind::StartElement) {
            input.start_element(Some(elem))?;
            items.push(cx.nested(|cx| self.decode(input, cx))?);
            input.end_element()?;
        }

        Ok(build::arr(items))
    }

    fn decode_object(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<JsonValue> {
        let mut fields = Vec::new();

        while input.peek_kind() == Some(TokenKind::StartElement) {
            let name = input.start_element(None)?;
            let value = cx.nested(|cx| self.decode(input, cx))?;
            input.end_element()?;
            fields.push((name, value));
        }

        build::obj(fields)
    }
}

/// Register the JSON value codec and the is-a edges of its variant descriptors
pub fn register_json(builder: RegistryBuilder) -> RegistryBuilder {
    [
        names::JSON_NULL,
        names::JSON_BOOL,
        names::JSON_NUMBER,
        names::JSON_STRING,
        names::JSON_ARRAY,
        names::JSON_OBJECT,
    ]
    .into_iter()
    .fold(builder.register(JsonValueCodec), |builder, variant| {
        builder.declare_subtype(variant, names::JSON_VALUE)
    })
}
