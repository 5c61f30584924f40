//! Polymorphic values whose static type is only known as `object`
//!
//! A [`Dynamic`] pairs a value with the descriptor it was encoded or decoded
//! as. [`DynamicCodec`] is registered under the top type, so any lookup that
//! falls all the way back to `object` ends here. On the wire a dynamic value
//! is wrapped in the configured type element, which carries the runtime
//! descriptor ahead of the value:
//!
//! `<@type> "map<string, i32>" value-tokens </@type>`

use crate::codec::{Codec, CodecContext, CodecValue, ErasedCodec};
use crate::error::CodecError;
use crate::io::{Input, Output};
use crate::types::TypeDescriptor;
use crate::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

/// A value of any registered type together with its runtime descriptor
#[derive(Clone)]
pub struct Dynamic {
    descriptor: TypeDescriptor,
    value: Arc<dyn Any + Send + Sync>,
    eq: fn(&dyn Any, &dyn Any) -> bool,
    debug: fn(&dyn Any, &mut fmt::Formatter<'_>) -> fmt::Result,
}

fn eq_as<T: CodecValue>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn debug_as<T: CodecValue>(value: &dyn Any, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str("<?>"),
    }
}

impl Dynamic {
    /// Wrap `value` as an instance of `descriptor`
    pub fn new<T: CodecValue>(descriptor: TypeDescriptor, value: T) -> Self {
        Self {
            descriptor,
            value: Arc::new(value),
            eq: eq_as::<T>,
            debug: debug_as::<T>,
        }
    }

    /// Runtime descriptor of the value
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The value, if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// The value as `&dyn Any`
    pub fn value(&self) -> &dyn Any {
        &*self.value
    }

    /// Same value under another descriptor
    pub(crate) fn retag(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && (self.eq)(self.value(), other.value())
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dynamic<{}>(", self.descriptor)?;
        (self.debug)(self.value(), f)?;
        f.write_str(")")
    }
}

static OBJECT: TypeDescriptor = TypeDescriptor::OBJECT;

/// Codec for a runtime type; landing back on the top type would recurse forever
fn concrete_codec(cx: &CodecContext<'_>, desc: &TypeDescriptor) -> Result<Arc<dyn ErasedCodec>> {
    let codec = cx.registry().erased_codec_for(desc)?;
    if codec.descriptor().is_top() {
        return Err(CodecError::resolution(
            desc,
            "a dynamic value needs a concrete runtime type",
        ));
    }
    Ok(codec)
}

/// A value decoded or encoded through an ancestor's codec must still be an instance of its tag
fn check_runtime_type(
    cx: &CodecContext<'_>,
    codec: &dyn ErasedCodec,
    tag: &TypeDescriptor,
    value: &dyn Any,
) -> Result<()> {
    if let Some(actual) = codec.runtime_descriptor(value) {
        if !cx.registry().hierarchy().is_a(actual.name(), tag.name()) {
            return Err(CodecError::InvalidValue(format!(
                "value tagged {} is a {}",
                tag, actual
            )));
        }
    }
    Ok(())
}

/// Codec for the top type
#[derive(Debug, Clone, Default)]
pub struct DynamicCodec;

impl Codec<Dynamic> for DynamicCodec {
    fn descriptor(&self) -> &TypeDescriptor {
        &OBJECT
    }

    fn encode(&self, value: &Dynamic, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        let config = cx.config();
        let codec = concrete_codec(cx, value.descriptor())?;
        check_runtime_type(cx, codec.as_ref(), value.descriptor(), value.value())?;

        out.start_element(&config.type_attr_name)?;
        out.write_str(&value.descriptor().to_string())?;
        cx.nested(|cx| codec.encode_any(value.value(), out, cx))?;
        out.end_element()
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<Dynamic> {
        let config = cx.config();

        input.start_element(Some(&config.type_attr_name))?;
        let name = input.read_str()?;
        let descriptor = match cx.registry().descriptor_named(&name) {
            Some(desc) => desc.clone(),
            None => name.parse::<TypeDescriptor>()?,
        };
        let codec = concrete_codec(cx, &descriptor)?;

        #[cfg(feature = "logging")]
        if codec.descriptor() != &descriptor {
            trace!("Decoding dynamic {} with codec for {}", descriptor, codec.descriptor());
        }

        let value = cx.nested(|cx| codec.decode_dynamic(input, cx))?;
        input.end_element()?;
        check_runtime_type(cx, codec.as_ref(), &descriptor, value.value())?;

        Ok(value.retag(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Token, TokenKind};
    use crate::json::JsonValue;
    use crate::registry::RegistryBuilder;

    #[test]
    fn test_dynamic_equality() {
        let a = Dynamic::new(TypeDescriptor::I32, 5i32);
        let b = Dynamic::new(TypeDescriptor::I32, 5i32);
        let c = Dynamic::new(TypeDescriptor::I64, 5i64);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<i32>(), Some(&5));
        assert_eq!(format!("{:?}", a), "Dynamic<i32>(5)");
    }

    #[test]
    fn test_dynamic_token_shape() {
        let registry = RegistryBuilder::new().build();
        let value = Dynamic::new(TypeDescriptor::STRING, "hi".to_string());

        let tokens = registry.to_tokens(&TypeDescriptor::OBJECT, &value).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::StartElement("@type".into()),
                Token::String("string".into()),
                Token::String("hi".into()),
                Token::EndElement,
            ]
        );

        let back: Dynamic = registry.from_tokens(&TypeDescriptor::OBJECT, &tokens).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_dynamic_tag_must_match_value() {
        let registry = RegistryBuilder::new().build();
        let value = Dynamic::new(TypeDescriptor::JSON_VALUE, JsonValue::Bool(true));

        let mut tokens = registry.to_tokens(&TypeDescriptor::OBJECT, &value).unwrap();
        tokens[1] = Token::String("json.number".into());

        let err = registry
            .from_tokens::<Dynamic>(&TypeDescriptor::OBJECT, &tokens)
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidValue(_)), "{:?}", err);

        let mislabelled = Dynamic::new(TypeDescriptor::JSON_BOOL, JsonValue::String("x".into()));
        assert!(registry
            .to_tokens(&TypeDescriptor::OBJECT, &mislabelled)
            .is_err());
    }

    #[test]
    fn test_dynamic_decodes_through_ancestor() {
        let registry = RegistryBuilder::new().build();
        let value = Dynamic::new(TypeDescriptor::JSON_VALUE, JsonValue::Bool(true));

        let mut tokens = registry.to_tokens(&TypeDescriptor::OBJECT, &value).unwrap();
        tokens[1] = Token::String("json.bool".into());

        let back: Dynamic = registry.from_tokens(&TypeDescriptor::OBJECT, &tokens).unwrap();
        assert_eq!(back.descriptor(), &TypeDescriptor::JSON_BOOL);
        assert_eq!(back.downcast_ref::<JsonValue>(), Some(&JsonValue::Bool(true)));
    }

    #[test]
    fn test_dynamic_rejects_unknown_or_top_type() {
        let registry = RegistryBuilder::bare().register(DynamicCodec).build();

        let unknown = vec![
            Token::StartElement("@type".into()),
            Token::String("Missing".into()),
            Token::Null,
            Token::EndElement,
        ];
        let err = registry
            .from_tokens::<Dynamic>(&TypeDescriptor::OBJECT, &unknown)
            .unwrap_err();
        assert!(matches!(err, CodecError::Resolution { .. }));

        let top = vec![
            Token::StartElement("@type".into()),
            Token::String("object".into()),
            Token::EndElement,
        ];
        let err = registry
            .from_tokens::<Dynamic>(&TypeDescriptor::OBJECT, &top)
            .unwrap_err();
        assert!(matches!(err, CodecError::Resolution { .. }));
    }

    #[test]
    fn test_dynamic_requires_type_element() {
        let registry = RegistryBuilder::new().build();
        let err = registry
            .from_tokens::<Dynamic>(&TypeDescriptor::OBJECT, &[Token::Number("1".into())])
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::malformed(TokenKind::StartElement, Some(TokenKind::Number))
        );
    }
}
