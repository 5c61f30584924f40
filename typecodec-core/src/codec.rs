//! The codec contract, call context and primitive codecs

use crate::config::CodecConfig;
use crate::dynamic::Dynamic;
use crate::error::CodecError;
use crate::io::{Input, Output};
use crate::registry::CodecRegistry;
use crate::types::TypeDescriptor;
use crate::Result;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

/// Values a codec can be registered for.
///
/// Blanket-implemented; the bounds let a decoded value travel as a
/// [`Dynamic`] when its static type is only known as the top type.
pub trait CodecValue: Any + Send + Sync + PartialEq + fmt::Debug {}

impl<T> CodecValue for T where T: Any + Send + Sync + PartialEq + fmt::Debug {}

/// Paired encode/decode capability for one type.
///
/// Codecs hold no per-call state and are shared across threads behind
/// `Arc`; everything call-specific lives in the [`CodecContext`] and the
/// token stream passed in.
pub trait Codec<T>: Send + Sync {
    /// The type this codec handles
    fn descriptor(&self) -> &TypeDescriptor;

    /// Write `value` to `out`
    fn encode(&self, value: &T, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()>;

    /// Read one value from `input`
    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<T>;

    /// Descriptor of `value` itself, for codecs serving a family of is-a related descriptors
    fn runtime_descriptor(&self, _value: &T) -> Option<TypeDescriptor> {
        None
    }
}

/// Per-call state: the registry in use and the current nesting depth
#[derive(Debug)]
pub struct CodecContext<'r> {
    registry: &'r CodecRegistry,
    depth: usize,
}

impl<'r> CodecContext<'r> {
    /// Start a call at depth zero
    pub fn new(registry: &'r CodecRegistry) -> Self {
        Self { registry, depth: 0 }
    }

    /// Registry serving this call
    pub fn registry(&self) -> &'r CodecRegistry {
        self.registry
    }

    /// Configuration of the registry serving this call
    pub fn config(&self) -> &'r CodecConfig {
        self.registry.config()
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one level deeper, failing if the configured limit is reached
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if let Some(limit) = self.config().max_depth {
            if self.depth >= limit {
                return Err(CodecError::DepthLimitExceeded(limit));
            }
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// Type-erased view of a [`Codec`], as stored in the registry
pub trait ErasedCodec: Send + Sync {
    /// The type this codec handles
    fn descriptor(&self) -> &TypeDescriptor;

    /// Rust type of the values the codec handles
    fn value_type(&self) -> TypeId;

    /// Rust type name of the values the codec handles, for diagnostics
    fn value_type_name(&self) -> &'static str;

    /// Encode a value of the codec's Rust type
    fn encode_any(
        &self,
        value: &dyn Any,
        out: &mut dyn Output,
        cx: &mut CodecContext<'_>,
    ) -> Result<()>;

    /// Descriptor of the value itself, see [`Codec::runtime_descriptor`]
    fn runtime_descriptor(&self, value: &dyn Any) -> Option<TypeDescriptor>;

    /// Decode a value and wrap it with its descriptor
    fn decode_dynamic(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<Dynamic>;

    /// Upcast for recovering the typed codec
    fn as_any(&self) -> &dyn Any;
}

/// Adapter holding a typed codec behind [`ErasedCodec`]
pub(crate) struct Erased<T> {
    pub(crate) codec: Arc<dyn Codec<T>>,
}

impl<T: CodecValue> ErasedCodec for Erased<T> {
    fn descriptor(&self) -> &TypeDescriptor {
        self.codec.descriptor()
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn encode_any(
        &self,
        value: &dyn Any,
        out: &mut dyn Output,
        cx: &mut CodecContext<'_>,
    ) -> Result<()> {
        let value = value.downcast_ref::<T>().ok_or_else(|| {
            CodecError::resolution(
                self.codec.descriptor(),
                format!("codec handles {}", std::any::type_name::<T>()),
            )
        })?;
        self.codec.encode(value, out, cx)
    }

    fn runtime_descriptor(&self, value: &dyn Any) -> Option<TypeDescriptor> {
        value
            .downcast_ref::<T>()
            .and_then(|value| self.codec.runtime_descriptor(value))
    }

    fn decode_dynamic(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<Dynamic> {
        let value = self.codec.decode(input, cx)?;
        Ok(Dynamic::new(self.codec.descriptor().clone(), value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

static BOOL: TypeDescriptor = TypeDescriptor::BOOL;
static CHAR: TypeDescriptor = TypeDescriptor::CHAR;
static STRING: TypeDescriptor = TypeDescriptor::STRING;

/// Codec for `bool`
#[derive(Debug, Clone, Default)]
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn descriptor(&self) -> &TypeDescriptor {
        &BOOL
    }

    fn encode(&self, value: &bool, out: &mut dyn Output, _cx: &mut CodecContext<'_>) -> Result<()> {
        out.write_bool(*value)
    }

    fn decode(&self, input: &mut dyn Input, _cx: &mut CodecContext<'_>) -> Result<bool> {
        input.read_bool()
    }
}

/// Codec for any number type with a lossless textual form
pub struct NumberCodec<T> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T> NumberCodec<T> {
    /// Create a codec registered under `descriptor`
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            _marker: PhantomData,
        }
    }
}

impl<T> Codec<T> for NumberCodec<T>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(&self, value: &T, out: &mut dyn Output, _cx: &mut CodecContext<'_>) -> Result<()> {
        out.write_number(&value.to_string())
    }

    fn decode(&self, input: &mut dyn Input, _cx: &mut CodecContext<'_>) -> Result<T> {
        let text = input.read_number()?;
        text.parse::<T>().map_err(|e| {
            CodecError::InvalidValue(format!("{:?} is not a valid {}: {}", text, self.descriptor, e))
        })
    }
}

/// Codec for `char`, written as a one-character string
#[derive(Debug, Clone, Default)]
pub struct CharCodec;

impl Codec<char> for CharCodec {
    fn descriptor(&self) -> &TypeDescriptor {
        &CHAR
    }

    fn encode(&self, value: &char, out: &mut dyn Output, _cx: &mut CodecContext<'_>) -> Result<()> {
        let mut buf = [0u8; 4];
        out.write_str(value.encode_utf8(&mut buf))
    }

    fn decode(&self, input: &mut dyn Input, _cx: &mut CodecContext<'_>) -> Result<char> {
        let text = input.read_str()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CodecError::InvalidValue(format!(
                "{:?} is not a single character",
                text
            ))),
        }
    }
}

/// Codec for `String`
#[derive(Debug, Clone, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn descriptor(&self) -> &TypeDescriptor {
        &STRING
    }

    fn encode(&self, value: &String, out: &mut dyn Output, _cx: &mut CodecContext<'_>) -> Result<()> {
        out.write_str(value)
    }

    fn decode(&self, input: &mut dyn Input, _cx: &mut CodecContext<'_>) -> Result<String> {
        input.read_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Token, TokenReader, TokenWriter};
    use crate::registry::RegistryBuilder;

    #[test]
    fn test_number_codec_keeps_text() {
        let registry = RegistryBuilder::new().build();
        let codec = NumberCodec::<i64>::new(TypeDescriptor::I64);

        let mut out = TokenWriter::new();
        codec
            .encode(&-42, &mut out, &mut CodecContext::new(&registry))
            .unwrap();
        assert_eq!(out.tokens(), &[Token::Number("-42".into())]);
    }

    #[test]
    fn test_number_out_of_range() {
        let registry = RegistryBuilder::new().build();
        let codec = NumberCodec::<i8>::new(TypeDescriptor::I8);
        let tokens = vec![Token::Number("300".into())];

        let result = codec.decode(&mut TokenReader::new(&tokens), &mut CodecContext::new(&registry));
        assert!(matches!(result, Err(CodecError::InvalidValue(_))));
    }

    #[test]
    fn test_char_codec_rejects_long_text() {
        let registry = RegistryBuilder::new().build();
        let tokens = vec![Token::String("ab".into())];

        let result = CharCodec.decode(&mut TokenReader::new(&tokens), &mut CodecContext::new(&registry));
        assert!(matches!(result, Err(CodecError::InvalidValue(_))));
    }

    #[test]
    fn test_depth_limit() {
        let registry = RegistryBuilder::new()
            .config(CodecConfig::default().max_depth(Some(2)))
            .build();
        let mut cx = CodecContext::new(&registry);

        let ok = cx.nested(|cx| cx.nested(|cx| Ok(cx.depth())));
        assert_eq!(ok, Ok(2));
        assert_eq!(cx.depth(), 0);

        let err = cx.nested(|cx| cx.nested(|cx| cx.nested(|_| Ok(()))));
        assert_eq!(err, Err(CodecError::DepthLimitExceeded(2)));
        assert_eq!(cx.depth(), 0);
    }

    #[test]
    fn test_erased_rejects_wrong_type() {
        let registry = RegistryBuilder::new().build();
        let erased = Erased::<bool> {
            codec: Arc::new(BoolCodec),
        };

        let mut out = TokenWriter::new();
        let result = erased.encode_any(&7i32, &mut out, &mut CodecContext::new(&registry));
        assert!(matches!(result, Err(CodecError::Resolution { .. })));
        assert!(out.tokens().is_empty());
    }
}
