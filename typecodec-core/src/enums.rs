//! Codec for unit-variant enums, written as the variant's name

use crate::codec::{Codec, CodecContext, CodecValue};
use crate::error::CodecError;
use crate::io::{Input, Output};
use crate::types::TypeDescriptor;
use crate::Result;

/// Codec mapping each variant of `T` to a fixed name
pub struct EnumCodec<T> {
    descriptor: TypeDescriptor,
    variants: Vec<(String, T)>,
}

impl<T: CodecValue + Clone> EnumCodec<T> {
    /// Create a codec from a `(name, variant)` table
    pub fn new<N: Into<String>>(
        descriptor: TypeDescriptor,
        variants: impl IntoIterator<Item = (N, T)>,
    ) -> Self {
        Self {
            descriptor,
            variants: variants
                .into_iter()
                .map(|(name, variant)| (name.into(), variant))
                .collect(),
        }
    }
}

impl<T: CodecValue + Clone> Codec<T> for EnumCodec<T> {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(&self, value: &T, out: &mut dyn Output, _cx: &mut CodecContext<'_>) -> Result<()> {
        let name = self
            .variants
            .iter()
            .find(|(_, variant)| variant == value)
            .map(|(name, _)| name)
            .ok_or_else(|| {
                CodecError::InvalidValue(format!("{:?} is not a variant of {}", value, self.descriptor))
            })?;
        out.write_str(name)
    }

    fn decode(&self, input: &mut dyn Input, _cx: &mut CodecContext<'_>) -> Result<T> {
        let name = input.read_str()?;
        self.variants
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, variant)| variant.clone())
            .ok_or_else(|| {
                CodecError::InvalidValue(format!("{:?} is not a variant of {}", name, self.descriptor))
            })
    }
}
