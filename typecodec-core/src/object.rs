//! Record codecs built from explicit field tables
//!
//! Each field is written as an element labelled with the field name, in
//! declaration order. Decoding builds an empty record with the constructor
//! registered for its descriptor, then sets the fields as they are read.

use crate::codec::{Codec, CodecContext, CodecValue};
use crate::decl::FieldDecl;
use crate::io::{Input, Output};
use crate::registry::CodecRegistry;
use crate::types::TypeDescriptor;
use crate::Result;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::trace;

trait FieldCodec<T>: Send + Sync {
    fn name(&self) -> &str;

    fn encode_field(&self, record: &T, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()>;

    fn decode_field(&self, record: &mut T, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<()>;
}

enum FieldSource<F> {
    Fixed(Arc<dyn Codec<F>>),
    /// Looked up on every call; lets a record refer to its own type
    Deferred(TypeDescriptor),
}

struct Field<T, F> {
    name: String,
    get: fn(&T) -> &F,
    set: fn(&mut T, F),
    source: FieldSource<F>,
}

impl<T, F: CodecValue> Field<T, F> {
    fn codec(&self, cx: &CodecContext<'_>) -> Result<Arc<dyn Codec<F>>> {
        match &self.source {
            FieldSource::Fixed(codec) => Ok(Arc::clone(codec)),
            FieldSource::Deferred(desc) => cx.registry().codec_for::<F>(desc),
        }
    }
}

impl<T, F: CodecValue> FieldCodec<T> for Field<T, F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode_field(&self, record: &T, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        let codec = self.codec(cx)?;
        out.start_element(&self.name)?;
        cx.nested(|cx| codec.encode((self.get)(record), out, cx))?;
        out.end_element()
    }

    fn decode_field(&self, record: &mut T, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<()> {
        let codec = self.codec(cx)?;
        input.start_element(Some(&self.name))?;
        let value = cx.nested(|cx| codec.decode(input, cx))?;
        input.end_element()?;
        (self.set)(record, value);
        Ok(())
    }
}

/// Codec for a user record `T`
pub struct ObjectCodec<T> {
    descriptor: TypeDescriptor,
    fields: Vec<Box<dyn FieldCodec<T>>>,
}

impl<T: CodecValue> ObjectCodec<T> {
    /// Start a field table for `descriptor`, resolving field codecs against `registry`
    pub fn builder(registry: &CodecRegistry, descriptor: TypeDescriptor) -> ObjectCodecBuilder<'_, T> {
        ObjectCodecBuilder {
            registry,
            descriptor,
            fields: Vec::new(),
        }
    }

    /// Field names in encoding order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }
}

impl<T: CodecValue> Codec<T> for ObjectCodec<T> {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(&self, value: &T, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        for field in &self.fields {
            field.encode_field(value, out, cx)?;
        }
        Ok(())
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<T> {
        let mut record: T = cx.registry().construct(&self.descriptor)?;
        for field in &self.fields {
            field.decode_field(&mut record, input, cx)?;
        }
        Ok(record)
    }
}

/// Field table under construction
pub struct ObjectCodecBuilder<'r, T> {
    registry: &'r CodecRegistry,
    descriptor: TypeDescriptor,
    fields: Vec<Box<dyn FieldCodec<T>>>,
}

impl<'r, T: CodecValue> ObjectCodecBuilder<'r, T> {
    /// Add a field with an explicit codec
    pub fn field_with<F: CodecValue>(
        mut self,
        name: impl Into<String>,
        codec: Arc<dyn Codec<F>>,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.fields.push(Box::new(Field {
            name: name.into(),
            get,
            set,
            source: FieldSource::Fixed(codec),
        }));
        self
    }

    /// Add a field whose codec is the one registered for `desc`
    pub fn field<F: CodecValue>(
        self,
        name: impl Into<String>,
        desc: &TypeDescriptor,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Result<Self> {
        let codec = self.registry.codec_for::<F>(desc)?;
        Ok(self.field_with(name, codec, get, set))
    }

    /// Add a field from its declaration; the declared type is resolved first,
    /// so unbounded type variables become `object`
    pub fn declared_field<F: CodecValue>(
        self,
        decl: &FieldDecl,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Result<Self> {
        let desc = self.registry.resolver().resolve_declared(&decl.declared);

        #[cfg(feature = "logging")]
        trace!("Field {}.{} resolved to {}", self.descriptor, decl.name, desc);

        self.field(decl.name.clone(), &desc, get, set)
    }

    /// Add a field whose codec is looked up at encode/decode time.
    ///
    /// Needed when the field's type is the record itself, or registered later.
    pub fn deferred_field<F: CodecValue>(
        mut self,
        name: impl Into<String>,
        desc: TypeDescriptor,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.fields.push(Box::new(Field {
            name: name.into(),
            get,
            set,
            source: FieldSource::Deferred(desc),
        }));
        self
    }

    /// Finish the field table
    pub fn build(self) -> ObjectCodec<T> {
        ObjectCodec {
            descriptor: self.descriptor,
            fields: self.fields,
        }
    }
}
