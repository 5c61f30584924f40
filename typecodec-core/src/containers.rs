//! Container codecs: maps, string-keyed maps, arrays and optional values
//!
//! Containers are built once around their element codecs and never look
//! element types up again at encode/decode time. Decoding loops while the
//! next token opens an element; anything else (normally the enclosing
//! element's close, or the end of the stream) ends the container.

use crate::codec::{Codec, CodecContext};
use crate::error::CodecError;
use crate::io::{Input, Output, TokenKind};
use crate::types::TypeDescriptor;
use crate::Result;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;
use std::sync::Arc;

/// A mapping a map codec can populate and iterate
pub trait EntryMap<K, V> {
    /// Check whether `key` is already present
    fn contains_entry(&self, key: &K) -> bool;

    /// Insert an entry, returning the previous value for the key
    fn insert_entry(&mut self, key: K, value: V) -> Option<V>;

    /// Visit entries in the map's iteration order, stopping at the first error
    fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V) -> Result<()>) -> Result<()>;

    /// Number of entries
    fn entry_count(&self) -> usize;
}

impl<K: Eq + Hash, V, S: BuildHasher> EntryMap<K, V> for IndexMap<K, V, S> {
    fn contains_entry(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V) -> Result<()>) -> Result<()> {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

impl<K: Ord, V> EntryMap<K, V> for BTreeMap<K, V> {
    fn contains_entry(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn insert_entry(&mut self, key: K, value: V) -> Option<V> {
        self.insert(key, value)
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(&K, &V) -> Result<()>) -> Result<()> {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

/// General map codec: every entry wraps its key and its value in labelled elements.
///
/// Token shape per entry, with the default labels:
/// `<_> <key> key-tokens </key> <value> value-tokens </value> </_>`
pub struct MapCodec<K, V, M = IndexMap<K, V>> {
    descriptor: TypeDescriptor,
    key_codec: Arc<dyn Codec<K>>,
    value_codec: Arc<dyn Codec<V>>,
    _marker: PhantomData<fn() -> M>,
}

impl<K, V, M> MapCodec<K, V, M> {
    /// Create a map codec for `descriptor` from its key and value codecs
    pub fn new(
        descriptor: TypeDescriptor,
        key_codec: Arc<dyn Codec<K>>,
        value_codec: Arc<dyn Codec<V>>,
    ) -> Self {
        Self {
            descriptor,
            key_codec,
            value_codec,
            _marker: PhantomData,
        }
    }
}

impl<K, V, M> Codec<M> for MapCodec<K, V, M>
where
    K: fmt::Debug,
    M: EntryMap<K, V> + 'static,
{
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(&self, value: &M, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        let config = cx.config();

        value.for_each_entry(&mut |key, val| {
            out.start_element(&config.entry_elem_name)?;

            out.start_element(&config.key_elem_name)?;
            cx.nested(|cx| self.key_codec.encode(key, out, cx))?;
            out.end_element()?;

            out.start_element(&config.value_elem_name)?;
            cx.nested(|cx| self.value_codec.encode(val, out, cx))?;
            out.end_element()?;

            out.end_element()
        })
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<M> {
        let config = cx.config();
        let mut map: M = cx.registry().construct(&self.descriptor)?;

        while input.has_next() && input.peek_kind() == Some(TokenKind::StartElement) {
            input.start_element(Some(&config.entry_elem_name))?;

            input.start_element(Some(&config.key_elem_name))?;
            let key = cx.nested(|cx| self.key_codec.decode(input, cx))?;
            input.end_element()?;

            input.start_element(Some(&config.value_elem_name))?;
            let val = cx.nested(|cx| self.value_codec.decode(input, cx))?;
            input.end_element()?;

            input.end_element()?;

            if map.contains_entry(&key) {
                return Err(CodecError::DuplicateKey(format!("{:?}", key)));
            }
            map.insert_entry(key, val);
        }

        Ok(map)
    }
}

/// Map codec for string keys: the entry element's label is the key.
///
/// Token shape per entry: `<key-text> value-tokens </key-text>`. Decodes to
/// the same map as [`MapCodec`] over the same entries.
pub struct StringMapCodec<V, M = IndexMap<String, V>> {
    descriptor: TypeDescriptor,
    value_codec: Arc<dyn Codec<V>>,
    _marker: PhantomData<fn() -> M>,
}

impl<V, M> StringMapCodec<V, M> {
    /// Create a string-keyed map codec for `descriptor` from its value codec
    pub fn new(descriptor: TypeDescriptor, value_codec: Arc<dyn Codec<V>>) -> Self {
        Self {
            descriptor,
            value_codec,
            _marker: PhantomData,
        }
    }
}

impl<V, M> Codec<M> for StringMapCodec<V, M>
where
    M: EntryMap<String, V> + 'static,
{
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(&self, value: &M, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        value.for_each_entry(&mut |key, val| {
            out.start_element(key)?;
            cx.nested(|cx| self.value_codec.encode(val, out, cx))?;
            out.end_element()
        })
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<M> {
        let mut map: M = cx.registry().construct(&self.descriptor)?;

        while input.has_next() && input.peek_kind() == Some(TokenKind::StartElement) {
            let key = input.start_element(None)?;
            let val = cx.nested(|cx| self.value_codec.decode(input, cx))?;
            input.end_element()?;

            if map.contains_entry(&key) {
                return Err(CodecError::DuplicateKey(key));
            }
            map.insert_entry(key, val);
        }

        Ok(map)
    }
}

/// Codec for `Vec<T>`: each element wrapped in the configured element label
pub struct ArrayCodec<T> {
    descriptor: TypeDescriptor,
    elem_codec: Arc<dyn Codec<T>>,
}

impl<T> ArrayCodec<T> {
    /// Create an array codec from its element codec
    pub fn new(descriptor: TypeDescriptor, elem_codec: Arc<dyn Codec<T>>) -> Self {
        Self {
            descriptor,
            elem_codec,
        }
    }
}

impl<T> Codec<Vec<T>> for ArrayCodec<T> {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(&self, value: &Vec<T>, out: &mut dyn Output, cx: &mut CodecContext<'_>) -> Result<()> {
        let config = cx.config();

        for item in value {
            out.start_element(&config.elem_name)?;
            cx.nested(|cx| self.elem_codec.encode(item, out, cx))?;
            out.end_element()?;
        }

        Ok(())
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<Vec<T>> {
        let config = cx.config();
        let mut items = Vec::new();

        while input.has_next() && input.peek_kind() == Some(TokenKind::StartElement) {
            input.start_element(Some(&config.elem_name))?;
            items.push(cx.nested(|cx| self.elem_codec.decode(input, cx))?);
            input.end_element()?;
        }

        Ok(items)
    }
}

/// Codec for `Option<T>`: `None` is a null token, `Some` is the inner encoding
///
/// The inner codec must never write a bare null, or `Some` reads back as `None`.
pub struct OptionCodec<T> {
    descriptor: TypeDescriptor,
    inner: Arc<dyn Codec<T>>,
}

impl<T> OptionCodec<T> {
    /// Create an optional codec around the inner codec
    pub fn new(descriptor: TypeDescriptor, inner: Arc<dyn Codec<T>>) -> Self {
        Self { descriptor, inner }
    }
}

impl<T> Codec<Option<T>> for OptionCodec<T> {
    fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn encode(
        &self,
        value: &Option<T>,
        out: &mut dyn Output,
        cx: &mut CodecContext<'_>,
    ) -> Result<()> {
        match value {
            Some(inner) => self.inner.encode(inner, out, cx),
            None => out.write_null(),
        }
    }

    fn decode(&self, input: &mut dyn Input, cx: &mut CodecContext<'_>) -> Result<Option<T>> {
        if input.peek_kind() == Some(TokenKind::Null) {
            input.read_null()?;
            return Ok(None);
        }
        self.inner.decode(input, cx).map(Some)
    }
}
