//! Codec registry: descriptor to codec lookup and zero-argument construction
//!
//! A [`RegistryBuilder`] is populated once at startup and frozen into an
//! immutable [`CodecRegistry`]. Lookups try the exact descriptor first, then
//! walk the explicit is-a table nearest ancestor first, and finally fall back
//! to the top type.

use crate::codec::{
    BoolCodec, CharCodec, Codec, CodecContext, CodecValue, Erased, ErasedCodec, NumberCodec,
    StringCodec,
};
use crate::config::CodecConfig;
use crate::containers::{ArrayCodec, EntryMap, MapCodec, OptionCodec, StringMapCodec};
use crate::dynamic::DynamicCodec;
use crate::enums::EnumCodec;
use crate::error::CodecError;
use crate::io::{Input, Output, Token, TokenReader, TokenWriter};
use crate::json::codec::register_json;
use crate::object::{ObjectCodec, ObjectCodecBuilder};
use crate::resolver::TypeResolver;
use crate::types::{TypeDescriptor, TypeHierarchy, TypeName};
use crate::Result;
use hashbrown::HashMap;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Zero-argument factory producing a fresh, empty instance
pub type Constructor<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Immutable mapping from type descriptors to codecs and constructors.
///
/// Safe to share across threads; every call brings its own token stream.
pub struct CodecRegistry {
    config: CodecConfig,
    codecs: HashMap<TypeDescriptor, Arc<dyn ErasedCodec>>,
    constructors: HashMap<TypeDescriptor, Arc<dyn Any + Send + Sync>>,
    hierarchy: TypeHierarchy,
    names: HashMap<String, TypeDescriptor>,
}

impl CodecRegistry {
    fn empty(config: CodecConfig) -> Self {
        Self {
            config,
            codecs: HashMap::new(),
            constructors: HashMap::new(),
            hierarchy: TypeHierarchy::new(),
            names: HashMap::new(),
        }
    }

    /// Labels and limits used by codecs served from this registry
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The is-a table consulted for polymorphic lookup
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// A type resolver over this registry's is-a table
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.hierarchy)
    }

    /// Check whether a codec is registered for exactly this descriptor
    pub fn contains(&self, desc: &TypeDescriptor) -> bool {
        self.codecs.contains_key(desc)
    }

    /// A registered descriptor by its display name, e.g. `map<string, i32>`
    pub fn descriptor_named(&self, name: &str) -> Option<&TypeDescriptor> {
        self.names.get(name)
    }

    /// All known descriptors, sorted by display name
    pub fn descriptors(&self) -> Vec<&TypeDescriptor> {
        let mut all: Vec<(&String, &TypeDescriptor)> = self.names.iter().collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all.into_iter().map(|(_, desc)| desc).collect()
    }

    /// Lookup order for `desc`: itself, its ancestors nearest first, then the top type
    fn candidates(&self, desc: &TypeDescriptor) -> Vec<TypeDescriptor> {
        let mut result = vec![desc.clone()];
        for ancestor in self.hierarchy.ancestors(desc.name()) {
            if !desc.args().is_empty() {
                result.push(desc.with_name(ancestor.clone()));
            }
            result.push(TypeDescriptor::named(ancestor));
        }
        result.push(TypeDescriptor::OBJECT);
        result.dedup();
        result
    }

    /// Type-erased codec for `desc`, falling back to the nearest registered ancestor
    pub fn erased_codec_for(&self, desc: &TypeDescriptor) -> Result<Arc<dyn ErasedCodec>> {
        for candidate in self.candidates(desc) {
            if let Some(codec) = self.codecs.get(&candidate) {
                #[cfg(feature = "logging")]
                if &candidate != desc {
                    trace!("Resolved {} through ancestor {}", desc, candidate);
                }
                return Ok(Arc::clone(codec));
            }
        }

        Err(CodecError::resolution(desc, "no codec registered for it or any ancestor"))
    }

    /// Typed codec for `desc`.
    ///
    /// Ancestors whose codec handles a different Rust type than `T` are
    /// skipped; the nearest compatible one wins.
    pub fn codec_for<T: CodecValue>(&self, desc: &TypeDescriptor) -> Result<Arc<dyn Codec<T>>> {
        let mut mismatch = None;

        for candidate in self.candidates(desc) {
            let Some(codec) = self.codecs.get(&candidate) else {
                continue;
            };
            match codec.as_any().downcast_ref::<Erased<T>>() {
                Some(erased) => {
                    #[cfg(feature = "logging")]
                    if &candidate != desc {
                        trace!("Resolved {} through ancestor {}", desc, candidate);
                    }
                    return Ok(Arc::clone(&erased.codec));
                }
                None => {
                    mismatch.get_or_insert((candidate, codec.value_type_name()));
                }
            }
        }

        let reason = match mismatch {
            Some((candidate, found)) => format!(
                "codec for {} handles {}, not {}",
                candidate,
                found,
                std::any::type_name::<T>()
            ),
            None => "no codec registered for it or any ancestor".to_string(),
        };
        Err(CodecError::resolution(desc, reason))
    }

    /// Zero-argument constructor registered for exactly `desc`
    pub fn constructor_for<T: 'static>(&self, desc: &TypeDescriptor) -> Result<Constructor<T>> {
        self.constructors
            .get(desc)
            .and_then(|ctor| ctor.downcast_ref::<Constructor<T>>())
            .cloned()
            .ok_or_else(|| CodecError::Construction(desc.clone()))
    }

    /// A fresh instance of `desc` built by its registered constructor
    pub fn construct<T: 'static>(&self, desc: &TypeDescriptor) -> Result<T> {
        let ctor = self.constructor_for::<T>(desc)?;
        Ok(ctor())
    }

    /// Encode `value` as `desc` into `out`
    pub fn encode<T: CodecValue>(
        &self,
        desc: &TypeDescriptor,
        value: &T,
        out: &mut dyn Output,
    ) -> Result<()> {
        let codec = self.codec_for::<T>(desc)?;
        codec.encode(value, out, &mut CodecContext::new(self))
    }

    /// Decode one value of `desc` from `input`
    pub fn decode<T: CodecValue>(&self, desc: &TypeDescriptor, input: &mut dyn Input) -> Result<T> {
        let codec = self.codec_for::<T>(desc)?;
        let result = codec.decode(input, &mut CodecContext::new(self));

        #[cfg(feature = "logging")]
        if let Err(e) = &result {
            debug!("Decoding {} failed: {}", desc, e);
        }

        result
    }

    /// Encode `value` into a fresh token vector
    pub fn to_tokens<T: CodecValue>(&self, desc: &TypeDescriptor, value: &T) -> Result<Vec<Token>> {
        let mut out = TokenWriter::new();
        self.encode(desc, value, &mut out)?;
        Ok(out.into_tokens())
    }

    /// Decode a value that must span the whole token slice
    pub fn from_tokens<T: CodecValue>(&self, desc: &TypeDescriptor, tokens: &[Token]) -> Result<T> {
        let mut input = TokenReader::new(tokens);
        let value = self.decode(desc, &mut input)?;
        if input.has_next() {
            return Err(CodecError::TrailingTokens(input.remaining().len()));
        }
        Ok(value)
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("config", &self.config)
            .field("codecs", &self.codecs.len())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// One-time population of a [`CodecRegistry`].
///
/// [`RegistryBuilder::new`] pre-registers codecs for the primitives, the top
/// type ([`crate::dynamic::Dynamic`]) and the JSON value tree.
pub struct RegistryBuilder {
    registry: CodecRegistry,
}

impl RegistryBuilder {
    /// Create a builder with the built-in codecs registered
    pub fn new() -> Self {
        let builder = Self::bare()
            .register(BoolCodec)
            .register(NumberCodec::<i8>::new(TypeDescriptor::I8))
            .register(NumberCodec::<i16>::new(TypeDescriptor::I16))
            .register(NumberCodec::<i32>::new(TypeDescriptor::I32))
            .register(NumberCodec::<i64>::new(TypeDescriptor::I64))
            .register(NumberCodec::<u8>::new(TypeDescriptor::U8))
            .register(NumberCodec::<u16>::new(TypeDescriptor::U16))
            .register(NumberCodec::<u32>::new(TypeDescriptor::U32))
            .register(NumberCodec::<u64>::new(TypeDescriptor::U64))
            .register(NumberCodec::<f32>::new(TypeDescriptor::F32))
            .register(NumberCodec::<f64>::new(TypeDescriptor::F64))
            .register(CharCodec)
            .register(StringCodec)
            .register(DynamicCodec);

        register_json(builder)
    }

    /// Create a builder with nothing registered
    pub fn bare() -> Self {
        Self {
            registry: CodecRegistry::empty(CodecConfig::default()),
        }
    }

    /// Replace the configuration
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.registry.config = config;
        self
    }

    /// The registry as populated so far, for resolving element codecs
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Typed codec lookup against the registrations made so far
    pub fn codec_for<T: CodecValue>(&self, desc: &TypeDescriptor) -> Result<Arc<dyn Codec<T>>> {
        self.registry.codec_for(desc)
    }

    fn remember(&mut self, desc: &TypeDescriptor) {
        self.registry
            .names
            .entry(desc.to_string())
            .or_insert_with(|| desc.clone());
    }

    /// Register `codec` under its own descriptor, replacing any previous codec
    pub fn register<T: CodecValue>(self, codec: impl Codec<T> + 'static) -> Self {
        self.register_arc(Arc::new(codec))
    }

    /// Register a shared codec under its own descriptor
    pub fn register_arc<T: CodecValue>(mut self, codec: Arc<dyn Codec<T>>) -> Self {
        let desc = codec.descriptor().clone();

        #[cfg(feature = "logging")]
        trace!("Registering codec for {} ({})", desc, std::any::type_name::<T>());

        self.remember(&desc);
        self.registry
            .codecs
            .insert(desc, Arc::new(Erased { codec }));
        self
    }

    /// Register the zero-argument constructor used to create `desc` during decode
    pub fn register_constructor<T: 'static>(
        mut self,
        desc: TypeDescriptor,
        ctor: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        let ctor: Constructor<T> = Arc::new(ctor);
        self.remember(&desc);
        self.registry.constructors.insert(desc, Arc::new(ctor));
        self
    }

    /// Declare that `sub` is-a `sup` for polymorphic lookup
    pub fn declare_subtype(mut self, sub: impl Into<TypeName>, sup: impl Into<TypeName>) -> Self {
        let sub = sub.into();
        let sup = sup.into();
        self.remember(&TypeDescriptor::named(sub.clone()));
        self.remember(&TypeDescriptor::named(sup.clone()));
        self.registry.hierarchy.declare(sub, sup);
        self
    }

    /// Register `array<elem>` for `Vec<T>`, using the codec already registered for `elem`
    pub fn register_array<T: CodecValue>(self, elem: TypeDescriptor) -> Result<Self> {
        let elem_codec = self.codec_for::<T>(&elem)?;
        Ok(self.register(ArrayCodec::new(TypeDescriptor::array(elem), elem_codec)))
    }

    /// Register `option<elem>` for `Option<T>`.
    ///
    /// `None` is written as a null token, so `elem` must never encode to one:
    /// nested options and JSON values are rejected.
    pub fn register_option<T: CodecValue>(self, elem: TypeDescriptor) -> Result<Self> {
        let nullable = elem.name().as_str() == crate::constants::names::OPTION
            || self
                .registry
                .hierarchy
                .is_a(elem.name(), TypeDescriptor::JSON_VALUE.name());
        if nullable {
            return Err(CodecError::resolution(
                &TypeDescriptor::option(elem),
                "the element can encode as null, which would read back as None",
            ));
        }

        let elem_codec = self.codec_for::<T>(&elem)?;
        Ok(self.register(OptionCodec::new(TypeDescriptor::option(elem), elem_codec)))
    }

    /// Register `map<key, value>` for `IndexMap<K, V>` with key/value wrapper elements
    pub fn register_map<K, V>(self, key: TypeDescriptor, value: TypeDescriptor) -> Result<Self>
    where
        K: CodecValue + Eq + Hash,
        V: CodecValue,
    {
        let key_codec = self.codec_for::<K>(&key)?;
        let value_codec = self.codec_for::<V>(&value)?;
        let desc = TypeDescriptor::map(key, value);

        Ok(self
            .register_constructor(desc.clone(), IndexMap::<K, V>::new)
            .register(MapCodec::<K, V, IndexMap<K, V>>::new(
                desc,
                key_codec,
                value_codec,
            )))
    }

    /// Register `map<string, value>` for `IndexMap<String, V>` using the key as the entry label
    pub fn register_string_map<V: CodecValue>(self, value: TypeDescriptor) -> Result<Self> {
        let value_codec = self.codec_for::<V>(&value)?;
        let desc = TypeDescriptor::map(TypeDescriptor::STRING, value);

        Ok(self
            .register_constructor(desc.clone(), IndexMap::<String, V>::new)
            .register(StringMapCodec::<V, IndexMap<String, V>>::new(desc, value_codec)))
    }

    /// Register a map codec for any [`EntryMap`] target type with its constructor
    pub fn register_map_with<K, V, M>(
        self,
        desc: TypeDescriptor,
        ctor: impl Fn() -> M + Send + Sync + 'static,
    ) -> Result<Self>
    where
        K: CodecValue,
        V: CodecValue,
        M: EntryMap<K, V> + CodecValue,
    {
        let args = desc.type_args();
        let key = args.get(0).clone();
        let value = args.get(1).clone();
        let key_codec = self.codec_for::<K>(&key)?;
        let value_codec = self.codec_for::<V>(&value)?;

        Ok(self
            .register_constructor(desc.clone(), ctor)
            .register(MapCodec::<K, V, M>::new(desc, key_codec, value_codec)))
    }

    /// Register a record codec and its constructor.
    ///
    /// `fields` builds the field table against the registrations made so far.
    pub fn register_object<T: CodecValue>(
        self,
        desc: TypeDescriptor,
        ctor: impl Fn() -> T + Send + Sync + 'static,
        fields: impl for<'a> FnOnce(ObjectCodecBuilder<'a, T>) -> Result<ObjectCodecBuilder<'a, T>>,
    ) -> Result<Self> {
        let codec = fields(ObjectCodec::builder(self.registry(), desc.clone()))?.build();
        Ok(self.register_constructor(desc, ctor).register(codec))
    }

    /// Register a unit enum written as its variant names
    pub fn register_enum<T, N>(self, desc: TypeDescriptor, variants: impl IntoIterator<Item = (N, T)>) -> Self
    where
        T: CodecValue + Clone,
        N: Into<String>,
    {
        self.register(EnumCodec::new(desc, variants))
    }

    /// Freeze the registry
    pub fn build(self) -> CodecRegistry {
        #[cfg(feature = "logging")]
        debug!(
            "Built codec registry: {} codecs, {} constructors",
            self.registry.codecs.len(),
            self.registry.constructors.len()
        );

        self.registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::Dynamic;
    use crate::json::JsonValue;

    #[derive(Debug, Clone, PartialEq)]
    struct Circle(u32);

    #[test]
    fn test_exact_lookup_first() {
        let registry = RegistryBuilder::new().build();
        let codec = registry.erased_codec_for(&TypeDescriptor::I32).unwrap();
        assert_eq!(codec.descriptor(), &TypeDescriptor::I32);
    }

    #[test]
    fn test_nearest_ancestor_then_top() {
        let shape = TypeDescriptor::named("Shape");
        let registry = RegistryBuilder::new()
            .register(NumberCodec::<u32>::new(shape.clone()))
            .declare_subtype("Circle", "Shape")
            .declare_subtype("Shape", "Figure")
            .build();

        let circle = TypeDescriptor::named("Circle");
        assert_eq!(registry.erased_codec_for(&circle).unwrap().descriptor(), &shape);

        let unknown = TypeDescriptor::named("Unrelated");
        assert!(registry.erased_codec_for(&unknown).unwrap().descriptor().is_top());
    }

    #[test]
    fn test_typed_lookup_skips_other_rust_types() {
        let registry = RegistryBuilder::new()
            .declare_subtype("Circle", names_json_value())
            .build();

        let circle = TypeDescriptor::named("Circle");
        // json.value is nearer but handles JsonValue; only object handles Dynamic
        let codec = registry.codec_for::<Dynamic>(&circle).unwrap();
        assert!(codec.descriptor().is_top());

        let err = registry.codec_for::<Circle>(&circle).err().unwrap();
        match err {
            CodecError::Resolution { descriptor, reason } => {
                assert_eq!(descriptor, circle);
                assert!(reason.contains("json.value"), "{}", reason);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(registry.codec_for::<JsonValue>(&circle).is_ok());
    }

    fn names_json_value() -> &'static str {
        crate::constants::names::JSON_VALUE
    }

    #[test]
    fn test_bare_registry_has_nothing() {
        let registry = RegistryBuilder::bare().build();
        let err = registry.erased_codec_for(&TypeDescriptor::BOOL).err().unwrap();
        assert!(matches!(err, CodecError::Resolution { .. }));
    }

    #[test]
    fn test_constructor_exact_only() {
        let registry = RegistryBuilder::new()
            .register_constructor(TypeDescriptor::named("Circle"), || Circle(1))
            .declare_subtype("Ring", "Circle")
            .build();

        assert_eq!(
            registry.construct::<Circle>(&TypeDescriptor::named("Circle")),
            Ok(Circle(1))
        );
        assert_eq!(
            registry.construct::<Circle>(&TypeDescriptor::named("Ring")),
            Err(CodecError::Construction(TypeDescriptor::named("Ring")))
        );
        // Registered, but for another Rust type
        assert!(registry
            .construct::<String>(&TypeDescriptor::named("Circle"))
            .is_err());
    }

    #[test]
    fn test_generic_registration_by_name() {
        let registry = RegistryBuilder::new()
            .register_map::<String, i32>(TypeDescriptor::STRING, TypeDescriptor::I32)
            .unwrap()
            .register_array::<bool>(TypeDescriptor::BOOL)
            .unwrap()
            .build();

        let map = registry.descriptor_named("map<string, i32>").unwrap();
        assert_eq!(map, &TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::I32));
        assert!(registry.contains(&TypeDescriptor::array(TypeDescriptor::BOOL)));

        let listed: Vec<String> = registry.descriptors().iter().map(|d| d.to_string()).collect();
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
        assert!(listed.contains(&"json.object".to_string()));
    }

    #[test]
    fn test_register_needs_element_codec() {
        let result = RegistryBuilder::bare().register_array::<bool>(TypeDescriptor::BOOL);
        assert!(result.is_err());
    }

    #[test]
    fn test_option_of_nullable_rejected() {
        let builder = RegistryBuilder::new()
            .register_option::<i32>(TypeDescriptor::I32)
            .unwrap();
        let nested = builder.register_option::<Option<i32>>(TypeDescriptor::option(TypeDescriptor::I32));
        assert!(matches!(nested, Err(CodecError::Resolution { .. })));

        let json = RegistryBuilder::new().register_option::<JsonValue>(TypeDescriptor::JSON_VALUE);
        assert!(json.is_err());
        let json_bool = RegistryBuilder::new().register_option::<JsonValue>(TypeDescriptor::JSON_BOOL);
        assert!(json_bool.is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let registry = RegistryBuilder::new().build();
        let tokens = vec![Token::Bool(true), Token::Null];

        let err = registry.from_tokens::<bool>(&TypeDescriptor::BOOL, &tokens).unwrap_err();
        assert_eq!(err, CodecError::TrailingTokens(1));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodecRegistry>();
    }
}
