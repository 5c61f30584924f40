//! Core type identity: descriptors, resolved type arguments and the is-a table

use crate::constants::names;
use crate::error::CodecError;
use crate::Result;
use hashbrown::{HashMap, HashSet};
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Raw name of a type, without type arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Cow<'static, str>);

impl TypeName {
    /// Create a name from a static string
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TypeName {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a concrete type: a raw name plus resolved type arguments.
///
/// `map<string, i32>` is the raw name `map` with two arguments; user records
/// and primitives carry no arguments. [`TypeDescriptor::OBJECT`] is the
/// universal top type every other type is-a.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: TypeName,
    args: Vec<TypeDescriptor>,
}

macro_rules! descriptor_consts {
    ($($(#[$doc:meta])* $konst:ident => $name:expr;)*) => {
        $(
            $(#[$doc])*
            pub const $konst: TypeDescriptor = TypeDescriptor::leaf($name);
        )*
    };
}

impl TypeDescriptor {
    descriptor_consts! {
        /// The universal top type
        OBJECT => names::OBJECT;
        /// `bool`
        BOOL => names::BOOL;
        /// `i8`
        I8 => names::I8;
        /// `i16`
        I16 => names::I16;
        /// `i32`
        I32 => names::I32;
        /// `i64`
        I64 => names::I64;
        /// `u8`
        U8 => names::U8;
        /// `u16`
        U16 => names::U16;
        /// `u32`
        U32 => names::U32;
        /// `u64`
        U64 => names::U64;
        /// `f32`
        F32 => names::F32;
        /// `f64`
        F64 => names::F64;
        /// `char`
        CHAR => names::CHAR;
        /// `string`
        STRING => names::STRING;
        /// Any JSON value
        JSON_VALUE => names::JSON_VALUE;
        /// JSON null
        JSON_NULL => names::JSON_NULL;
        /// JSON boolean
        JSON_BOOL => names::JSON_BOOL;
        /// JSON number
        JSON_NUMBER => names::JSON_NUMBER;
        /// JSON string
        JSON_STRING => names::JSON_STRING;
        /// JSON array
        JSON_ARRAY => names::JSON_ARRAY;
        /// JSON object
        JSON_OBJECT => names::JSON_OBJECT;
    }

    const fn leaf(name: &'static str) -> Self {
        Self {
            name: TypeName::from_static(name),
            args: Vec::new(),
        }
    }

    /// A type without type arguments (record, variant or primitive)
    pub fn named(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic type instantiated with the given arguments
    pub fn generic(name: impl Into<TypeName>, args: Vec<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// `array<elem>`
    pub fn array(elem: TypeDescriptor) -> Self {
        Self::generic(names::ARRAY, vec![elem])
    }

    /// `option<elem>`
    pub fn option(elem: TypeDescriptor) -> Self {
        Self::generic(names::OPTION, vec![elem])
    }

    /// `map<key, value>`
    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::generic(names::MAP, vec![key, value])
    }

    /// Raw type name
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Type arguments, empty for non-generic types
    pub fn args(&self) -> &[TypeDescriptor] {
        &self.args
    }

    /// Type arguments as a [`TypeArgs`] value
    pub fn type_args(&self) -> TypeArgs {
        TypeArgs::new(self.args.clone())
    }

    /// Check if this is the universal top type
    pub fn is_top(&self) -> bool {
        self.name.as_str() == names::OBJECT && self.args.is_empty()
    }

    /// Same type arguments under a different raw name
    pub fn with_name(&self, name: TypeName) -> Self {
        Self {
            name,
            args: self.args.clone(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Parses the display form back, e.g. `map<string, array<i32>>`
impl FromStr for TypeDescriptor {
    type Err = CodecError;

    fn from_str(text: &str) -> Result<Self> {
        let mut parser = DescriptorParser { text, pos: 0 };
        let desc = parser.descriptor()?;
        parser.skip_ws();
        if parser.pos != text.len() {
            return Err(parser.error("unexpected trailing text"));
        }
        Ok(desc)
    }
}

struct DescriptorParser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn descriptor(&mut self) -> Result<TypeDescriptor> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| matches!(c, '<' | '>' | ',') || c.is_whitespace())
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error("expected a type name"));
        }
        let name = rest[..end].to_string();
        self.pos += end;

        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.descriptor()?);
                if self.eat('>') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.error("expected ',' or '>'"));
                }
            }
        }

        Ok(TypeDescriptor::generic(name, args))
    }

    fn error(&self, what: &str) -> CodecError {
        CodecError::InvalidValue(format!(
            "{} at offset {} in type {:?}",
            what, self.pos, self.text
        ))
    }
}

static TOP: TypeDescriptor = TypeDescriptor::OBJECT;

/// Resolved type arguments of a generic container or field.
///
/// Indexing past the declared arity yields the top type rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeArgs(Vec<TypeDescriptor>);

impl TypeArgs {
    /// Create type arguments from resolved descriptors
    pub fn new(args: Vec<TypeDescriptor>) -> Self {
        Self(args)
    }

    /// No type arguments; every access yields the top type
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of resolved arguments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no arguments were resolved
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Argument at `index`, or the top type past the end
    pub fn get(&self, index: usize) -> &TypeDescriptor {
        self.0.get(index).unwrap_or(&TOP)
    }

    /// Iterate the resolved arguments
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.0.iter()
    }

    /// Consume into the underlying descriptors
    pub fn into_vec(self) -> Vec<TypeDescriptor> {
        self.0
    }
}

/// Explicit is-a relation between raw type names.
///
/// Replaces a live class hierarchy: every subtype edge is declared up front.
/// Every type is implicitly a subtype of [`TypeDescriptor::OBJECT`].
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    parents: HashMap<TypeName, Vec<TypeName>>,
}

impl TypeHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `sub` is-a `sup`
    pub fn declare(&mut self, sub: impl Into<TypeName>, sup: impl Into<TypeName>) {
        let sup = sup.into();
        let parents = self.parents.entry(sub.into()).or_default();
        if !parents.contains(&sup) {
            parents.push(sup);
        }
    }

    /// Direct parents of `name`, in declaration order
    pub fn parents(&self, name: &TypeName) -> &[TypeName] {
        self.parents.get(name).map_or(&[], Vec::as_slice)
    }

    /// All ancestors of `name`, nearest first, excluding `name` itself and the top type
    pub fn ancestors(&self, name: &TypeName) -> Vec<TypeName> {
        let mut seen: HashSet<&TypeName> = HashSet::new();
        let mut queue: VecDeque<&TypeName> = VecDeque::new();
        let mut result = Vec::new();

        seen.insert(name);
        queue.push_back(name);

        while let Some(current) = queue.pop_front() {
            for parent in self.parents(current) {
                if seen.insert(parent) {
                    if parent.as_str() != names::OBJECT {
                        result.push(parent.clone());
                    }
                    queue.push_back(parent);
                }
            }
        }

        result
    }

    /// Check whether `sub` is-a `sup` (reflexive, transitive, rooted at the top type)
    pub fn is_a(&self, sub: &TypeName, sup: &TypeName) -> bool {
        sub == sup || sup.as_str() == names::OBJECT || self.ancestors(sub).contains(sup)
    }

    /// Iterate every declared `(sub, parents)` edge set
    pub fn edges(&self) -> impl Iterator<Item = (&TypeName, &[TypeName])> {
        self.parents.iter().map(|(k, v)| (k, v.as_slice()))
    }
}
