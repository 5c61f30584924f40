//! Declared (unresolved) types of fields and implementing types
//!
//! These mirror what a field or type declaration says about its generic
//! parameters before any resolution happens. [`crate::resolver::TypeResolver`]
//! turns them into [`TypeDescriptor`]s and [`crate::types::TypeArgs`].

use crate::types::{TypeDescriptor, TypeName};

/// A type as written in a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// A fully known type
    Concrete(TypeDescriptor),

    /// A generic type applied to declared arguments, e.g. `map<K, list<V>>`
    Parameterized {
        /// Raw generic type
        raw: TypeName,
        /// Declared arguments in order
        args: Vec<DeclaredType>,
    },

    /// A type variable, optionally bounded
    Variable(TypeVar),

    /// An unconstrained wildcard argument
    Wildcard,
}

/// A named type variable with its upper bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVar {
    /// Variable name, e.g. `T`
    pub name: String,

    /// Declared upper bounds, empty when unbounded
    pub bounds: Vec<DeclaredType>,
}

impl DeclaredType {
    /// A concrete declared type
    pub fn concrete(desc: TypeDescriptor) -> Self {
        DeclaredType::Concrete(desc)
    }

    /// A generic type applied to arguments
    pub fn parameterized(raw: impl Into<TypeName>, args: Vec<DeclaredType>) -> Self {
        DeclaredType::Parameterized {
            raw: raw.into(),
            args,
        }
    }

    /// An unbounded type variable
    pub fn var(name: impl Into<String>) -> Self {
        DeclaredType::Variable(TypeVar {
            name: name.into(),
            bounds: Vec::new(),
        })
    }

    /// A type variable with the given upper bounds
    pub fn bounded(name: impl Into<String>, bounds: Vec<DeclaredType>) -> Self {
        DeclaredType::Variable(TypeVar {
            name: name.into(),
            bounds,
        })
    }

    /// Raw name and declared arguments, when this is a generic instantiation
    pub(crate) fn generic_parts(&self) -> Option<(&TypeName, GenericArgs<'_>)> {
        match self {
            DeclaredType::Parameterized { raw, args } => Some((raw, GenericArgs::Declared(args))),
            DeclaredType::Concrete(desc) if !desc.args().is_empty() => {
                Some((desc.name(), GenericArgs::Resolved(desc.args())))
            }
            _ => None,
        }
    }
}

pub(crate) enum GenericArgs<'a> {
    Declared(&'a [DeclaredType]),
    Resolved(&'a [TypeDescriptor]),
}

/// A field declaration: name plus declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name, used as the element label when encoding records
    pub name: String,

    /// Declared type of the field
    pub declared: DeclaredType,
}

impl FieldDecl {
    /// Create a field declaration
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
        }
    }
}

/// An implementing type and the generic supertypes it declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// The implementing type
    pub name: TypeName,

    /// Declared supertypes and interfaces, in declaration order
    pub supertypes: Vec<DeclaredType>,
}

impl TypeDecl {
    /// Create a type declaration without supertypes
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
        }
    }

    /// Add a declared supertype
    pub fn implements(mut self, supertype: DeclaredType) -> Self {
        self.supertypes.push(supertype);
        self
    }
}
