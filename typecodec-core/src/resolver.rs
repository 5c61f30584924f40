//! Generic type argument resolution

use crate::decl::{DeclaredType, FieldDecl, GenericArgs, TypeDecl};
use crate::types::{TypeArgs, TypeDescriptor, TypeHierarchy, TypeName};

/// Resolves declared generic parameters against a target generic interface.
///
/// Resolution is pure: the same declaration and interface always produce the
/// same [`TypeArgs`]. The only input besides the declaration is the is-a table
/// used to decide whether a raw type implements the interface.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'h> {
    hierarchy: &'h TypeHierarchy,
}

impl<'h> TypeResolver<'h> {
    /// Create a resolver over the given is-a table
    pub fn new(hierarchy: &'h TypeHierarchy) -> Self {
        Self { hierarchy }
    }

    /// Type arguments of a field whose declared type implements `iface`.
    ///
    /// Returns empty [`TypeArgs`] when the field's type is not a generic
    /// instantiation of `iface`.
    pub fn field_type_args(&self, field: &FieldDecl, iface: &TypeName) -> TypeArgs {
        self.matching_args(&field.declared, iface)
            .unwrap_or_else(TypeArgs::empty)
    }

    /// Type arguments with which `decl` implements `iface`.
    ///
    /// The first declared supertype whose raw type is-a `iface` wins.
    pub fn impl_type_args(&self, decl: &TypeDecl, iface: &TypeName) -> TypeArgs {
        decl.supertypes
            .iter()
            .find_map(|supertype| self.matching_args(supertype, iface))
            .unwrap_or_else(TypeArgs::empty)
    }

    /// The descriptor a declared type stands for at runtime
    pub fn resolve_declared(&self, declared: &DeclaredType) -> TypeDescriptor {
        match declared {
            DeclaredType::Concrete(desc) => desc.clone(),
            DeclaredType::Parameterized { raw, args } => TypeDescriptor::generic(
                raw.clone(),
                args.iter().map(|arg| self.resolve_declared(arg)).collect(),
            ),
            DeclaredType::Variable(var) => match var.bounds.as_slice() {
                [bound @ (DeclaredType::Concrete(_) | DeclaredType::Parameterized { .. })] => {
                    self.resolve_declared(bound)
                }
                _ => TypeDescriptor::OBJECT,
            },
            DeclaredType::Wildcard => TypeDescriptor::OBJECT,
        }
    }

    fn matching_args(&self, declared: &DeclaredType, iface: &TypeName) -> Option<TypeArgs> {
        let (raw, args) = declared.generic_parts()?;
        if !self.hierarchy.is_a(raw, iface) {
            return None;
        }

        let resolved = match args {
            GenericArgs::Declared(args) => args.iter().map(|a| self.resolve_declared(a)).collect(),
            GenericArgs::Resolved(args) => args.to_vec(),
        };
        Some(TypeArgs::new(resolved))
    }
}
