//! # Typecodec Core
//!
//! A format-agnostic object codec framework: structured values are encoded to
//! and decoded from a sequence of typed tokens, with an explicit type registry
//! choosing the codec at every position of a value.
//!
//! ## Modules
//!
//! - `constants`: Default labels, limits and built-in type names
//! - `types`: Type identity (TypeDescriptor, TypeArgs, TypeHierarchy)
//! - `decl`: Declared types of fields and implementing types
//! - `resolver`: Generic type argument resolution
//! - `io`: Token stream contract and the in-memory token stream
//! - `codec`: The codec contract and primitive codecs
//! - `registry`: Descriptor to codec lookup and zero-argument construction
//! - `containers`: Map, string-keyed map, array and optional codecs
//! - `object`: Record codecs from explicit field tables
//! - `enums`: Unit enum codecs
//! - `dynamic`: Polymorphic values of the top type
//! - `json`: JSON value tree, builders and codec
//!
//! ## Example
//!
//! ```
//! use typecodec_core::{RegistryBuilder, TypeDescriptor};
//! use indexmap::IndexMap;
//!
//! let registry = RegistryBuilder::new()
//!     .register_map::<String, i32>(TypeDescriptor::STRING, TypeDescriptor::I32)?
//!     .build();
//!
//! let desc = TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::I32);
//! let mut map = IndexMap::new();
//! map.insert("b".to_string(), 2);
//! map.insert("a".to_string(), 1);
//!
//! let tokens = registry.to_tokens(&desc, &map)?;
//! let back: IndexMap<String, i32> = registry.from_tokens(&desc, &tokens)?;
//! assert_eq!(back.keys().collect::<Vec<_>>(), ["b", "a"]);
//! # Ok::<(), typecodec_core::CodecError>(())
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod constants;
pub mod containers;
pub mod decl;
pub mod dynamic;
pub mod enums;
pub mod error;
pub mod io;
pub mod json;
pub mod object;
pub mod registry;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use codec::{Codec, CodecContext, CodecValue};
pub use config::CodecConfig;
pub use dynamic::Dynamic;
pub use error::CodecError;
pub use io::{Input, Output, Token, TokenKind, TokenReader, TokenWriter};
pub use json::JsonValue;
pub use registry::{CodecRegistry, RegistryBuilder};
pub use types::{TypeArgs, TypeDescriptor, TypeName};

/// Result type alias for codec operations
pub type Result<T> = core::result::Result<T, CodecError>;
