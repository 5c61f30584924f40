//! JSON value tree: the AST, its builders and its codec
//!
//! [`JsonValue`] is the decode target of last resort for untyped data. Every
//! variant has its own descriptor (`json.null` ... `json.object`) declared
//! is-a `json.value`; only `json.value` carries a codec.

pub mod build;
pub mod codec;
mod value;

pub use codec::JsonValueCodec;
pub use value::{JsNumber, JsObject, JsonValue};
