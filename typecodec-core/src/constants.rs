//! Constants and limits for the codec framework

/// Label of the element wrapping one map entry
pub const DEFAULT_ENTRY_ELEM_NAME: &str = "_";

/// Label of the element wrapping a map key
pub const DEFAULT_KEY_ELEM_NAME: &str = "key";

/// Label of the element wrapping a map value
pub const DEFAULT_VALUE_ELEM_NAME: &str = "value";

/// Label of the element wrapping one array element
pub const DEFAULT_ELEM_NAME: &str = "elem";

/// Label of the element carrying the runtime type of a polymorphic value
pub const DEFAULT_TYPE_ATTR_NAME: &str = "@type";

/// Maximum nesting depth accepted by default during encode and decode
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Raw type names the framework registers itself
pub mod names {
    /// The universal top type
    pub const OBJECT: &str = "object";
    /// Boolean
    pub const BOOL: &str = "bool";
    /// Signed 8-bit integer
    pub const I8: &str = "i8";
    /// Signed 16-bit integer
    pub const I16: &str = "i16";
    /// Signed 32-bit integer
    pub const I32: &str = "i32";
    /// Signed 64-bit integer
    pub const I64: &str = "i64";
    /// Unsigned 8-bit integer
    pub const U8: &str = "u8";
    /// Unsigned 16-bit integer
    pub const U16: &str = "u16";
    /// Unsigned 32-bit integer
    pub const U32: &str = "u32";
    /// Unsigned 64-bit integer
    pub const U64: &str = "u64";
    /// 32-bit float
    pub const F32: &str = "f32";
    /// 64-bit float
    pub const F64: &str = "f64";
    /// Unicode scalar value
    pub const CHAR: &str = "char";
    /// UTF-8 string
    pub const STRING: &str = "string";
    /// Array of one element type
    pub const ARRAY: &str = "array";
    /// Nullable value of one element type
    pub const OPTION: &str = "option";
    /// Generic key/value mapping
    pub const MAP: &str = "map";

    /// Any JSON value
    pub const JSON_VALUE: &str = "json.value";
    /// JSON null
    pub const JSON_NULL: &str = "json.null";
    /// JSON boolean
    pub const JSON_BOOL: &str = "json.bool";
    /// JSON number
    pub const JSON_NUMBER: &str = "json.number";
    /// JSON string
    pub const JSON_STRING: &str = "json.string";
    /// JSON array
    pub const JSON_ARRAY: &str = "json.array";
    /// JSON object
    pub const JSON_OBJECT: &str = "json.object";
}
