//! JSON documents and the declared type they are encoded as

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use typecodec_core::{
    json::build, CodecRegistry, Dynamic, JsonValue, Token, TypeDescriptor,
};

/// The Rust shape a document is encoded through
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    /// A [`JsonValue`] under `json.value` or one of its variant types
    Value(TypeDescriptor),
    /// A top-level object as `map<string, json.value>`
    Object,
    /// A top-level array as `array<json.value>`
    Array,
    /// A value under the top type, wrapped with its runtime type
    Dynamic,
}

impl Shape {
    /// Pick the shape for a declared type such as `json.value` or `map<string, json.value>`
    pub fn parse(registry: &CodecRegistry, type_name: &str) -> Result<Self> {
        let desc: TypeDescriptor = type_name
            .parse()
            .with_context(|| format!("Invalid type: {}", type_name))?;

        if desc.is_top() {
            return Ok(Shape::Dynamic);
        }
        if desc == TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::JSON_VALUE) {
            return Ok(Shape::Object);
        }
        if desc == TypeDescriptor::array(TypeDescriptor::JSON_VALUE) {
            return Ok(Shape::Array);
        }
        if desc.args().is_empty()
            && registry
                .hierarchy()
                .is_a(desc.name(), TypeDescriptor::JSON_VALUE.name())
        {
            return Ok(Shape::Value(desc));
        }

        bail!("Type {} cannot carry a JSON document", desc)
    }

    /// Declared descriptor for this shape
    pub fn descriptor(&self) -> TypeDescriptor {
        match self {
            Shape::Value(desc) => desc.clone(),
            Shape::Object => TypeDescriptor::map(TypeDescriptor::STRING, TypeDescriptor::JSON_VALUE),
            Shape::Array => TypeDescriptor::array(TypeDescriptor::JSON_VALUE),
            Shape::Dynamic => TypeDescriptor::OBJECT,
        }
    }
}

fn check_variant(registry: &CodecRegistry, desc: &TypeDescriptor, doc: &JsonValue) -> Result<()> {
    let actual = doc.descriptor();
    if !registry.hierarchy().is_a(actual.name(), desc.name()) {
        bail!("Document is a {}, expected {}", actual, desc);
    }
    Ok(())
}

/// Parse JSON text into a document; repeated keys are rejected and number text is kept
pub fn parse_document(text: &str) -> Result<JsonValue> {
    serde_json::from_str(text).context("Invalid JSON document")
}

/// Render a document as JSON text
pub fn render_document(doc: &JsonValue, pretty: bool) -> Result<String> {
    let value = doc.to_serde()?;
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

/// Encode a document through `shape`
pub fn encode(registry: &CodecRegistry, shape: &Shape, doc: &JsonValue) -> Result<Vec<Token>> {
    let desc = shape.descriptor();
    let tokens = match shape {
        Shape::Value(_) => {
            check_variant(registry, &desc, doc)?;
            registry.to_tokens(&desc, doc)?
        }
        Shape::Object => {
            let object = doc
                .as_object()
                .ok_or_else(|| anyhow!("Document is a {}, expected an object", doc.descriptor()))?;
            let map: IndexMap<String, JsonValue> = object
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
            registry.to_tokens(&desc, &map)?
        }
        Shape::Array => {
            let items = doc
                .as_array()
                .ok_or_else(|| anyhow!("Document is a {}, expected an array", doc.descriptor()))?;
            registry.to_tokens(&desc, &items.to_vec())?
        }
        Shape::Dynamic => {
            let dynamic = Dynamic::new(doc.descriptor(), doc.clone());
            registry.to_tokens(&desc, &dynamic)?
        }
    };
    Ok(tokens)
}

/// Decode a document through `shape`
pub fn decode(registry: &CodecRegistry, shape: &Shape, tokens: &[Token]) -> Result<JsonValue> {
    let desc = shape.descriptor();
    let doc = match shape {
        Shape::Value(_) => {
            let doc: JsonValue = registry.from_tokens(&desc, tokens)?;
            check_variant(registry, &desc, &doc)?;
            doc
        }
        Shape::Object => {
            let map: IndexMap<String, JsonValue> = registry.from_tokens(&desc, tokens)?;
            build::obj(map)?
        }
        Shape::Array => {
            let items: Vec<JsonValue> = registry.from_tokens(&desc, tokens)?;
            build::arr(items)
        }
        Shape::Dynamic => {
            let dynamic: Dynamic = registry.from_tokens(&desc, tokens)?;
            dynamic
                .downcast_ref::<JsonValue>()
                .cloned()
                .ok_or_else(|| anyhow!("Decoded {} is not a JSON value", dynamic.descriptor()))?
        }
    };
    Ok(doc)
}
