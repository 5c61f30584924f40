use crate::document::{self, Shape};
use crate::{read_input, write_output, RegistryOptions};
use anyhow::{Context, Result};
use tracing::info;
use typecodec_core::Token;

pub fn execute(
    input: &str,
    output: Option<&str>,
    type_name: &str,
    pretty: bool,
    options: &RegistryOptions,
) -> Result<()> {
    info!("Decoding {} as {}", input, type_name);

    let registry = options.build_registry()?;
    let shape = Shape::parse(&registry, type_name)?;

    let text = read_input(input)?;
    let tokens: Vec<Token> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse token dump: {}", input))?;
    info!("Read {} tokens", tokens.len());

    let doc = document::decode(&registry, &shape, &tokens)
        .with_context(|| format!("Failed to decode {} as {}", input, shape.descriptor()))?;

    write_output(output, &document::render_document(&doc, pretty)?)
}
