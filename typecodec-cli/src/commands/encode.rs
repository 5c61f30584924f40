use crate::document::{self, Shape};
use crate::{read_input, write_output, RegistryOptions};
use anyhow::{Context, Result};
use tracing::info;

pub fn execute(
    input: &str,
    output: Option<&str>,
    type_name: &str,
    options: &RegistryOptions,
) -> Result<()> {
    info!("Encoding {} as {}", input, type_name);

    let registry = options.build_registry()?;
    let shape = Shape::parse(&registry, type_name)?;

    let text = read_input(input)?;
    let doc = document::parse_document(&text)
        .with_context(|| format!("Failed to parse input file: {}", input))?;

    let tokens = document::encode(&registry, &shape, &doc)
        .with_context(|| format!("Failed to encode {} as {}", input, shape.descriptor()))?;
    info!("Encoded {} tokens", tokens.len());

    let dump = serde_json::to_string_pretty(&tokens)?;
    write_output(output, &dump)?;

    if let Some(path) = output {
        info!("Wrote token dump to {}", path);
    }

    Ok(())
}
