use crate::document::{self, Shape};
use crate::{read_input, RegistryOptions};
use anyhow::{bail, Context, Result};
use colored::*;
use tracing::info;

/// Round-trip a JSON document and report whether it came back unchanged
pub fn execute(input: &str, type_name: &str, options: &RegistryOptions) -> Result<()> {
    info!("Checking {}", input);

    let registry = options.build_registry()?;
    let shape = Shape::parse(&registry, type_name)?;

    let text = read_input(input)?;
    let doc = document::parse_document(&text)
        .with_context(|| format!("Failed to parse input file: {}", input))?;

    println!("\n=== Round Trip ===");
    println!("Type:          {}", shape.descriptor());

    let tokens = match document::encode(&registry, &shape, &doc) {
        Ok(tokens) => {
            println!("{} Encoded {} tokens", "✓".green(), tokens.len());
            tokens
        }
        Err(e) => {
            println!("{} Encode failed: {:#}", "✗".red(), e);
            bail!("Round trip failed");
        }
    };

    let back = match document::decode(&registry, &shape, &tokens) {
        Ok(back) => {
            println!("{} Decoded", "✓".green());
            back
        }
        Err(e) => {
            println!("{} Decode failed: {:#}", "✗".red(), e);
            bail!("Round trip failed");
        }
    };

    if back != doc {
        println!("{} Decoded document differs from input", "✗".red());
        bail!("Round trip failed");
    }

    println!("{} Document round-trips unchanged", "✓".green());
    Ok(())
}
