//! Library entry for typecodec-cli used by integration tests and embedding.

pub mod commands;
pub mod document;

// Re-export commands for convenience
pub use commands::*;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use typecodec_core::{CodecConfig, CodecRegistry, JsonValue, RegistryBuilder, TypeDescriptor};

/// How a top-level JSON object is mapped onto a map codec
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MapStyle {
    /// One element per entry, labelled by the key
    #[default]
    Keyed,
    /// Entry, key and value wrappers around every entry
    General,
}

/// Settings shared by every subcommand that needs a registry
#[derive(Clone, Debug, Default)]
pub struct RegistryOptions {
    /// JSON file holding a (possibly partial) codec configuration
    pub config: Option<String>,
    /// Overrides the configured depth limit; `Some(0)` removes it
    pub max_depth: Option<usize>,
    /// Codec used for `map<string, json.value>`
    pub map_style: MapStyle,
}

impl RegistryOptions {
    /// Load the configuration and apply the command-line overrides
    pub fn load_config(&self) -> Result<CodecConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid codec configuration in {}", path))?
            }
            None => CodecConfig::default(),
        };

        if let Some(depth) = self.max_depth {
            config.max_depth = if depth == 0 { None } else { Some(depth) };
        }

        Ok(config)
    }

    /// Build the registry used for JSON documents
    pub fn build_registry(&self) -> Result<CodecRegistry> {
        let builder = RegistryBuilder::new().config(self.load_config()?);
        let builder = match self.map_style {
            MapStyle::Keyed => builder.register_string_map::<JsonValue>(TypeDescriptor::JSON_VALUE),
            MapStyle::General => builder.register_map::<String, JsonValue>(
                TypeDescriptor::STRING,
                TypeDescriptor::JSON_VALUE,
            ),
        }
        .and_then(|b| b.register_array::<JsonValue>(TypeDescriptor::JSON_VALUE))?;

        Ok(builder.build())
    }
}

/// Read a whole file, or stdin when `path` is "-"
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    fs::read_to_string(path).with_context(|| format!("Failed to read input file: {}", path))
}

/// Write to a file, or stdout when no path is given
pub fn write_output(path: Option<&str>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write output file: {}", path)),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}
