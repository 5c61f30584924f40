use crate::RegistryOptions;
use anyhow::Result;
use colored::*;
use tracing::info;

/// One registered descriptor and its declared parents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Descriptor as written in `--type`
    pub descriptor: String,
    /// Declared is-a parents, in declaration order
    pub parents: Vec<String>,
}

/// Collect the registered descriptors, sorted by name
pub fn list(options: &RegistryOptions) -> Result<Vec<TypeEntry>> {
    let registry = options.build_registry()?;
    let hierarchy = registry.hierarchy();

    Ok(registry
        .descriptors()
        .into_iter()
        .map(|desc| TypeEntry {
            descriptor: desc.to_string(),
            parents: hierarchy
                .parents(desc.name())
                .iter()
                .map(|p| p.to_string())
                .collect(),
        })
        .collect())
}

pub fn execute(options: &RegistryOptions) -> Result<()> {
    let entries = list(options)?;
    info!("{} registered types", entries.len());

    println!("\n=== Registered Types ===");
    for entry in &entries {
        if entry.parents.is_empty() {
            println!("  {}", entry.descriptor.bold());
        } else {
            println!(
                "  {} {} {}",
                entry.descriptor.bold(),
                "is-a".dimmed(),
                entry.parents.join(", ")
            );
        }
    }
    println!();

    Ok(())
}
