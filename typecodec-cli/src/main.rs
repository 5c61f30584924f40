use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use typecodec_cli::{commands, MapStyle, RegistryOptions};

#[derive(Parser)]
#[command(name = "typecodec")]
#[command(about = "Typecodec - Type-directed codecs over token streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with codec labels and limits
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Maximum nesting depth (0 for unbounded)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Codec for map<string, json.value>
    #[arg(long, global = true, value_enum, default_value_t = MapStyle::Keyed)]
    map_style: MapStyle,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON document into a token dump
    Encode {
        /// Input JSON file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output file for the token dump (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Declared type of the document
        #[arg(short = 't', long = "type", default_value = "json.value")]
        type_name: String,
    },

    /// Decode a token dump back into a JSON document
    Decode {
        /// Input token dump ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Declared type of the document
        #[arg(short = 't', long = "type", default_value = "json.value")]
        type_name: String,

        /// Pretty-print the document
        #[arg(long)]
        pretty: bool,
    },

    /// Round-trip a JSON document and report the result
    Check {
        /// Input JSON file ("-" for stdin)
        #[arg(short, long)]
        input: String,

        /// Declared type of the document
        #[arg(short = 't', long = "type", default_value = "json.value")]
        type_name: String,
    },

    /// List registered types and their parents
    Types,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout carries command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let options = RegistryOptions {
        config: cli.config,
        max_depth: cli.max_depth,
        map_style: cli.map_style,
    };

    // Execute command
    match cli.command {
        Commands::Encode {
            input,
            output,
            type_name,
        } => commands::encode::execute(&input, output.as_deref(), &type_name, &options),

        Commands::Decode {
            input,
            output,
            type_name,
            pretty,
        } => commands::decode::execute(&input, output.as_deref(), &type_name, pretty, &options),

        Commands::Check { input, type_name } => {
            commands::check::execute(&input, &type_name, &options)
        }

        Commands::Types => commands::types::execute(&options),
    }
}
