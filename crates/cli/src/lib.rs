mod events;
mod generate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stencil",
    version,
    about = "An event-driven code generation pipeline for schema descriptors",
    long_about = "Stencil walks a compiled descriptor set, turns every declaration into a \
                  stream of compiler events, folds those events through registered policies \
                  and views, and lets renderers fill insertion points in the generated \
                  sources. Edits are staged in memory and written back only when the whole \
                  run succeeds."
)]
pub struct Cli {
    /// Mirror log output to stderr in addition to the log file
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the generation pipeline over a descriptor set
    #[command(
        long_about = "Loads a JSON descriptor set, produces the compiler event stream, folds \
                      it through any built-in policies and views, runs the renderers, and \
                      writes changed files back under the source root. A failure in any \
                      phase leaves the source root untouched."
    )]
    Generate {
        /// Path to the JSON descriptor set
        #[arg(value_name = "DESCRIPTOR_SET")]
        descriptors: PathBuf,
        /// Root directory of the generated sources to annotate
        #[arg(value_name = "SOURCE_ROOT")]
        sources: PathBuf,
        /// Settings directory (defaults to SOURCE_ROOT/.stencil-settings)
        #[arg(long, value_name = "DIR")]
        settings: Option<PathBuf>,
        /// Override the derivation-depth bound of the policy fixpoint loop
        #[arg(long, value_name = "DEPTH")]
        max_depth: Option<usize>,
    },
    /// Dump the compiler event stream for a descriptor set
    #[command(
        long_about = "Walks the descriptor set without running any policies or renderers and \
                      prints every compiler event as one JSON object per line. Useful for \
                      checking what a plugin would receive."
    )]
    Events {
        /// Path to the JSON descriptor set
        #[arg(value_name = "DESCRIPTOR_SET")]
        descriptors: PathBuf,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Generate { .. } => "generate",
        Commands::Events { .. } => "events",
    };
    let _guard = stencil_core::logging::init_logging(component, cli.log_stderr);

    match cli.command {
        Commands::Generate {
            descriptors,
            sources,
            settings,
            max_depth,
        } => generate::run(descriptors, sources, settings, max_depth),
        Commands::Events { descriptors } => events::run(descriptors),
    }
}
