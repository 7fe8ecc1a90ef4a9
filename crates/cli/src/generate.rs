use std::fs;
use std::path::PathBuf;

use stencil_api::DescriptorSet;
use stencil_core::{PipelineBuilder, PipelineConfig};
use stencil_plugin::{SettingsDirectory, SourceFileSet};
use tracing::info;

pub fn run(
    descriptors: PathBuf,
    sources: PathBuf,
    settings: Option<PathBuf>,
    max_depth: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(&descriptors)?;
    let set: DescriptorSet = serde_json::from_str(&json)?;
    info!(
        "Loaded {} descriptor file(s) from {}",
        set.files.len(),
        descriptors.display()
    );

    let mut builder = PipelineBuilder::new(set)
        .sources(SourceFileSet::from_directory(&sources)?)
        .config(PipelineConfig {
            max_derivation_depth: max_depth,
        });
    if let Some(dir) = settings {
        builder = builder.settings(SettingsDirectory::new(dir));
    }

    let report = builder.build()?.run()?;

    info!("Generation complete.");
    info!("Events produced: {}", report.events_produced);
    info!("Events derived: {}", report.events_derived);
    info!("Reactions ignored: {}", report.reactions_ignored);
    info!("Files written: {}", report.files_written);
    Ok(())
}
