use std::fs;
use std::path::PathBuf;

use stencil_api::DescriptorSet;
use stencil_core::EventProducer;

pub fn run(descriptors: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let json = fs::read_to_string(&descriptors)?;
    let set: DescriptorSet = serde_json::from_str(&json)?;

    for event in EventProducer::new(&set).events() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
