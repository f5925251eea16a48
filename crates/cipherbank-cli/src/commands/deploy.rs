//! `cipherbank deploy` - provision components and write the record

use std::path::Path;

use anyhow::Context;
use cipherbank_core::{Deployment, EventBusConfig, Principal};

use crate::display;

pub fn run(out: &Path, events: &EventBusConfig) -> anyhow::Result<()> {
    display::section("Deploying Cipherbank components");

    let administrator = Principal::random();
    let deployment = Deployment::provision(administrator, events);
    let record = deployment.record();

    display::kv("administrator", &administrator.to_string());
    for (name, id) in &record.0 {
        display::kv(name, id);
    }

    record
        .save(out)
        .with_context(|| format!("Failed to write deployment record to {}", out.display()))?;

    display::success(&format!("Deployment record written to {}", out.display()));
    Ok(())
}
