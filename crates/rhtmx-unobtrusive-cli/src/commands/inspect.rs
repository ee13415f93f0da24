use anyhow::{Context, Result};
use std::path::Path;

use crate::page::LoadedPage;

pub fn execute(file: &Path, config: Option<&Path>, pretty: bool) -> Result<()> {
    let page = LoadedPage::load(file, config)?;
    let report = page.report();

    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("Failed to serialize rules")?;

    println!("{}", json);
    Ok(())
}
