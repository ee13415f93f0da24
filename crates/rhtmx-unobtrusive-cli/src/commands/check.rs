use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::page::LoadedPage;

/// Returns whether every form validated
pub fn execute(file: &Path, config: Option<&Path>, values: &[(String, String)]) -> Result<bool> {
    let mut page = LoadedPage::load(file, config)?;

    for (name, value) in values {
        if page.fill(name, value) == 0 {
            println!("  {} No control named '{}'", "⚠".yellow(), name);
        }
    }

    let errors = page.validate();
    if errors.is_empty() {
        println!(
            "{} {} form(s) valid",
            "✓".green(),
            page.forms.len().to_string().cyan()
        );
        return Ok(true);
    }

    println!("{}", "Validation failed".red().bold());
    println!();
    for error in &errors {
        println!("  {} {}: {}", "✗".red(), error.field.cyan(), error.message);
    }
    println!();
    println!("{} error(s)", errors.len());

    Ok(false)
}
