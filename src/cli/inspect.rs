use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use structfeed::table::{Lookup, Table};

/// Decode a captured message and print it
pub fn run(file: PathBuf, json: bool, path: Option<String>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let bytes = std::fs::read(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let table = structfeed::decode(&bytes)
        .with_context(|| format!("Failed to decode {}", file.display()))?;

    info!("File: {}", file.display());
    info!(
        "Decoded {} bytes into {} fields ({} values, depth {})",
        bytes.len(),
        table.len(),
        table.data().len(),
        table.depth()
    );

    let table = match path.as_deref() {
        None => table,
        Some(path) => match table.lookup(path) {
            Some(Lookup::Struct(sub)) => sub,
            Some(Lookup::Data(values)) => {
                if json {
                    println!("{}", serde_json::to_string(&values)?);
                } else {
                    println!("{}: {:?}", path, values);
                }
                return Ok(());
            }
            None => anyhow::bail!("No field at path '{}'", path),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&table.to_value())?);
    } else {
        print_tree(&table);
    }

    Ok(())
}

#[cfg(feature = "colorized_output")]
fn print_tree(table: &Table) {
    use console::style;

    for line in table.to_string().lines() {
        if line.ends_with('/') {
            println!("{}", style(line).cyan().bold());
        } else {
            println!("{}", line);
        }
    }
}

#[cfg(not(feature = "colorized_output"))]
fn print_tree(table: &Table) {
    print!("{}", table);
}
