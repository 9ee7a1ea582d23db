//! `dora link` and `dora unlink`: manual edits to a persisted mapping.

use std::path::PathBuf;

use crate::project::{read_mapping, write_mapping};
use crate::CliError;

pub fn cmd_link(
    mapping_path: PathBuf,
    level: &str,
    to: usize,
    from: usize,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mapping = read_mapping(&mapping_path)?;
    if mapping.level(level).is_none() {
        tracing::warn!("level '{level}' is not in the mapping yet; creating it");
    }
    let edited = mapping.link_areas(level, to, from);

    let dest = output.unwrap_or(mapping_path);
    write_mapping(&dest, &edited)?;
    if !quiet {
        eprintln!("{level}: linked {from} -> {to} ({})", dest.display());
    }
    Ok(())
}

pub fn cmd_unlink(
    mapping_path: PathBuf,
    level: &str,
    to: usize,
    from: usize,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mapping = read_mapping(&mapping_path)?;
    let edited = mapping.unlink_areas(level, to, from);
    let changed = edited != mapping;

    let dest = output.unwrap_or(mapping_path);
    write_mapping(&dest, &edited)?;
    if !quiet {
        if changed {
            eprintln!("{level}: unlinked {from} -> {to} ({})", dest.display());
        } else {
            eprintln!("{level}: {from} -> {to} is not a link; mapping unchanged");
        }
    }
    Ok(())
}
