//! `dora list`: one level's links resolved to names and codes.

use std::io;
use std::path::PathBuf;

use dora_recon::listing::Listing;
use dora_recon::model::Code;

use crate::exit_codes::{EXIT_ERROR, EXIT_RUNTIME};
use crate::project::{read_mapping, Project};
use crate::{CliError, ListFormat};

pub fn cmd_list(
    project_path: PathBuf,
    mapping_path: PathBuf,
    level: &str,
    search: &str,
    format: ListFormat,
) -> Result<(), CliError> {
    let project = Project::open(&project_path)?;
    if !project.config.levels.iter().any(|l| l.key == level) {
        let declared: Vec<&str> = project.config.levels.iter().map(|l| l.key.as_str()).collect();
        return Err(CliError::usage(format!("unknown level '{level}'"))
            .with_hint(format!("declared levels: {}", declared.join(", "))));
    }

    let mapping = read_mapping(&mapping_path)?;
    let input = project.load_input()?;

    let (Some(from), Some(to)) = (input.from.settings_for(level), input.to.settings_for(level))
    else {
        return Err(CliError::usage(format!(
            "level '{level}' needs a layer in both the old and the new set"
        )));
    };
    let links = mapping.level(level).unwrap_or_default();
    let listing = Listing::build(links, from, to).filtered(search);

    match format {
        ListFormat::Json => {
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
            println!("{json}");
        }
        ListFormat::Csv => write_csv(&listing)
            .map_err(|e| CliError::new(EXIT_RUNTIME, format!("cannot write CSV: {e}")))?,
    }
    Ok(())
}

/// One row per entry: `status,from,to,from_name,from_code,to_name,to_code`.
fn write_csv(listing: &Listing) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(["status", "from", "to", "from_name", "from_code", "to_name", "to_code"])?;

    for e in &listing.linked {
        wtr.write_record([
            "linked".to_string(),
            e.from.to_string(),
            e.to.to_string(),
            text(&e.from_name),
            code(&e.from_code),
            text(&e.to_name),
            code(&e.to_code),
        ])?;
    }
    for e in &listing.removed {
        wtr.write_record([
            "removed".to_string(),
            e.from.to_string(),
            String::new(),
            text(&e.name),
            code(&e.code),
            String::new(),
            String::new(),
        ])?;
    }
    for e in &listing.added {
        wtr.write_record([
            "added".to_string(),
            String::new(),
            e.to.to_string(),
            String::new(),
            String::new(),
            text(&e.name),
            code(&e.code),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn code(value: &Option<Code>) -> String {
    value.as_ref().map(Code::to_string).unwrap_or_default()
}
