//! `dora map`, `dora validate`, `dora check`.

use std::path::PathBuf;

use serde::Serialize;

use dora_recon::engine::validate_sets;
use dora_recon::model::{ReconResult, SetDiagnostics};
use dora_recon::validate::{error_count, LevelDiagnostics};
use dora_recon::{run, ProjectConfig};

use crate::exit_codes::{EXIT_ERROR, EXIT_UNRESOLVED, EXIT_VALIDATION_ERRORS};
use crate::project::{write_mapping, Project};
use crate::CliError;

/// Full `map --json` document: the engine result plus when it was produced.
#[derive(Serialize)]
struct MapReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    result: &'a ReconResult,
}

pub fn cmd_map(
    project_path: PathBuf,
    output: Option<PathBuf>,
    json: bool,
    strict: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let project = Project::open(&project_path)?;
    let input = project.load_input()?;
    let result = run(&input, &project.config.options);

    if let Some(ref path) = output {
        write_mapping(path, &result.mapping)?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json {
        let report = MapReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            result: &result,
        };
        println!("{}", to_json(&report)?);
    } else if output.is_none() {
        println!("{}", result.mapping.to_json_string());
    }

    if !quiet {
        print_map_summary(&project.config, &result);
    }

    let unresolved: usize = result.summary.values().map(|s| s.unresolved()).sum();
    if strict && unresolved > 0 {
        return Err(CliError::new(
            EXIT_UNRESOLVED,
            format!("{unresolved} unit(s) left unlinked"),
        )
        .with_hint("resolve them with `dora link`, or drop --strict"));
    }

    Ok(())
}

pub fn cmd_validate(project_path: PathBuf, json: bool, quiet: bool) -> Result<(), CliError> {
    let project = Project::open(&project_path)?;
    let input = project.load_input()?;
    let diagnostics = validate_sets(&input);

    if json {
        println!("{}", to_json(&diagnostics)?);
    } else if !quiet {
        print_diagnostics(&project.config, &input.from.title, &diagnostics.from);
        print_diagnostics(&project.config, &input.to.title, &diagnostics.to);
    }

    let errors = total_errors(&diagnostics);
    if errors > 0 {
        return Err(CliError::new(
            EXIT_VALIDATION_ERRORS,
            format!("{errors} validation error(s) found"),
        ));
    }
    if !quiet && !json {
        eprintln!("no validation errors");
    }
    Ok(())
}

pub fn cmd_check(project_path: PathBuf, quiet: bool) -> Result<(), CliError> {
    let project = Project::open(&project_path)?;
    if !quiet {
        let config = &project.config;
        eprintln!(
            "ok: '{}' ({} levels, {} old layers, {} new layers)",
            config.name,
            config.levels.len(),
            config.from.layers.len(),
            config.to.layers.len(),
        );
    }
    Ok(())
}

fn total_errors(diagnostics: &SetDiagnostics) -> usize {
    error_count(&diagnostics.from) + error_count(&diagnostics.to)
}

fn print_map_summary(config: &ProjectConfig, result: &ReconResult) {
    eprintln!("{}", result.meta.project_name);
    for level in config.admin_levels() {
        let Some(s) = result.summary.get(&level.key) else {
            continue;
        };
        eprintln!(
            "  {} ({}): {} linked, {} added, {} removed",
            level.key, level.name, s.linked, s.added, s.removed
        );
    }

    let errors = total_errors(&result.diagnostics);
    if errors > 0 {
        eprintln!("{errors} validation error(s); run `dora validate` for details");
    }
}

fn print_diagnostics(config: &ProjectConfig, title: &str, diagnostics: &LevelDiagnostics) {
    eprintln!("{title}");
    for level in config.admin_levels() {
        let found = diagnostics.get(&level.key).map(Vec::as_slice).unwrap_or_default();
        if found.is_empty() {
            eprintln!("  {} ({}): ok", level.key, level.name);
            continue;
        }
        eprintln!("  {} ({})", level.key, level.name);
        for d in found {
            eprintln!("    {}: {}", d.severity, d.title);
            if let Some(ref description) = d.description {
                eprintln!("      {description}");
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))
}
