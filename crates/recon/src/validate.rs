//! Single-set consistency checks: missing and duplicate codes, missing names,
//! and parent-code referential integrity between consecutive levels.
//!
//! Findings are accumulated as [`Diagnostic`]s; nothing here fails.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{AdminLevel, Code, Diagnostic, Settings, Severity};
use crate::property::{extract_properties, Property};

/// Diagnostics per admin level key.
pub type LevelDiagnostics = BTreeMap<String, Vec<Diagnostic>>;

/// Check one level's properties. The root level is exempt from the parent-code check.
pub fn validate_settings(settings: &Settings, is_root: bool) -> Vec<Diagnostic> {
    check_properties(&extract_properties(settings), is_root)
}

/// Every defined parent code in `child` must be a code present in `parent`.
pub fn validate_relation(parent: &Settings, child: &Settings) -> Vec<Diagnostic> {
    check_relation(&extract_properties(parent), &extract_properties(child))
}

/// Validate the settings of one admin set.
///
/// Levels are taken root-to-leaf by ordinal and settings are found by level
/// key. Only the first level is exempt from the parent-code check, and a
/// level's parent codes are checked against the level right above it. When
/// that level has no settings the reference check is skipped.
///
/// Every level in `admin_levels` gets an entry, empty when nothing was found.
pub fn validate(admin_levels: &[AdminLevel], settings: &[&Settings]) -> LevelDiagnostics {
    let mut levels: Vec<&AdminLevel> = admin_levels.iter().collect();
    levels.sort_by_key(|l| l.level);

    let properties: Vec<Option<Vec<Property>>> = levels
        .iter()
        .map(|level| {
            settings
                .iter()
                .find(|s| s.admin_level == level.key)
                .map(|s| extract_properties(s))
        })
        .collect();

    let mut out = LevelDiagnostics::new();
    for (i, level) in levels.iter().enumerate() {
        let mut found = Vec::new();
        if let Some(props) = &properties[i] {
            found.extend(check_properties(props, i == 0));
            match i.checked_sub(1).map(|p| (levels[p], &properties[p])) {
                Some((_, Some(parent))) => found.extend(check_relation(parent, props)),
                Some((parent, None)) => log::debug!(
                    "level '{}': parent level '{}' has no layer, parentCode references not checked",
                    level.key,
                    parent.key
                ),
                None => {}
            }
        }
        if !found.is_empty() {
            log::debug!("level '{}': {} diagnostic(s)", level.key, found.len());
        }
        out.insert(level.key.clone(), found);
    }

    out
}

/// Number of error-severity diagnostics across all levels.
pub fn error_count(diagnostics: &LevelDiagnostics) -> usize {
    diagnostics
        .values()
        .flatten()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

fn check_properties(properties: &[Property], is_root: bool) -> Vec<Diagnostic> {
    let mut errors = Vec::new();

    errors.extend(missing(properties, "code", |p| p.code.is_some()));
    errors.extend(duplicate_codes(properties));
    if !is_root {
        errors.extend(missing(properties, "parentCode", |p| p.parent_code.is_some()));
    }
    errors.extend(missing(properties, "name", |p| p.name.is_some()));

    errors
}

fn check_relation(parent: &[Property], child: &[Property]) -> Vec<Diagnostic> {
    let parent_codes: HashSet<&Code> = parent.iter().filter_map(|p| p.code.as_ref()).collect();

    let bad: Vec<usize> = child
        .iter()
        .filter(|p| {
            p.parent_code
                .as_ref()
                .is_some_and(|code| !parent_codes.contains(code))
        })
        .map(|p| p.index)
        .collect();

    if bad.is_empty() {
        return Vec::new();
    }
    vec![Diagnostic::error(
        format!("{} items have invalid parentCode", bad.len()),
        format!("Index: {}", join_indices(&bad)),
    )]
}

fn missing(
    properties: &[Property],
    field: &str,
    present: impl Fn(&Property) -> bool,
) -> Option<Diagnostic> {
    let empty: Vec<usize> = properties
        .iter()
        .filter(|p| !present(p))
        .map(|p| p.index)
        .collect();

    if empty.is_empty() {
        return None;
    }
    Some(Diagnostic::error(
        format!("{} items missing {field}", empty.len()),
        format!("Index: {}", join_indices(&empty)),
    ))
}

/// Exact-equality duplicate detection, reported in order of first appearance.
fn duplicate_codes(properties: &[Property]) -> Option<Diagnostic> {
    let mut order: Vec<&Code> = Vec::new();
    let mut seen: HashMap<&Code, Vec<usize>> = HashMap::new();
    for p in properties {
        if let Some(code) = &p.code {
            let indices = seen.entry(code).or_default();
            if indices.is_empty() {
                order.push(code);
            }
            indices.push(p.index);
        }
    }

    let duplicated: Vec<(&Code, &Vec<usize>)> = order
        .into_iter()
        .map(|code| (code, &seen[code]))
        .filter(|(_, indices)| indices.len() > 1)
        .collect();

    if duplicated.is_empty() {
        return None;
    }

    let items: usize = duplicated.iter().map(|(_, indices)| indices.len()).sum();
    let listing: Vec<String> = duplicated
        .iter()
        .map(|(code, indices)| format!("{code} (index {})", join_indices(indices)))
        .collect();

    Some(Diagnostic::error(
        format!("{items} items have duplicate code"),
        format!("Code: {}", listing.join(", ")),
    ))
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
