use std::collections::HashMap;

use serde::Serialize;

use crate::canonical::canonicalize;
use crate::config::MatchOptions;
use crate::model::{Link, Settings};
use crate::property::{extract_properties, Property};

/// Outcome of matching one admin level, as per-collection indices.
///
/// `*_from` indices point into the old collection, `*_to` into the new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelMatch {
    /// Unique names only present in the new collection.
    pub added: Vec<usize>,
    /// Unique names only present in the old collection.
    pub removed: Vec<usize>,
    /// Same canonical name, differing raw name, code or parent code. `(from, to)`.
    pub modified: Vec<(usize, usize)>,
    /// Same canonical name and identical raw name, code and parent code. `(from, to)`.
    pub unmodified: Vec<(usize, usize)>,
    /// Unnamed or duplicate-named units in the old collection.
    pub invalid_from: Vec<usize>,
    /// Unnamed or duplicate-named units in the new collection.
    pub invalid_to: Vec<usize>,
}

impl LevelMatch {
    /// Flatten into links: added, invalid new, removed, invalid old, modified,
    /// then unmodified when `options.emit_unmodified` is set.
    pub fn into_links(self, options: &MatchOptions) -> Vec<Link> {
        let mut links = Vec::with_capacity(
            self.added.len()
                + self.invalid_to.len()
                + self.removed.len()
                + self.invalid_from.len()
                + self.modified.len()
                + self.unmodified.len(),
        );

        links.extend(self.added.into_iter().map(Link::added));
        links.extend(self.invalid_to.into_iter().map(Link::added));
        links.extend(self.removed.into_iter().map(Link::removed));
        links.extend(self.invalid_from.into_iter().map(Link::removed));
        links.extend(self.modified.into_iter().map(|(from, to)| Link::linked(from, to)));
        if options.emit_unmodified {
            links.extend(self.unmodified.into_iter().map(|(from, to)| Link::linked(from, to)));
        }

        links
    }
}

/// Match two versions of one admin level by canonical name.
///
/// A name that is missing, or shared by several units of the same collection
/// (after canonicalization), is never auto-matched.
pub fn match_level(from: &Settings, to: &Settings) -> LevelMatch {
    let from_props = extract_properties(from);
    let to_props = extract_properties(to);

    let (from_valid, invalid_from) = partition(&from_props);
    let (to_valid, invalid_to) = partition(&to_props);

    let from_map: HashMap<&str, &Property> =
        from_valid.iter().map(|(name, p)| (name.as_str(), *p)).collect();
    let to_map: HashMap<&str, &Property> =
        to_valid.iter().map(|(name, p)| (name.as_str(), *p)).collect();

    let mut result = LevelMatch {
        invalid_from,
        invalid_to,
        ..LevelMatch::default()
    };

    for (name, from_prop) in &from_valid {
        match to_map.get(name.as_str()) {
            Some(to_prop) if same_unit(from_prop, to_prop) => {
                result.unmodified.push((from_prop.index, to_prop.index));
            }
            Some(to_prop) => result.modified.push((from_prop.index, to_prop.index)),
            None => result.removed.push(from_prop.index),
        }
    }

    for (name, to_prop) in &to_valid {
        if !from_map.contains_key(name.as_str()) {
            result.added.push(to_prop.index);
        }
    }

    log::debug!(
        "level '{}': {} added, {} removed, {} modified, {} unmodified, {}/{} unresolved",
        to.admin_level,
        result.added.len(),
        result.removed.len(),
        result.modified.len(),
        result.unmodified.len(),
        result.invalid_from.len(),
        result.invalid_to.len(),
    );

    result
}

/// Match one admin level and return its links.
pub fn match_units(from: &Settings, to: &Settings, options: &MatchOptions) -> Vec<Link> {
    match_level(from, to).into_links(options)
}

/// Split into uniquely named properties (keyed by canonical name) and the rest.
/// Both halves keep collection order.
fn partition(properties: &[Property]) -> (Vec<(String, &Property)>, Vec<usize>) {
    let canonical: Vec<Option<String>> = properties
        .iter()
        .map(|p| p.name.as_deref().map(canonicalize))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in canonical.iter().flatten() {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }

    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for (p, name) in properties.iter().zip(&canonical) {
        match name {
            Some(name) if counts[name.as_str()] == 1 => valid.push((name.clone(), p)),
            _ => invalid.push(p.index),
        }
    }

    (valid, invalid)
}

fn same_unit(a: &Property, b: &Property) -> bool {
    a.name == b.name && a.code == b.code && a.parent_code == b.parent_code
}
