//! The per-level link mapping and its copy-on-write editor.
//!
//! Every editing operation returns a new [`Mapping`] and leaves the receiver
//! untouched. Levels that an edit does not touch are shared with the input.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::Link;

/// Links per admin level key.
///
/// Within one level, a `from` index appears in at most one link, and so does
/// a `to` index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    levels: BTreeMap<String, Arc<Vec<Link>>>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Links of one level, `None` if the level is absent.
    pub fn level(&self, key: &str) -> Option<&[Link]> {
        self.levels.get(key).map(|links| links.as_slice())
    }

    pub fn levels(&self) -> impl Iterator<Item = (&str, &[Link])> {
        self.levels.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// True when both mappings hold the very same allocation for `key`.
    pub fn shares_level(&self, other: &Mapping, key: &str) -> bool {
        match (self.levels.get(key), other.levels.get(key)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// One-sided links of a level: units still waiting for a manual decision.
    pub fn unresolved(&self, key: &str) -> Vec<Link> {
        self.level(key)
            .unwrap_or_default()
            .iter()
            .filter(|l| !l.is_linked())
            .copied()
            .collect()
    }

    /// Link old unit `from` to new unit `to` at `level`.
    ///
    /// Any existing link using `to` or `from` is dropped first. A level that
    /// does not exist yet is created.
    pub fn link_areas(&self, level: &str, to: usize, from: usize) -> Mapping {
        let current = self.level(level).unwrap_or_default();
        let mut links: Vec<Link> = current
            .iter()
            .filter(|l| l.to_index() != Some(to) && l.from_index() != Some(from))
            .copied()
            .collect();
        links.push(Link::linked(from, to));

        log::debug!(
            "level '{level}': linked {from} -> {to}, dropped {} conflicting link(s)",
            current.len() + 1 - links.len()
        );
        self.with_level(level, links)
    }

    /// Split the link `{from, to}` at `level` back into `{to}` and `{from}`.
    ///
    /// If the link using `to` does not also use `from`, nothing changes.
    pub fn unlink_areas(&self, level: &str, to: usize, from: usize) -> Mapping {
        let Some(current) = self.level(level) else {
            log::debug!("level '{level}': unlink {from} -> {to} ignored, no such level");
            return self.clone();
        };

        let Some(pos) = current.iter().position(|l| l.to_index() == Some(to)) else {
            log::debug!("level '{level}': unlink {from} -> {to} ignored, {to} is not linked");
            return self.clone();
        };
        if current[pos].from_index() != Some(from) {
            log::debug!(
                "level '{level}': unlink {from} -> {to} ignored, {to} is linked to {:?}",
                current[pos].from_index()
            );
            return self.clone();
        }

        let mut links = current.to_vec();
        links.remove(pos);
        links.push(Link::added(to));
        links.push(Link::removed(from));
        self.with_level(level, links)
    }

    /// Copy of `self` with one level replaced.
    fn with_level(&self, level: &str, links: Vec<Link>) -> Mapping {
        let mut levels = self.levels.clone();
        levels.insert(level.to_string(), Arc::new(links));
        Mapping { levels }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ReconError> {
        let mapping: Mapping =
            serde_json::from_str(text).map_err(|e| ReconError::MappingParse(e.to_string()))?;
        mapping.check_unique()?;
        Ok(mapping)
    }

    pub fn to_json_string(&self) -> String {
        // Keys are strings and links are plain integers; this cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject persisted mappings that reuse an index within one level.
    fn check_unique(&self) -> Result<(), ReconError> {
        for (key, links) in &self.levels {
            let mut froms = HashSet::new();
            let mut tos = HashSet::new();
            for link in links.iter() {
                if let Some(from) = link.from_index() {
                    if !froms.insert(from) {
                        return Err(ReconError::MappingParse(format!(
                            "level '{key}': 'from' index {from} used more than once"
                        )));
                    }
                }
                if let Some(to) = link.to_index() {
                    if !tos.insert(to) {
                        return Err(ReconError::MappingParse(format!(
                            "level '{key}': 'to' index {to} used more than once"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, Vec<Link>)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Link>)>>(iter: I) -> Self {
        Self {
            levels: iter
                .into_iter()
                .map(|(key, links)| (key, Arc::new(links)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mapping {
        [
            (
                "dept".to_string(),
                vec![Link::added(0), Link::removed(1), Link::linked(0, 1)],
            ),
            ("muni".to_string(), vec![Link::linked(4, 4)]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn link_replaces_conflicting_entries() {
        let m = sample();
        let edited = m.link_areas("dept", 0, 1);
        assert_eq!(
            edited.level("dept").unwrap(),
            &[Link::linked(0, 1), Link::linked(1, 0)]
        );
        // input untouched
        assert_eq!(m, sample());
    }

    #[test]
    fn link_on_new_level_creates_it() {
        let edited = Mapping::new().link_areas("country", 0, 0);
        assert_eq!(edited.level("country").unwrap(), &[Link::linked(0, 0)]);
    }

    #[test]
    fn untouched_levels_are_shared() {
        let m = sample();
        let edited = m.link_areas("dept", 0, 1);
        assert!(edited.shares_level(&m, "muni"));
        assert!(!edited.shares_level(&m, "dept"));
    }

    #[test]
    fn unlink_splits_a_matched_pair() {
        let m = sample();
        let edited = m.unlink_areas("dept", 1, 0);
        assert_eq!(
            edited.level("dept").unwrap(),
            &[Link::added(0), Link::removed(1), Link::added(1), Link::removed(0)]
        );
    }

    #[test]
    fn unlink_with_mismatched_pair_is_ignored() {
        let m = sample();
        assert_eq!(m.unlink_areas("dept", 1, 7), m);
        assert_eq!(m.unlink_areas("dept", 9, 0), m);
        assert_eq!(m.unlink_areas("nowhere", 1, 0), m);
        // an added-only entry has no `from` to match
        assert_eq!(m.unlink_areas("dept", 0, 0), m);
    }

    #[test]
    fn unresolved_lists_one_sided_links() {
        assert_eq!(
            sample().unresolved("dept"),
            vec![Link::added(0), Link::removed(1)]
        );
        assert!(sample().unresolved("muni").is_empty());
        assert!(sample().unresolved("nowhere").is_empty());
    }

    #[test]
    fn json_round_trip() {
        let m = sample();
        let text = m.to_json_string();
        assert!(text.contains(r#""from": 0"#));
        let back = Mapping::from_json_str(&text).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn json_with_repeated_index_is_rejected() {
        let err = Mapping::from_json_str(r#"{ "dept": [ {"to": 1}, {"from": 0, "to": 1} ] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("'to' index 1"));
    }

    #[test]
    fn json_with_empty_link_is_rejected() {
        assert!(Mapping::from_json_str(r#"{ "dept": [ {} ] }"#).is_err());
    }
}
