use std::collections::BTreeMap;

use serde::Serialize;

use crate::mapping::Mapping;
use crate::model::LinkKind;

/// Link counts for one admin level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub linked: usize,
    pub added: usize,
    pub removed: usize,
    pub total: usize,
}

impl LevelSummary {
    /// Units still waiting for a manual decision.
    pub fn unresolved(&self) -> usize {
        self.added + self.removed
    }
}

/// Per-level link counts for a mapping.
pub fn compute_summary(mapping: &Mapping) -> BTreeMap<String, LevelSummary> {
    mapping
        .levels()
        .map(|(key, links)| {
            let mut summary = LevelSummary {
                total: links.len(),
                ..LevelSummary::default()
            };
            for link in links {
                match link.kind() {
                    LinkKind::Linked => summary.linked += 1,
                    LinkKind::Added => summary.added += 1,
                    LinkKind::Removed => summary.removed += 1,
                }
            }
            (key.to_string(), summary)
        })
        .collect()
}
