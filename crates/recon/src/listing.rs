//! Human-facing view of one level's links: linked pairs, removed units and
//! added units, resolved to names and codes.

use serde::Serialize;

use crate::model::{Code, Link, LinkKind, Settings};
use crate::property::{extract_property, Property};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedEntry {
    pub from: usize,
    pub to: usize,
    pub from_name: Option<String>,
    pub from_code: Option<Code>,
    pub to_name: Option<String>,
    pub to_code: Option<Code>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedEntry {
    pub from: usize,
    pub name: Option<String>,
    pub code: Option<Code>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedEntry {
    pub to: usize,
    pub name: Option<String>,
    pub code: Option<Code>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub linked: Vec<LinkedEntry>,
    pub removed: Vec<RemovedEntry>,
    pub added: Vec<AddedEntry>,
}

impl Listing {
    /// Resolve `links` against the old (`from`) and new (`to`) settings of one level.
    ///
    /// Links pointing past the end of a collection are skipped.
    pub fn build(links: &[Link], from: &Settings, to: &Settings) -> Self {
        let mut listing = Listing::default();

        for link in links {
            let from_prop = link.from_index().map(|i| property_at(from, i));
            let to_prop = link.to_index().map(|i| property_at(to, i));

            match (link.kind(), from_prop, to_prop) {
                (LinkKind::Linked, Some(Some(f)), Some(Some(t))) => {
                    listing.linked.push(LinkedEntry {
                        from: f.index,
                        to: t.index,
                        from_name: f.name,
                        from_code: f.code,
                        to_name: t.name,
                        to_code: t.code,
                    });
                }
                (LinkKind::Removed, Some(Some(f)), _) => listing.removed.push(RemovedEntry {
                    from: f.index,
                    name: f.name,
                    code: f.code,
                }),
                (LinkKind::Added, _, Some(Some(t))) => listing.added.push(AddedEntry {
                    to: t.index,
                    name: t.name,
                    code: t.code,
                }),
                _ => log::warn!(
                    "level '{}': link {:?} points outside the collections, skipping",
                    to.admin_level,
                    link
                ),
            }
        }

        listing
    }

    /// Keep entries whose name contains `search`, ignoring case.
    /// A linked entry is kept if either side matches.
    pub fn filtered(self, search: &str) -> Self {
        if search.is_empty() {
            return self;
        }
        let needle = search.to_lowercase();
        let hit = |name: &Option<String>| {
            name.as_ref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        };

        Listing {
            linked: self
                .linked
                .into_iter()
                .filter(|e| hit(&e.from_name) || hit(&e.to_name))
                .collect(),
            removed: self.removed.into_iter().filter(|e| hit(&e.name)).collect(),
            added: self.added.into_iter().filter(|e| hit(&e.name)).collect(),
        }
    }
}

fn property_at(settings: &Settings, index: usize) -> Option<Property> {
    settings
        .collection
        .features
        .get(index)
        .map(|feature| extract_property(&settings.pointer, feature, index))
}
