// Property-based tests for matching and mapping edits.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use dora_recon::canonical::canonicalize;
use dora_recon::config::MatchOptions;
use dora_recon::mapping::Mapping;
use dora_recon::matcher::match_units;
use dora_recon::model::{Feature, FeatureCollection, Link, Pointer, Settings};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small pool with accent variants so canonical collisions are common.
const NAMES: &[&str] = &[
    "Bogotá", "Bogota", "Medellín", "Medellin", "Cali", "Pasto", "Neiva", "Tunja", "Quibdó",
    "Quibdo", "Cúcuta", "Leticia",
];

/// Optional unit name: mostly present, sometimes missing.
fn arb_name() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::weighted(0.85, prop::sample::select(NAMES))
}

fn arb_names() -> impl Strategy<Value = Vec<Option<&'static str>>> {
    prop::collection::vec(arb_name(), 0..10)
}

/// Edit operation: (link?, to, from), indices taken modulo the collection sizes.
fn arb_edits() -> impl Strategy<Value = Vec<(bool, usize, usize)>> {
    prop::collection::vec((prop::bool::ANY, 0usize..16, 0usize..16), 0..24)
}

fn settings(names: &[Option<&str>]) -> Settings {
    let features = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut props = Map::new();
            props.insert("code".into(), json!(i));
            if let Some(name) = name {
                props.insert("name".into(), Value::String(name.to_string()));
            }
            Feature::with_properties(props)
        })
        .collect();
    Settings {
        admin_level: "muni".into(),
        collection: FeatureCollection::new(features),
        pointer: Pointer {
            code: Some("code".into()),
            name: Some("name".into()),
            parent_code: None,
        },
    }
}

fn apply_edits(
    mut mapping: Mapping,
    edits: &[(bool, usize, usize)],
    n_from: usize,
    n_to: usize,
) -> Mapping {
    if n_from == 0 || n_to == 0 {
        return mapping;
    }
    for &(link, to, from) in edits {
        let (to, from) = (to % n_to, from % n_from);
        mapping = if link {
            mapping.link_areas("muni", to, from)
        } else {
            mapping.unlink_areas("muni", to, from)
        };
    }
    mapping
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn canonicalize_is_idempotent(name in r"[a-zA-ZáéíóúüñÁÉÍÓÚÑ \-]{0,24}") {
        let once = canonicalize(&name);
        prop_assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn canonicalize_is_idempotent_on_any_text(name in r"\PC{0,24}") {
        let once = canonicalize(&name);
        prop_assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn every_unit_appears_exactly_once(old in arb_names(), new in arb_names()) {
        let links = match_units(&settings(&old), &settings(&new), &MatchOptions::default());

        let froms: Vec<usize> = links.iter().filter_map(Link::from_index).collect();
        let tos: Vec<usize> = links.iter().filter_map(Link::to_index).collect();
        prop_assert_eq!(sorted(froms), (0..old.len()).collect::<Vec<_>>());
        prop_assert_eq!(sorted(tos), (0..new.len()).collect::<Vec<_>>());
    }

    #[test]
    fn unnamed_units_are_never_auto_linked(old in arb_names(), new in arb_names()) {
        let links = match_units(&settings(&old), &settings(&new), &MatchOptions::default());
        for link in links.iter().filter(|l| l.is_linked()) {
            let (from, to) = (link.from_index().unwrap(), link.to_index().unwrap());
            prop_assert!(old[from].is_some());
            prop_assert!(new[to].is_some());
            prop_assert_eq!(canonicalize(old[from].unwrap()), canonicalize(new[to].unwrap()));
        }
    }

    #[test]
    fn edits_never_reuse_an_index(
        old in arb_names(),
        new in arb_names(),
        edits in arb_edits(),
    ) {
        let generated: Mapping = [(
            "muni".to_string(),
            match_units(&settings(&old), &settings(&new), &MatchOptions::default()),
        )]
        .into_iter()
        .collect();
        let edited = apply_edits(generated, &edits, old.len(), new.len());

        let links = edited.level("muni").unwrap_or_default();
        let mut froms = HashSet::new();
        let mut tos = HashSet::new();
        for link in links {
            prop_assert!(link.from_index().is_some() || link.to_index().is_some());
            if let Some(from) = link.from_index() {
                prop_assert!(froms.insert(from), "from {} used twice", from);
            }
            if let Some(to) = link.to_index() {
                prop_assert!(tos.insert(to), "to {} used twice", to);
            }
        }
    }

    #[test]
    fn unlink_undoes_link(n_from in 1usize..8, n_to in 1usize..8, from in 0usize..8, to in 0usize..8) {
        let (from, to) = (from % n_from, to % n_to);
        let links: Vec<Link> = (0..n_to)
            .map(Link::added)
            .chain((0..n_from).map(Link::removed))
            .collect();
        let start: Mapping = [("muni".to_string(), links)].into_iter().collect();

        let restored = start.link_areas("muni", to, from).unlink_areas("muni", to, from);

        let before: HashSet<Link> = start.level("muni").unwrap().iter().copied().collect();
        let after: HashSet<Link> = restored.level("muni").unwrap().iter().copied().collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(restored.level("muni").unwrap().len(), n_from + n_to);
    }

    #[test]
    fn mapping_json_round_trips(
        old in arb_names(),
        new in arb_names(),
        edits in arb_edits(),
    ) {
        let generated: Mapping = [(
            "muni".to_string(),
            match_units(&settings(&old), &settings(&new), &MatchOptions::default()),
        )]
        .into_iter()
        .collect();
        let mapping = apply_edits(generated, &edits, old.len(), new.len());

        let parsed = Mapping::from_json_str(&mapping.to_json_string()).unwrap();
        prop_assert_eq!(parsed, mapping);
    }
}
