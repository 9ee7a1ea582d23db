use crate::config::MatchOptions;
use crate::mapping::Mapping;
use crate::matcher::match_units;
use crate::model::{AdminLevel, Settings};

/// Match every admin level independently and collect the links.
///
/// A level missing from either side is logged and gets an empty link list;
/// the other levels are still generated.
pub fn generate_mapping(
    admin_levels: &[AdminLevel],
    from: &[Settings],
    to: &[Settings],
    options: &MatchOptions,
) -> Mapping {
    admin_levels
        .iter()
        .map(|level| {
            let from_settings = from.iter().find(|s| s.admin_level == level.key);
            let to_settings = to.iter().find(|s| s.admin_level == level.key);

            let links = match (from_settings, to_settings) {
                (Some(a), Some(b)) => match_units(a, b, options),
                (a, b) => {
                    let missing = match (a.is_none(), b.is_none()) {
                        (true, true) => "both sets",
                        (true, false) => "the old set",
                        _ => "the new set",
                    };
                    log::error!(
                        "admin level '{}' ({}) is missing from {missing}; leaving it unmapped",
                        level.key,
                        level.name
                    );
                    Vec::new()
                }
            };

            (level.key.clone(), links)
        })
        .collect()
}
