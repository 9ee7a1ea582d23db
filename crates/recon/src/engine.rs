use crate::config::{LayerConfig, MatchOptions};
use crate::error::ReconError;
use crate::generator::generate_mapping;
use crate::model::{
    AdminSet, FeatureCollection, ReconInput, ReconMeta, ReconResult, SetDiagnostics, Settings,
};
use crate::summary::compute_summary;
use crate::validate::{validate, LevelDiagnostics};

/// Validate both sets, generate the mapping and summarize it.
///
/// Data-quality problems end up in `diagnostics`; they never abort the run.
pub fn run(input: &ReconInput, options: &MatchOptions) -> ReconResult {
    let diagnostics = validate_sets(input);

    let mapping = generate_mapping(
        &input.levels,
        &input.from.settings,
        &input.to.settings,
        options,
    );
    let summary = compute_summary(&mapping);

    for (level, counts) in &summary {
        log::debug!(
            "level '{level}': {} linked, {} added, {} removed",
            counts.linked,
            counts.added,
            counts.removed
        );
    }

    ReconResult {
        meta: ReconMeta {
            project_name: input.project_name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        mapping,
        summary,
        diagnostics,
    }
}

/// Run the validator on both sets.
pub fn validate_sets(input: &ReconInput) -> SetDiagnostics {
    SetDiagnostics {
        from: validate_set(input, &input.from),
        to: validate_set(input, &input.to),
    }
}

fn validate_set(input: &ReconInput, set: &AdminSet) -> LevelDiagnostics {
    let settings: Vec<&Settings> = set.settings.iter().collect();
    validate(&input.levels, &settings)
}

/// Build the settings for one layer from its GeoJSON text.
///
/// `source` labels the text in parse errors (usually the file path).
pub fn load_settings(layer: &LayerConfig, source: &str, geojson: &str) -> Result<Settings, ReconError> {
    let collection = FeatureCollection::from_json_str(source, geojson)?;
    log::debug!(
        "layer '{}': {} features from {source}",
        layer.level,
        collection.len()
    );
    Ok(Settings {
        admin_level: layer.level.clone(),
        collection,
        pointer: layer.pointer.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdminLevel, Pointer, Severity};

    const COUNTRY: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"C":"CO","N":"Colombia"},"geometry":null}
    ]}"#;

    const OLD_DEPTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"C":"05","N":"Antioquia","P":"CO"},"geometry":null},
        {"type":"Feature","properties":{"C":"11","N":"Santafe de Bogota","P":"CO"},"geometry":null}
    ]}"#;

    const NEW_DEPTS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"C":"05","N":"Antioquia","P":"CO"},"geometry":null},
        {"type":"Feature","properties":{"C":"11","N":"Bogota D.C.","P":"CO"},"geometry":null},
        {"type":"Feature","properties":{"C":"99","N":"Vichada"},"geometry":null}
    ]}"#;

    fn layer(level: &str, parent: bool) -> LayerConfig {
        LayerConfig {
            level: level.into(),
            file: format!("{level}.geojson"),
            pointer: Pointer {
                code: Some("C".into()),
                name: Some("N".into()),
                parent_code: parent.then(|| "P".into()),
            },
        }
    }

    fn set(title: &str, depts: &str) -> AdminSet {
        AdminSet {
            title: title.into(),
            settings: vec![
                load_settings(&layer("dept", true), "dept.geojson", depts).unwrap(),
                load_settings(&layer("country", false), "country.geojson", COUNTRY).unwrap(),
            ],
        }
    }

    fn input() -> ReconInput {
        ReconInput {
            project_name: "Colombia".into(),
            levels: vec![
                AdminLevel { key: "dept".into(), name: "Departments".into(), level: 1 },
                AdminLevel { key: "country".into(), name: "Country".into(), level: 0 },
            ],
            from: set("Old", OLD_DEPTS),
            to: set("New", NEW_DEPTS),
        }
    }

    #[test]
    fn run_maps_every_level() {
        let result = run(&input(), &MatchOptions::default());
        assert_eq!(result.meta.project_name, "Colombia");
        assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));

        let dept = result.summary["dept"];
        assert_eq!(dept.linked, 1);
        assert_eq!(dept.added, 2);
        assert_eq!(dept.removed, 1);
        assert_eq!(result.summary["country"].linked, 1);
    }

    #[test]
    fn run_reports_diagnostics_per_set() {
        let result = run(&input(), &MatchOptions::default());
        assert!(result.diagnostics.from["dept"].is_empty());

        let new_dept = &result.diagnostics.to["dept"];
        assert_eq!(new_dept.len(), 1);
        assert_eq!(new_dept[0].severity, Severity::Error);
        assert_eq!(new_dept[0].title, "1 items missing parentCode");
    }

    #[test]
    fn load_settings_reports_source_on_bad_json() {
        let err = load_settings(&layer("dept", true), "old/dept.geojson", "[").unwrap_err();
        assert!(matches!(err, ReconError::GeoJsonParse { ref source, .. } if source == "old/dept.geojson"));
    }
}
