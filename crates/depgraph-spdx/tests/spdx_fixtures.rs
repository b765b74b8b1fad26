use depgraph_model::Package;
use depgraph_spdx::{Error, ManifestReader};
use std::fs::File;

fn fixture_path(name: &str) -> String {
    format!(
        "{}/../../tests/fixtures/{}",
        env!("CARGO_MANIFEST_DIR"),
        name
    )
}

fn read_fixture(name: &str) -> depgraph_model::Manifest {
    let file = File::open(fixture_path(name)).expect("fixture should be readable");
    ManifestReader::read_json(file, name).expect("fixture should parse")
}

#[test]
fn fixture_simple_project_splits_direct_and_indirect() {
    let manifest = read_fixture("simple.spdx.json");

    assert_eq!(manifest.name(), "simple-project");
    assert!(manifest
        .direct_dependencies()
        .contains(&Package::new("pkg:npm/express@4.18.2")));
    assert!(manifest
        .indirect_dependencies()
        .contains(&Package::new("pkg:npm/accepts@1.3.8")));
    // no identifier sources at all: synthesized generic purl, empty version
    assert!(manifest
        .direct_dependencies()
        .contains(&Package::new("pkg:generic/local-tool@")));
    assert_eq!(manifest.len(), 3);
}

#[test]
fn fixture_scoped_npm_purls_are_repaired() {
    let manifest = read_fixture("scoped-npm.spdx.json");

    let purls: Vec<&str> = manifest
        .direct_dependencies()
        .iter()
        .map(|p| p.purl())
        .collect();
    assert!(purls.contains(&"pkg:npm/%40babel/core@7.23.0"));
    assert!(purls.contains(&"pkg:npm/lodash@4.17.21"));
    assert!(purls.contains(&"pkg:npm/chalk@5.3.0"));
}

#[test]
fn fixture_empty_document_yields_empty_manifest() {
    let manifest = read_fixture("empty.spdx.json");

    assert_eq!(manifest.name(), "empty-project");
    assert!(manifest.is_empty());
}

#[test]
fn fixture_malformed_json_aborts_the_batch() {
    let paths = vec![
        fixture_path("simple.spdx.json"),
        fixture_path("malformed.json"),
        fixture_path("empty.spdx.json"),
    ];

    let result = ManifestReader::read_files(&paths);
    assert!(matches!(result, Err(Error::Parse(_))));
}

#[test]
fn fixture_batch_order_matches_input_order() {
    let paths = vec![
        fixture_path("scoped-npm.spdx.json"),
        fixture_path("simple.spdx.json"),
        fixture_path("empty.spdx.json"),
    ];

    let manifests = ManifestReader::read_files(&paths).expect("fixtures should parse");
    let names: Vec<&str> = manifests.iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["scoped-npm", "simple-project", "empty-project"]);
}
