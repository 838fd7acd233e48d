use pdbcomplex::core::io::report::write_report_to_path;
use pdbcomplex::engine::config::AnalysisConfig;
use pdbcomplex::engine::error::ExtractionFailure;
use pdbcomplex::engine::progress::{Progress, ProgressReporter};
use pdbcomplex::engine::store::SnapshotGraphStore;
use pdbcomplex::workflows::analyze::{self, InputPaths};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

const PARTICIPATION: &str = "\
structure_id,assembly_id,entity_id,chain_count,mapped_kind,mapped_id,organism,preferred
1aaa,1,1,2,protein,P1,9606,true
1aaa,1,2,1,protein,P2,9606,true
2bbb,1,1,2,protein,P1,9606,true
2bbb,1,2,1,protein,P2,9606,true
2bbb,1,3,1,protein,P3,9606,true
3ccc,1,1,2,protein,P4,9606,true
4ddd,1,1,3,protein,P4,9606,true
1ABC,1,1,1,protein,P5,9606,true
1ABC,1,2,4,structure-entity,,,true
5eee,1,1,1,protein,P6,9606,true
5eee,2,1,1,protein,P6,9606,false
5eee,3,1,1,protein,\"P7,P8\",9606,true
6fff,1,1,1,unresolved,,,true
";

const COMPLEXES: &str = "\
id\tname\ttaxonomy\tdescriptor\tsource
CPX-1\tP1-P2 dimer\t9606\tP1(2)|P2(1)\tcurated
CPX-2\tOrphan complex\t9606\tP9(1)\tcurated
";

const COMPONENTS: &str = "\
complex\tname\tdatabase\taccession\tstoichiometry
CPX-1\t-\tuniprotkb\tP1\t2
CPX-1\t-\tuniprotkb\tP2\t1
CPX-2\t-\tuniprotkb\tP9\t1
";

const CROSS_REFERENCES: &str = "\
complex\tdatabase\tstructures
CPX-1\tpdb\t1AAA,9xyz_2
CPX-2\tpdb\t7ggg
";

const ORGANISMS: &str = "\
accession\ttaxonomy
P1\t9606
P2\t9606
P9\t9606
";

fn write_inputs(dir: &Path) -> InputPaths {
    let files = [
        ("participation.csv", PARTICIPATION),
        ("complexes.tsv", COMPLEXES),
        ("components.tsv", COMPONENTS),
        ("xrefs.tsv", CROSS_REFERENCES),
        ("organisms.tsv", ORGANISMS),
    ];
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    InputPaths {
        participation: dir.join("participation.csv"),
        complexes: dir.join("complexes.tsv"),
        components: dir.join("components.tsv"),
        cross_references: dir.join("xrefs.tsv"),
        organisms: Some(dir.join("organisms.tsv")),
    }
}

fn setup() -> (TempDir, InputPaths) {
    let dir = tempdir().unwrap();
    let paths = write_inputs(dir.path());
    (dir, paths)
}

#[test]
fn full_workflow_resolves_identities_and_subcomplexes() {
    let (_dir, paths) = setup();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let mut store = SnapshotGraphStore::new();
    let result = analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut store,
        &ProgressReporter::new(),
    )
    .unwrap();

    let ids: Vec<(&str, &str)> = result
        .resolved
        .records
        .iter()
        .map(|(_, r)| (r.id.as_str(), r.canonical_key.as_str()))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("PDB-CPX-1", "P1_2_9606,P2_1_9606"),
            ("PDB-CPX-2", "P1_2_9606,P2_1_9606,P3_1_9606"),
            ("PDB-CPX-3", "P4_2_9606"),
            ("PDB-CPX-4", "P4_3_9606"),
            ("PDB-CPX-5", "NA_1ABC_2_4,P5_1_9606"),
            ("PDB-CPX-6", "P9_1_9606"),
        ]
    );

    // Exact catalog match: one link, and the catalog key is not repeated as an orphan.
    assert_eq!(result.resolved.identity_links.len(), 1);
    assert_eq!(result.resolved.identity_links[0].structural_id, "PDB-CPX-1");
    assert_eq!(result.resolved.identity_links[0].reference_id, "CPX-1");
    assert_eq!(result.resolved.reference_only_count, 1);

    // P1:2,P2:1 is contained in P1:2,P2:1,P3:1; P4:2 and P4:3 are unrelated.
    assert_eq!(result.report.len(), 1);
    let row = &result.report[0];
    assert_eq!(row.complex_id, "PDB-CPX-2");
    assert_eq!(row.subcomplex_id, "PDB-CPX-1");
    assert_eq!(row.complex_participants, "P1_2,P2_1,P3_1");
    assert_eq!(row.subcomplex_participants, "P1_2,P2_1");
    assert_eq!(row.entries, "2bbb");

    // 5eee fails on its unencodable assembly and contributes nothing; 6fff was never resolved.
    let failed: Vec<&str> = result
        .extraction_failures
        .iter()
        .map(ExtractionFailure::structure_id)
        .collect();
    assert_eq!(failed, vec!["5eee", "6fff"]);
    assert!(result
        .resolved
        .records
        .iter()
        .all(|(_, r)| !r.supporting_structures.contains("5eee")));
}

#[test]
fn fallback_participants_match_on_stripped_key_and_keep_their_structure() {
    let (_dir, paths) = setup();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let result = analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut SnapshotGraphStore::new(),
        &ProgressReporter::new(),
    )
    .unwrap();

    let (_, record) = result.resolved.records.by_id("PDB-CPX-5").unwrap();
    let matching = record.composition.matching_key().unwrap();
    assert_eq!(matching.as_str(), "NA_4,P5_1_9606");
    assert!(record.supporting_structures.contains("1abc"));
}

#[test]
fn reference_only_records_keep_catalog_structures() {
    let (_dir, paths) = setup();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let result = analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut SnapshotGraphStore::new(),
        &ProgressReporter::new(),
    )
    .unwrap();

    let (_, orphan) = result.resolved.records.by_id("PDB-CPX-6").unwrap();
    assert_eq!(orphan.origin.reference_id(), Some("CPX-2"));
    assert!(orphan.supporting_structures.contains("7ggg"));
    assert!(result.catalog.warnings().is_empty());
}

#[test]
fn rerunning_against_the_same_snapshot_is_idempotent() {
    let (dir, paths) = setup();
    let graph_path = dir.path().join("graph.json");
    let inputs = analyze::load_inputs(&paths).unwrap();
    let config = AnalysisConfig::default();

    let mut store = SnapshotGraphStore::open(&graph_path).unwrap();
    analyze::run(&inputs, &config, &mut store, &ProgressReporter::new()).unwrap();
    store.save().unwrap();
    let first = fs::read_to_string(&graph_path).unwrap();

    let mut store = SnapshotGraphStore::open(&graph_path).unwrap();
    let result = analyze::run(&inputs, &config, &mut store, &ProgressReporter::new()).unwrap();
    store.save().unwrap();
    let second = fs::read_to_string(&graph_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.snapshot().subcomplex_links.len(), result.lattice.len());
    assert_eq!(store.snapshot().identity_links.len(), 1);
    assert_eq!(store.snapshot().reference_complexes.len(), 2);
}

#[test]
fn report_file_has_header_and_one_row_per_edge() {
    let (dir, paths) = setup();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let result = analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut SnapshotGraphStore::new(),
        &ProgressReporter::new(),
    )
    .unwrap();

    let report_path = dir.path().join("report.csv");
    write_report_to_path(&result.report, &report_path).unwrap();
    let content = fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "PDB_COMPLEX,PDB_COMPLEX_PARTICIPANTS,PDB_SUBCOMPLEX,PDB_SUBCOMPLEX_PARTICIPANTS,PDB_ENTRIES"
    );
    assert_eq!(lines.len(), 1 + result.report.len());
}

#[test]
fn non_preferred_assemblies_do_not_rescue_a_failed_structure() {
    let (_dir, paths) = setup();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let config = AnalysisConfig {
        preferred_assemblies_only: false,
        ..AnalysisConfig::default()
    };
    let result = analyze::run(
        &inputs,
        &config,
        &mut SnapshotGraphStore::new(),
        &ProgressReporter::new(),
    )
    .unwrap();
    assert_eq!(result.resolved.structural_count, 5);
}

#[test]
fn progress_events_cover_every_phase() {
    let (_dir, paths) = setup();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let phases = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event| {
        if let Progress::PhaseStart { name } = event {
            phases.lock().unwrap().push(name);
        }
    }));
    analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut SnapshotGraphStore::new(),
        &reporter,
    )
    .unwrap();
    drop(reporter);

    assert_eq!(
        phases.into_inner().unwrap(),
        vec![
            "Loading Catalog & Extracting Complexes",
            "Resolving Identities",
            "Building Subcomplex Lattice",
            "Materializing Results",
        ]
    );
}

#[test]
fn complex_taxonomy_stands_in_for_a_missing_organism_lookup() {
    let (_dir, mut paths) = setup();
    paths.organisms = None;
    let inputs = analyze::load_inputs(&paths).unwrap();
    let result = analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut SnapshotGraphStore::new(),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.catalog.missing_organism_count(), 0);
    assert_eq!(result.resolved.identity_links.len(), 1);
    assert_eq!(result.resolved.identity_links[0].reference_id, "CPX-1");
    assert_eq!(result.resolved.records.len(), 6);
}

#[test]
fn catalog_components_without_organism_are_reported_and_never_linked() {
    let (dir, mut paths) = setup();
    paths.organisms = None;
    fs::write(
        dir.path().join("complexes.tsv"),
        COMPLEXES.replace("\t9606\t", "\t-\t"),
    )
    .unwrap();
    let inputs = analyze::load_inputs(&paths).unwrap();
    let messages = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event| {
        if let Progress::Message(text) = event {
            messages.lock().unwrap().push(text);
        }
    }));
    let result = analyze::run(
        &inputs,
        &AnalysisConfig::default(),
        &mut SnapshotGraphStore::new(),
        &reporter,
    )
    .unwrap();
    drop(reporter);

    assert_eq!(result.catalog.missing_organism_count(), 3);
    assert!(result.resolved.identity_links.is_empty());
    assert_eq!(result.resolved.structural_count, 5);
    assert_eq!(result.resolved.reference_only_count, 2);
    let (_, orphan) = result.resolved.records.by_id("PDB-CPX-6").unwrap();
    assert_eq!(orphan.canonical_key.as_str(), "P1_2,P2_1");
    assert!(messages
        .into_inner()
        .unwrap()
        .contains(&"3 catalog component(s) have no organism".to_string()));
}
