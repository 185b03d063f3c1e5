use std::path::{Path, PathBuf};
use wulff_particle_generator::{
    generate_particle, parser, reduced_formula, writer, ApiCredential, CifArchive, Facet,
    ParticleConfig, StructureProvider, WulffError, DEFAULT_TOLERANCE,
};

fn sample_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("sample_inputs")
        .join(name)
}

/// PBE-relaxed anatase table, same entries the CLI defaults to.
fn anatase_facets() -> Vec<Facet> {
    vec![
        Facet::new([1, 0, 1], 0.49),
        Facet::new([1, 0, 0], 0.58),
        Facet::new([0, 0, 1], 0.98),
        Facet::new([1, 0, 3], 0.90),
    ]
}

fn anatase_config(scale: f64) -> ParticleConfig {
    ParticleConfig {
        facets: anatase_facets(),
        scale,
        tolerance: DEFAULT_TOLERANCE,
        bond_cutoff: Some(2.4),
    }
}

#[test]
fn parses_the_anatase_sample() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).expect("Failed to parse CIF");

    assert_eq!(crystal.atoms.len(), 12);
    assert_eq!(reduced_formula(&crystal.atoms), "TiO2");

    let (a, b, c, alpha, _beta, _gamma) = crystal.lattice.to_parameters();
    assert!((a - 3.7845).abs() < 1e-4);
    assert!((b - 3.7845).abs() < 1e-4);
    assert!((c - 9.5143).abs() < 1e-4);
    assert!((alpha - 90.0).abs() < 1e-6);
}

#[test]
fn generates_a_particle_from_the_sample() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).unwrap();

    let (cluster, report) = generate_particle(&crystal, &anatase_config(12.0)).unwrap();

    assert!(!cluster.atoms.is_empty(), "carved cluster has no atoms");
    for atom in &cluster.atoms {
        let f = &atom.fractional_coords;
        assert!(f.x >= 0.0 && f.x <= 1.0);
        assert!(f.y >= 0.0 && f.y <= 1.0);
        assert!(f.z >= 0.0 && f.z <= 1.0);
    }

    assert!(report.contains("Cluster:"));
    assert!(report.contains("Connectivity:"));
}

#[test]
fn pipeline_is_deterministic() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).unwrap();
    let config = anatase_config(10.0);

    let (first, _) = generate_particle(&crystal, &config).unwrap();
    let (second, _) = generate_particle(&crystal, &config).unwrap();

    assert_eq!(first.atoms.len(), second.atoms.len());
    assert_eq!(first.atoms.first(), second.atoms.first());
    assert_eq!(first.atoms.last(), second.atoms.last());
}

#[test]
fn larger_scale_never_loses_atoms() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).unwrap();

    let (small, _) = generate_particle(&crystal, &anatase_config(8.0)).unwrap();
    let (large, _) = generate_particle(&crystal, &anatase_config(12.0)).unwrap();

    assert!(large.atoms.len() >= small.atoms.len());
}

#[test]
fn vanishing_scale_is_an_empty_result() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).unwrap();

    let result = generate_particle(&crystal, &anatase_config(1e-8));
    let error = result.expect_err("a vanishing scale must not produce a cluster");
    assert!(matches!(
        error.downcast_ref::<WulffError>(),
        Some(WulffError::EmptyCluster)
    ));
}

#[test]
fn writes_the_plain_atom_list_format() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).unwrap();
    let (cluster, _) = generate_particle(&crystal, &anatase_config(8.0)).unwrap();

    let out = std::env::temp_dir().join("wulff_pipeline_test.xyz");
    writer::write_cluster(&cluster, "TiO2 Wulff cluster", &out).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines[0].parse::<usize>().unwrap(), cluster.atoms.len());
    assert_eq!(lines[1], "TiO2 Wulff cluster");
    assert_eq!(lines.len(), cluster.atoms.len() + 2);

    let fields: Vec<&str> = lines[2].split_whitespace().collect();
    assert_eq!(fields.len(), 4);
    for field in &fields[1..] {
        field.parse::<f64>().expect("coordinate column must be numeric");
    }
}

#[test]
fn written_cif_parses_back() {
    let crystal = parser::from_cif(&sample_path("anatase.cif")).unwrap();
    let (cluster, _) = generate_particle(&crystal, &anatase_config(8.0)).unwrap();

    let out = std::env::temp_dir().join("wulff_pipeline_test.cif");
    writer::write_cluster(&cluster, "", &out).unwrap();

    let reread = parser::from_cif(&out).unwrap();
    assert_eq!(reread.atoms.len(), cluster.atoms.len());

    let expected_edge = cluster.lattice.lengths()[0];
    let (a, b, c, _, _, _) = reread.lattice.to_parameters();
    assert!((a - expected_edge).abs() < 1e-4);
    assert!((b - expected_edge).abs() < 1e-4);
    assert!((c - expected_edge).abs() < 1e-4);
}

#[test]
fn archive_serves_locally_mirrored_entries() {
    let credential = ApiCredential::resolve(Some("test-key".to_string())).unwrap();
    let archive = CifArchive::open(sample_path(""), credential);

    let crystal = archive.fetch("anatase").expect("archived entry should load");
    assert_eq!(crystal.atoms.len(), 12);
}

#[test]
fn archive_miss_surfaces_as_a_retrieval_error() {
    let credential = ApiCredential::resolve(Some("test-key".to_string())).unwrap();
    let archive = CifArchive::open(std::env::temp_dir().join("wulff_empty_archive"), credential);

    // No mirrored entry and no fetch helper on the test host.
    let result = archive.fetch("mp-does-not-exist");
    assert!(matches!(result, Err(WulffError::Retrieval { .. })));
}

#[test]
fn missing_credential_fails_before_any_work() {
    std::env::remove_var(ApiCredential::ENV_VAR);

    assert!(matches!(
        ApiCredential::resolve(None),
        Err(WulffError::MissingApiKey)
    ));
    assert!(matches!(
        ApiCredential::resolve(Some(String::new())),
        Err(WulffError::MissingApiKey)
    ));
    assert!(ApiCredential::resolve(Some("abc123".to_string())).is_ok());
}
