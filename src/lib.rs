// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod analysis;
pub mod core;
pub mod error;
pub mod io;
pub mod math;
pub mod provider;
pub mod synthesis;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::core::facet::Facet;
pub use crate::core::structure::{reduced_formula, species_counts, Atom, Cluster, Crystal, Lattice};
pub use crate::error::WulffError;
pub use crate::io::{parser, writer};

pub use crate::analysis::connectivity::FragmentAnalyzer;
pub use crate::provider::{ApiCredential, CifArchive, StructureProvider};
pub use crate::synthesis::carver::{WulffCarver, DEFAULT_TOLERANCE};
pub use crate::synthesis::supercell::SupercellBuilder;

use anyhow::Result;

// ============================================================================
// HIGH-LEVEL INTERFACE
// ============================================================================

/// Configuration for the nanoparticle construction pipeline.
#[derive(Debug, Clone)]
pub struct ParticleConfig {
    /// Ordered facet table; each entry becomes one half-space.
    pub facets: Vec<Facet>,
    /// Scale factor (Å) turning each surface energy into an absolute
    /// half-space distance d = scale · γ.
    pub scale: f64,
    /// Slack applied to every facet inequality.
    pub tolerance: f64,
    /// Bond cutoff (Å) for the fragment report; `None` skips the check.
    pub bond_cutoff: Option<f64>,
}

/// The Master Pipeline function.
///
/// Carves the equilibrium Wulff shape defined by `config.facets` out of the
/// bulk `crystal` and returns the non-periodic cluster together with a
/// human-readable report. Single pass, no partial output: any failure in
/// facet resolution or carving aborts the whole run.
pub fn generate_particle(crystal: &Crystal, config: &ParticleConfig) -> Result<(Cluster, String)> {
    // 1. GEOMETRY PHASE
    // Every facet is resolved against the bulk lattice before anything is
    // tiled, so a degenerate Miller index fails fast.
    let carver = WulffCarver::from_facets(&config.facets, config.scale, &crystal.lattice)?
        .with_tolerance(config.tolerance);

    // 2. TILING PHASE
    let radius = carver.coverage_radius();
    let builder = SupercellBuilder::new(radius);
    let reps = builder.replication_counts(&crystal.lattice);
    let supercell = builder.build(crystal);

    // 3. CARVING PHASE
    let cluster = carver.carve(&supercell)?;

    // 4. ANALYSIS PHASE (diagnostic only)
    let connectivity_note = match config.bond_cutoff {
        Some(cutoff) => {
            let sizes = FragmentAnalyzer::new(cutoff).fragment_sizes(&cluster);
            if sizes.len() > 1 {
                format!(
                    "{} fragments (largest: {} atoms) — consider a larger scale",
                    sizes.len(),
                    sizes[0]
                )
            } else {
                "single connected particle".to_string()
            }
        }
        None => "skipped".to_string(),
    };

    // 5. REPORT GENERATION
    let facet_list = config
        .facets
        .iter()
        .map(|f| format!("{} γ={:.2}", f, f.gamma))
        .collect::<Vec<_>>()
        .join(", ");
    let composition = species_counts(&cluster.atoms)
        .iter()
        .map(|(el, n)| format!("{}{}", el, n))
        .collect::<Vec<_>>()
        .join(" ");

    let report = format!(
        "--- Wulff Construction Report ---\n\
         • Facets:          {}\n\
         • Scale:           {:.2} Å per unit surface energy\n\
         • Coverage radius: {:.2} Å\n\
         • Supercell:       {}x{}x{} ({} sites)\n\
         • Cluster:         {} atoms ({}), box edge {:.2} Å\n\
         • Connectivity:    {}",
        facet_list,
        config.scale,
        radius,
        reps[0], reps[1], reps[2],
        supercell.atoms.len(),
        cluster.atoms.len(),
        composition,
        cluster.lattice.lengths()[0],
        connectivity_note
    );

    Ok((cluster, report))
}
