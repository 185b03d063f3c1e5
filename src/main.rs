use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use wulff_particle_generator::{
    generate_particle, parser, reduced_formula, writer, ApiCredential, CifArchive, Facet,
    ParticleConfig, StructureProvider, DEFAULT_TOLERANCE,
};

#[derive(Parser)]
#[command(author, version, about = "Wulff Nanoparticle Generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Carves an equilibrium-shape nanoparticle out of a bulk crystal.
    Generate {
        /// Database id of the bulk structure (anatase TiO2 by default).
        #[arg(long, default_value = "mp-390")]
        material_id: String,

        /// Read the bulk cell from a local CIF instead of the archive.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory mirroring downloaded database entries.
        #[arg(long, default_value = "structure_archive")]
        archive: PathBuf,

        /// Materials Project API key (falls back to $MP_API_KEY).
        #[arg(long)]
        api_key: Option<String>,

        /// Output file; `.xyz` writes a plain atom list, anything else CIF.
        #[arg(short, long, default_value = "particle.cif")]
        output: PathBuf,

        /// Scale factor (Å) multiplied into every facet energy.
        #[arg(short, long, default_value_t = 30.0)]
        scale: f64,

        /// Facet override as `h,k,l=gamma`; repeatable. Defaults to the
        /// PBE-relaxed anatase table.
        #[arg(long = "facet", value_parser = parse_facet)]
        facets: Vec<Facet>,

        /// Bond cutoff (Å) for the connectivity report.
        #[arg(long, default_value_t = 2.4)]
        bond_cutoff: f64,

        /// Also write the bulk cell (as bulk_cell.cif) before carving.
        #[arg(long)]
        save_cell: bool,

        /// Open the written particle in an external viewer (best effort).
        #[arg(long)]
        view: bool,

        /// Viewer command for --view; the output path is appended.
        #[arg(long, default_value = "ase gui")]
        viewer: String,
    },
}

/// PBE-relaxed anatase surface energies, Lazzeri et al., PRB 63 (2001),
/// Table II. The (103) entry is the faceted termination.
fn anatase_surface_energies() -> Vec<Facet> {
    vec![
        Facet::new([1, 0, 1], 0.49),
        Facet::new([1, 0, 0], 0.58),
        Facet::new([0, 0, 1], 0.98),
        Facet::new([1, 0, 3], 0.90),
    ]
}

/// Parses a `--facet` argument of the form `h,k,l=gamma`.
fn parse_facet(raw: &str) -> Result<Facet, String> {
    let (index_part, gamma_part) = raw
        .split_once('=')
        .ok_or_else(|| "expected 'h,k,l=gamma'".to_string())?;

    let indices: Vec<i32> = index_part
        .split(',')
        .map(|token| token.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| e.to_string())?;
    if indices.len() != 3 {
        return Err(format!("expected three Miller indices, got {}", indices.len()));
    }

    let gamma: f64 = gamma_part.trim().parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if gamma <= 0.0 {
        return Err("surface energy must be positive".to_string());
    }

    Ok(Facet::new([indices[0], indices[1], indices[2]], gamma))
}

fn launch_viewer(command: &str, path: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| anyhow::anyhow!("empty viewer command"))?;

    let status = std::process::Command::new(program)
        .args(parts)
        .arg(path)
        .status()?;
    if !status.success() {
        anyhow::bail!("viewer exited with {}", status);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    match cli.command {
        Commands::Generate {
            material_id, input, archive, api_key,
            output, scale, facets, bond_cutoff,
            save_cell, view, viewer,
        } => {
            println!("--- Wulff Nanoparticle Generator ---");

            if scale <= 0.0 {
                anyhow::bail!("--scale must be positive.");
            }

            // 1. Structure acquisition
            let crystal = match &input {
                Some(path) => {
                    println!("Reading bulk cell from {:?}...", path);
                    parser::from_cif(path)?
                }
                None => {
                    // The credential is checked before any geometry work.
                    let credential = ApiCredential::resolve(api_key)?;
                    println!("Fetching '{}' from the structure archive...", material_id);
                    CifArchive::open(&archive, credential).fetch(&material_id)?
                }
            };
            let formula = reduced_formula(&crystal.atoms);
            println!("-> Loaded {} atoms ({}).", crystal.atoms.len(), formula);

            if save_cell {
                let bulk_path = output.with_file_name("bulk_cell.cif");
                println!("Saving bulk cell to {:?}...", bulk_path);
                writer::to_cif(&crystal, &bulk_path)?;
            }

            // 2. Execution
            let facet_table = if facets.is_empty() {
                anatase_surface_energies()
            } else {
                facets
            };
            println!("Carving Wulff shape with {} facets...", facet_table.len());

            let config = ParticleConfig {
                facets: facet_table,
                scale,
                tolerance: DEFAULT_TOLERANCE,
                bond_cutoff: Some(bond_cutoff),
            };
            let (cluster, report) = generate_particle(&crystal, &config)?;

            println!("\nSuccess!");
            println!("{}", report);

            // 3. Output — written only after the full cluster exists.
            println!("Writing particle to {:?}...", output);
            let comment = format!("{} Wulff cluster", formula);
            writer::write_cluster(&cluster, &comment, &output)?;

            // 4. Optional visualization; never affects the exit status.
            if view {
                println!("Opening viewer...");
                if let Err(e) = launch_viewer(&viewer, &output) {
                    eprintln!("Warning: could not launch viewer: {}", e);
                }
            }

            println!("Done in {:.2?}", start_time.elapsed());
        }
    }

    Ok(())
}
