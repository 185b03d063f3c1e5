use crate::core::structure::{CifRepresentable, Cluster};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes any lattice + atom collection as a P1 CIF.
pub fn to_cif<S: CifRepresentable>(structure: &S, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Could not create {:?}", path))?;
    let mut out = BufWriter::new(file);

    let (a, b, c, alpha, beta, gamma) = structure.lattice().to_parameters();

    writeln!(out, "data_wulff_particle")?;
    writeln!(out, "_symmetry_space_group_name_H-M 'P 1'")?;
    writeln!(out, "_symmetry_Int_Tables_number 1")?;
    writeln!(out, "_cell_length_a    {:.6}", a)?;
    writeln!(out, "_cell_length_b    {:.6}", b)?;
    writeln!(out, "_cell_length_c    {:.6}", c)?;
    writeln!(out, "_cell_angle_alpha {:.6}", alpha)?;
    writeln!(out, "_cell_angle_beta  {:.6}", beta)?;
    writeln!(out, "_cell_angle_gamma {:.6}", gamma)?;
    writeln!(out, "loop_")?;
    writeln!(out, "_atom_site_label")?;
    writeln!(out, "_atom_site_type_symbol")?;
    writeln!(out, "_atom_site_fract_x")?;
    writeln!(out, "_atom_site_fract_y")?;
    writeln!(out, "_atom_site_fract_z")?;

    for (index, atom) in structure.atoms().iter().enumerate() {
        let f = &atom.fractional_coords;
        writeln!(
            out,
            "{}{} {} {:.6} {:.6} {:.6}",
            atom.element, index + 1, atom.element, f.x, f.y, f.z
        )?;
    }

    Ok(())
}

/// Plain atom-list format: a line count header, a comment line, then one
/// `species x y z` line per atom in Cartesian Å with six decimal places.
pub fn to_xyz(cluster: &Cluster, comment: &str, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Could not create {:?}", path))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", cluster.atoms.len())?;
    writeln!(out, "{}", comment)?;
    for atom in &cluster.atoms {
        let pos = cluster.lattice.to_cartesian(&atom.fractional_coords);
        writeln!(out, "{} {:.6} {:.6} {:.6}", atom.element, pos.x, pos.y, pos.z)?;
    }

    Ok(())
}

/// Picks the output format from the path extension. `.xyz` gets the plain
/// atom list; everything else, including no extension, is written as CIF.
pub fn write_cluster(cluster: &Cluster, comment: &str, path: &Path) -> Result<()> {
    let is_xyz = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xyz"))
        .unwrap_or(false);

    if is_xyz {
        to_xyz(cluster, comment, path)
    } else {
        to_cif(cluster, path)
    }
}
