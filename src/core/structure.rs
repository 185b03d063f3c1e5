use nalgebra::{Matrix3, Vector3};

// ============================================================================
// TRAITS
// ============================================================================

/// Anything the CIF writer can serialize: a cell plus an atom list.
pub trait CifRepresentable {
    fn lattice(&self) -> &Lattice;
    fn atoms(&self) -> &Vec<Atom>;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A periodic cell. Basis vectors are the columns of `matrix`; the
/// crystallographic reciprocal basis (no 2π factor) is the columns of
/// `reciprocal_matrix = inverse(matrix)^T`.
#[derive(Debug, Clone)]
pub struct Lattice {
    pub matrix: Matrix3<f64>,
    pub reciprocal_matrix: Matrix3<f64>,
}

impl Lattice {
    pub fn new(matrix: Matrix3<f64>) -> Result<Self, &'static str> {
        if matrix.determinant().abs() < 1e-6 {
            return Err("Lattice has zero or near-zero volume.");
        }
        let reciprocal_matrix = matrix
            .try_inverse()
            .ok_or("Lattice is not invertible.")?
            .transpose();
        Ok(Self {
            matrix,
            reciprocal_matrix,
        })
    }

    /// Standard cell-parameter construction: `a` along x, `b` in the xy
    /// plane, angles in degrees.
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<Self, &'static str> {
        let alpha_r = alpha.to_radians();
        let beta_r = beta.to_radians();
        let gamma_r = gamma.to_radians();

        let term = 1.0 - alpha_r.cos().powi(2) - beta_r.cos().powi(2) - gamma_r.cos().powi(2)
            + 2.0 * alpha_r.cos() * beta_r.cos() * gamma_r.cos();

        if term <= 0.0 { return Err("Invalid lattice angles."); }

        let v_factor = term.sqrt();
        let matrix = Matrix3::new(
            a, b * gamma_r.cos(), c * beta_r.cos(),
            0.0, b * gamma_r.sin(), c * (alpha_r.cos() - beta_r.cos() * gamma_r.cos()) / gamma_r.sin(),
            0.0, 0.0, c * v_factor / gamma_r.sin(),
        );
        Self::new(matrix)
    }

    /// Axis-aligned cubic cell. Used as the synthetic bounding cell for
    /// carved clusters; `edge` must be positive.
    pub fn cubic(edge: f64) -> Self {
        Self {
            matrix: Matrix3::from_diagonal_element(edge),
            reciprocal_matrix: Matrix3::from_diagonal_element(1.0 / edge),
        }
    }

    pub fn to_cartesian(&self, frac: &Vector3<f64>) -> Vector3<f64> { self.matrix * frac }
    pub fn to_fractional(&self, cart: &Vector3<f64>) -> Vector3<f64> { self.reciprocal_matrix.transpose() * cart }

    /// Lengths of the three basis vectors.
    pub fn lengths(&self) -> [f64; 3] {
        [
            self.matrix.column(0).norm(),
            self.matrix.column(1).norm(),
            self.matrix.column(2).norm(),
        ]
    }

    pub fn to_parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let a = self.matrix.column(0).norm();
        let b = self.matrix.column(1).norm();
        let c = self.matrix.column(2).norm();
        let alpha = (self.matrix.column(1).dot(&self.matrix.column(2)) / (b * c)).acos().to_degrees();
        let beta = (self.matrix.column(0).dot(&self.matrix.column(2)) / (a * c)).acos().to_degrees();
        let gamma = (self.matrix.column(0).dot(&self.matrix.column(1)) / (a * b)).acos().to_degrees();
        (a, b, c, alpha, beta, gamma)
    }
}

/// A species label at a fractional position.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: String,
    pub fractional_coords: Vector3<f64>,
}

/// A periodic bulk structure: lattice plus an ordered atom list.
#[derive(Debug, Clone)]
pub struct Crystal {
    pub lattice: Lattice,
    pub atoms: Vec<Atom>,
}

impl Crystal {
    /// Tiles the cell `reps` times along each basis vector, origin cell
    /// included. The result is again periodic: each basis vector is scaled
    /// by its replication factor and every periodic image becomes a site.
    pub fn supercell(&self, reps: [usize; 3]) -> Crystal {
        let [nx, ny, nz] = reps.map(|n| n.max(1));
        let scale = Vector3::new(nx as f64, ny as f64, nz as f64);

        let mut atoms = Vec::with_capacity(self.atoms.len() * nx * ny * nz);
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let shift = Vector3::new(i as f64, j as f64, k as f64);
                    for atom in &self.atoms {
                        atoms.push(Atom {
                            element: atom.element.clone(),
                            fractional_coords: (atom.fractional_coords + shift).component_div(&scale),
                        });
                    }
                }
            }
        }

        // The reciprocal of a diagonally scaled basis is the old reciprocal
        // scaled by the inverse factors, so no re-inversion is needed.
        let lattice = Lattice {
            matrix: self.lattice.matrix * Matrix3::from_diagonal(&scale),
            reciprocal_matrix: self.lattice.reciprocal_matrix
                * Matrix3::from_diagonal(&scale.map(|s| 1.0 / s)),
        };

        Crystal { lattice, atoms }
    }
}

impl CifRepresentable for Crystal {
    fn lattice(&self) -> &Lattice { &self.lattice }
    fn atoms(&self) -> &Vec<Atom> { &self.atoms }
}

/// The terminal artifact: a non-periodic atom collection inside a synthetic
/// cubic bounding cell. Serialized once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub lattice: Lattice,
    pub atoms: Vec<Atom>,
}

impl CifRepresentable for Cluster {
    fn lattice(&self) -> &Lattice { &self.lattice }
    fn atoms(&self) -> &Vec<Atom> { &self.atoms }
}

// ============================================================================
// COMPOSITION HELPERS
// ============================================================================

/// Greatest Common Divisor (Euclidean algorithm).
fn gcd(a: usize, b: usize) -> usize {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}

/// Species counts in first-encounter order, e.g. [("Ti", 4), ("O", 8)].
pub fn species_counts(atoms: &[Atom]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for atom in atoms {
        match counts.iter_mut().find(|(el, _)| *el == atom.element) {
            Some((_, n)) => *n += 1,
            None => counts.push((atom.element.clone(), 1)),
        }
    }
    counts
}

/// Reduced formula string, e.g. "TiO2" for 4 Ti + 8 O.
pub fn reduced_formula(atoms: &[Atom]) -> String {
    let counts = species_counts(atoms);
    let divisor = counts.iter().fold(0, |acc, (_, n)| gcd(acc, *n)).max(1);
    counts
        .iter()
        .map(|(el, n)| {
            let reduced = n / divisor;
            if reduced == 1 { el.clone() } else { format!("{}{}", el, reduced) }
        })
        .collect()
}
