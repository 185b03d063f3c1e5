use crate::core::facet::Facet;
use crate::core::structure::{Atom, Cluster, Crystal, Lattice};
use crate::error::WulffError;
use crate::math::miller;
use nalgebra::Vector3;

// --- STRICT TYPE DEFINITIONS FOR CLARITY ---
type Cartesian3 = Vector3<f64>;

/// Padding added on every side of the cluster bounding box, in Å.
const BOX_PADDING: f64 = 5.0;
/// Smallest allowed edge for the synthetic bounding cell, in Å. Guards
/// against a near-zero container for single-atom or degenerate clusters.
const MIN_BOX_EDGE: f64 = 20.0;
/// Extra margin added on top of the circumscribing diameter when sizing
/// the supercell, in Å.
const COVERAGE_MARGIN: f64 = 5.0;
/// Default slack for atoms sitting exactly on a facet plane.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Cuts a Wulff polyhedron out of a periodic supercell.
///
/// The polyhedron is the intersection of the slabs `|n_i · r| <= d_i` with
/// `d_i = scale * γ_i`, centered on the centroid of all supercell atoms.
pub struct WulffCarver {
    normals: Vec<Cartesian3>,
    distances: Vec<f64>,
    tolerance: f64,
}

impl WulffCarver {
    /// Resolves every facet into a (unit normal, scaled distance) pair
    /// against the given lattice. Fails on an empty table or on any
    /// degenerate Miller index.
    pub fn from_facets(facets: &[Facet], scale: f64, lattice: &Lattice) -> Result<Self, WulffError> {
        if facets.is_empty() {
            return Err(WulffError::NoFacets);
        }

        let mut normals = Vec::with_capacity(facets.len());
        let mut distances = Vec::with_capacity(facets.len());
        for facet in facets {
            normals.push(miller::miller_to_normal(facet.hkl, lattice)?);
            distances.push(scale * facet.gamma);
        }

        Ok(Self {
            normals,
            distances,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Largest scaled facet distance, i.e. the half-width of the widest slab.
    pub fn max_distance(&self) -> f64 {
        self.distances.iter().cloned().fold(0.0, f64::max)
    }

    /// Radius the supercell must cover so that no facet runs out of
    /// periodic images before it runs out of polyhedron.
    pub fn coverage_radius(&self) -> f64 {
        2.0 * self.max_distance() + COVERAGE_MARGIN
    }

    /// True when `r` (in centered Cartesian coordinates) satisfies every
    /// facet inequality. Facet order never changes the outcome, only how
    /// early a miss bails out.
    pub fn satisfies_all(&self, r: &Cartesian3) -> bool {
        self.normals
            .iter()
            .zip(&self.distances)
            .all(|(n, d)| n.dot(r).abs() <= d + self.tolerance)
    }

    /// Filters the supercell atoms through every half-space and re-embeds
    /// the survivors in a fresh non-periodic cubic cell.
    pub fn carve(&self, supercell: &Crystal) -> Result<Cluster, WulffError> {
        if supercell.atoms.is_empty() {
            return Err(WulffError::EmptyCluster);
        }

        // 1. Center on the centroid of ALL atom positions, not on a lattice
        //    point. Centering anywhere else skews the faceting.
        let cart_coords: Vec<Cartesian3> = supercell
            .atoms
            .iter()
            .map(|atom| supercell.lattice.to_cartesian(&atom.fractional_coords))
            .collect();

        let mut centroid = Vector3::zeros();
        for pos in &cart_coords {
            centroid += pos;
        }
        centroid /= cart_coords.len() as f64;

        // 2. Half-space filter, survivors in encounter order.
        let mut survivors: Vec<(String, Cartesian3)> = Vec::new();
        for (atom, pos) in supercell.atoms.iter().zip(&cart_coords) {
            let centered = pos - centroid;
            if self.satisfies_all(&centered) {
                survivors.push((atom.element.clone(), centered));
            }
        }

        if survivors.is_empty() {
            return Err(WulffError::EmptyCluster);
        }

        // 3. Padded bounding box around the survivors; the fixed floor keeps
        //    the cell usable for very small clusters.
        let mut min = Vector3::repeat(f64::INFINITY);
        let mut max = Vector3::repeat(f64::NEG_INFINITY);
        for (_, pos) in &survivors {
            min = min.inf(pos);
            max = max.sup(pos);
        }
        let min = min.add_scalar(-BOX_PADDING);
        let max = max.add_scalar(BOX_PADDING);
        let edge = (max - min).max().max(MIN_BOX_EDGE);

        // 4. Re-express against the new cell, box minimum as the origin.
        let lattice = Lattice::cubic(edge);
        let atoms = survivors
            .into_iter()
            .map(|(element, pos)| Atom {
                element,
                fractional_coords: (pos - min) / edge,
            })
            .collect();

        Ok(Cluster { lattice, atoms })
    }
}
