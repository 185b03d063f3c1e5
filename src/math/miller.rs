use crate::core::structure::Lattice;
use crate::error::WulffError;
use nalgebra::Vector3;

/// Converts a Miller index triple into the unit outward normal of the
/// corresponding plane, in Cartesian coordinates.
///
/// The normal is the reciprocal vector g = h·b1 + k·b2 + l·b3 built from
/// the crystallographic reciprocal basis, normalized. For a cubic lattice
/// this reduces to (h, k, l) / ‖(h, k, l)‖; for non-orthogonal cells the
/// reciprocal basis is what keeps the normal perpendicular to the plane.
///
/// Pure function of its inputs. Fails on a degenerate index such as
/// (0 0 0), since a zero-length normal cannot define a half-space.
pub fn miller_to_normal(hkl: [i32; 3], lattice: &Lattice) -> Result<Vector3<f64>, WulffError> {
    let [h, k, l] = hkl;
    let g: Vector3<f64> = lattice.reciprocal_matrix * Vector3::new(h as f64, k as f64, l as f64);
    let g_norm = g.norm();
    if g_norm < 1e-9 {
        return Err(WulffError::DegenerateMiller { h, k, l });
    }
    Ok(g / g_norm)
}
