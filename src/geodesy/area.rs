use super::EARTH_RADIUS_M;

/// Signed geodesic area of a closed WGS84 ring on a sphere of radius
/// [`EARTH_RADIUS_M`](super::EARTH_RADIUS_M), via the shoelace-on-sphere sum
/// Σ(λ_{i+1}−λ_{i−1})·sin(φ_i), scaled by R²/2. Absolute value is taken so ring winding
/// direction never matters to callers.
pub fn signed_geodesic_area_m2(ring: &[(f64, f64)]) -> f64 {
    let points = if ring.len() > 1 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    };
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let lon_next = points[(i + 1) % n].0.to_radians();
        let lon_prev = points[(i + n - 1) % n].0.to_radians();
        let lat = points[i].1.to_radians();
        sum += (lon_next - lon_prev) * lat.sin();
    }

    (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}
