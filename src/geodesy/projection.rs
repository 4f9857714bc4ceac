use super::EARTH_RADIUS_M;

/// A local tangent-plane projection from WGS84 into the run's configured metric CRS, centred on
/// an origin point. The concrete projection is left unspecified beyond "EPSG:4326 source, the
/// run's configured metric CRS as target"; for a bounded reference region (zones capped at a
/// few square kilometres) an equirectangular approximation centred on the region gives
/// sub-metre distortion, which is what the resolver's topology checks need.
#[derive(Debug, Clone)]
pub struct Projection {
    origin_lon_rad: f64,
    origin_lat_rad: f64,
    target_crs: String,
}

impl Projection {
    pub fn centered_on(origin_lon: f64, origin_lat: f64, target_crs: &str) -> Self {
        Self {
            origin_lon_rad: origin_lon.to_radians(),
            origin_lat_rad: origin_lat.to_radians(),
            target_crs: target_crs.to_string(),
        }
    }

    pub fn target_crs(&self) -> &str {
        &self.target_crs
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lon_rad = lon.to_radians();
        let lat_rad = lat.to_radians();
        let x = EARTH_RADIUS_M * (lon_rad - self.origin_lon_rad) * self.origin_lat_rad.cos();
        let y = EARTH_RADIUS_M * (lat_rad - self.origin_lat_rad);
        (x, y)
    }
}

/// Projects every vertex of a WGS84 ring into the projection's metric CRS, preserving ring
/// order and closure.
pub fn project_ring(ring: &[(f64, f64)], projection: &Projection) -> Vec<(f64, f64)> {
    ring.iter()
        .map(|&(lon, lat)| projection.project(lon, lat))
        .collect()
}
