/// Ray-casting point-in-ring test. Operates on whatever coordinate system the ring and point
/// are already expressed in; callers classifying network nodes pass projected (x, y) pairs,
/// since that's the CRS network node coordinates come in.
///
/// Points exactly on the boundary are treated as outside; the crossing-number parity test used
/// here is standard and does not special-case them.
pub fn point_in_ring(point: (f64, f64), ring: &[(f64, f64)]) -> bool {
    let (px, py) = point;
    let points = if ring.len() > 1 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    };
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        let crosses = (yi > py) != (yj > py);
        if crosses {
            let x_intersect = xi + (py - yi) * (xj - xi) / (yj - yi);
            if px < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A polygon (outer ring + holes) point-containment test: inside the outer ring and not inside
/// any hole.
pub fn point_in_polygon(point: (f64, f64), rings: &[Vec<(f64, f64)>]) -> bool {
    match rings.split_first() {
        None => false,
        Some((outer, holes)) => {
            point_in_ring(point, outer) && !holes.iter().any(|hole| point_in_ring(point, hole))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<(f64, f64)> {
        vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]
    }

    #[test]
    fn point_well_inside_square_is_inside() {
        assert!(point_in_ring((5.0, 5.0), &unit_square()));
    }

    #[test]
    fn point_well_outside_square_is_outside() {
        assert!(!point_in_ring((50.0, 50.0), &unit_square()));
    }

    #[test]
    fn point_in_hole_is_outside_polygon() {
        let outer = unit_square();
        let hole = vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)];
        let rings = vec![outer, hole];
        assert!(point_in_polygon((5.0, 5.0), &rings) == false);
        assert!(point_in_polygon((1.0, 1.0), &rings));
    }
}
