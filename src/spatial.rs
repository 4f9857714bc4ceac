use crate::geodesy::point_in_polygon;
use crate::id::Id;
use crate::network::{Link, LinkLookup};
use geo::{BoundingRect, Contains, Coord, Line, LineString, Rect};

/// Capability the resolver needs from the surrounding scenario's spatial store: given a zone's
/// projected rings, return the links whose geometry intersects it. Kept as a trait so a real
/// deployment can delegate to an actual spatial database instead of the in-memory reference
/// below.
pub trait SpatialLinkIndex: Send + Sync {
    fn links_intersecting(&self, rings: &[Vec<(f64, f64)>]) -> Vec<Id<Link>>;
}

/// A reference `SpatialLinkIndex` built directly over a `LinkLookup`'s network, doing the
/// intersection test in-process. Good enough for tests and for deployments that don't have a
/// separate spatial store.
pub struct InMemorySpatialIndex<'a, N: LinkLookup> {
    network: &'a N,
    link_ids: Vec<Id<Link>>,
}

impl<'a, N: LinkLookup> InMemorySpatialIndex<'a, N> {
    pub fn new(network: &'a N, link_ids: Vec<Id<Link>>) -> Self {
        Self { network, link_ids }
    }
}

impl<'a, N: LinkLookup> SpatialLinkIndex for InMemorySpatialIndex<'a, N> {
    fn links_intersecting(&self, rings: &[Vec<(f64, f64)>]) -> Vec<Id<Link>> {
        self.link_ids
            .iter()
            .filter(|id| {
                let Some(link) = self.network.link(id) else {
                    return false;
                };
                link_intersects_rings(link, self.network, rings)
            })
            .cloned()
            .collect()
    }
}

fn link_intersects_rings<N: LinkLookup>(
    link: &Link,
    network: &N,
    rings: &[Vec<(f64, f64)>],
) -> bool {
    // A link whose endpoint is missing from the network can't be geometrically tested; report
    // it as a hit so the resolver's classification pass surfaces the real `NetworkInconsistent`
    // error instead of this index silently dropping it.
    let (Some(from), Some(to)) = (network.node(&link.from), network.node(&link.to)) else {
        return true;
    };
    let a = (from.x, from.y);
    let b = (to.x, to.y);

    let Some(outer) = rings.first() else {
        return false;
    };
    // Cheap bounding-box reject before the exact ray-cast / segment-intersection tests below —
    // the real spatial store behind `SpatialLinkIndex` would do this with an R-tree; here a
    // `geo` bounding rect over the outer ring is enough to skip links nowhere near the zone.
    let Some(bbox) = ring_bounding_rect(outer) else {
        return false;
    };
    if !bbox.contains(&Coord { x: a.0, y: a.1 }) && !bbox.contains(&Coord { x: b.0, y: b.1 }) {
        let link_line = Line::new(Coord { x: a.0, y: a.1 }, Coord { x: b.0, y: b.1 });
        if !rect_intersects_line(&bbox, &link_line) {
            return false;
        }
    }

    if point_in_polygon(a, rings) || point_in_polygon(b, rings) {
        return true;
    }

    ring_edges(outer).any(|(p, q)| segments_intersect(a, b, p, q))
}

fn ring_bounding_rect(ring: &[(f64, f64)]) -> Option<Rect<f64>> {
    let line_string: LineString<f64> = ring.iter().map(|&(x, y)| Coord { x, y }).collect();
    line_string.bounding_rect()
}

/// Whether a link's segment could plausibly cross `rect`'s boundary, used only to decide
/// whether the precise segment-intersection test below is worth running at all.
fn rect_intersects_line(rect: &Rect<f64>, line: &Line<f64>) -> bool {
    let edges = [
        (rect.min(), Coord { x: rect.max().x, y: rect.min().y }),
        (Coord { x: rect.max().x, y: rect.min().y }, rect.max()),
        (rect.max(), Coord { x: rect.min().x, y: rect.max().y }),
        (Coord { x: rect.min().x, y: rect.max().y }, rect.min()),
    ];
    edges.into_iter().any(|(p, q)| {
        segments_intersect(
            (line.start.x, line.start.y),
            (line.end.x, line.end.y),
            (p.x, p.y),
            (q.x, q.y),
        )
    })
}

fn ring_edges(ring: &[(f64, f64)]) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    let points = if ring.len() > 1 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    };
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

fn orientation(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    r.0 <= p.0.max(q.0) && r.0 >= p.0.min(q.0) && r.1 <= p.1.max(q.1) && r.1 >= p.1.min(q.1)
}

fn segments_intersect(p1: (f64, f64), q1: (f64, f64), p2: (f64, f64), q2: (f64, f64)) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);

    if (o1 > 0.0) != (o2 > 0.0) && (o3 > 0.0) != (o4 > 0.0) {
        return true;
    }

    (o1 == 0.0 && on_segment(p1, q1, p2))
        || (o2 == 0.0 && on_segment(p1, q1, q2))
        || (o3 == 0.0 && on_segment(p2, q2, p1))
        || (o4 == 0.0 && on_segment(p2, q2, q1))
}
