use crate::error::CoreError;
use crate::geodesy::{project_ring, Projection};
use crate::id::Id;
use crate::network::{Link, LinkLookup};
use crate::spatial::SpatialLinkIndex;
use crate::zones::link_set::ZoneLinkSet;
use crate::zones::Zone;
use ahash::AHashMap;
use nohash_hasher::{IntMap, IntSet};

/// Resolves a zone list + road network into one disjoint [`ZoneLinkSet`] per zone.
pub struct ZoneLinkResolver {
    overlap_first_wins: bool,
}

impl ZoneLinkResolver {
    pub fn new(overlap_first_wins: bool) -> Self {
        Self { overlap_first_wins }
    }

    pub fn resolve<N: LinkLookup>(
        &self,
        zones: &[Zone],
        network: &N,
        spatial_index: &dyn SpatialLinkIndex,
        projection: &Projection,
    ) -> Result<Vec<ZoneLinkSet>, CoreError> {
        let projected_rings: AHashMap<u64, Vec<Vec<(f64, f64)>>> = zones
            .iter()
            .map(|zone| {
                let rings = zone
                    .rings
                    .iter()
                    .map(|ring| project_ring(ring, projection))
                    .collect();
                (zone.id.internal(), rings)
            })
            .collect();

        let raw_sets: AHashMap<u64, IntSet<Id<Link>>> = zones
            .iter()
            .map(|zone| {
                let rings = &projected_rings[&zone.id.internal()];
                let raw: IntSet<Id<Link>> =
                    spatial_index.links_intersecting(rings).into_iter().collect();
                (zone.id.internal(), raw)
            })
            .collect();

        let order: Vec<&Zone> = if self.overlap_first_wins {
            zones.iter().collect()
        } else {
            zones.iter().rev().collect()
        };

        let mut claimed: IntSet<Id<Link>> = IntSet::default();
        let mut disjoint: AHashMap<u64, IntSet<Id<Link>>> = AHashMap::new();
        for zone in order {
            let raw = &raw_sets[&zone.id.internal()];
            let remainder: IntSet<Id<Link>> =
                raw.iter().filter(|id| !claimed.contains(*id)).cloned().collect();
            claimed.extend(remainder.iter().cloned());
            disjoint.insert(zone.id.internal(), remainder);
        }

        zones
            .iter()
            .map(|zone| {
                self.classify(
                    &disjoint[&zone.id.internal()],
                    &projected_rings[&zone.id.internal()],
                    network,
                    projection,
                )
            })
            .collect()
    }

    fn classify<N: LinkLookup>(
        &self,
        link_ids: &IntSet<Id<Link>>,
        rings: &[Vec<(f64, f64)>],
        network: &N,
        projection: &Projection,
    ) -> Result<ZoneLinkSet, CoreError> {
        let mut set = ZoneLinkSet::new();
        for link_id in link_ids {
            let link = network.link(link_id).ok_or_else(|| {
                CoreError::NetworkInconsistent(format!(
                    "link {} in resolved set has no network entry (crs {})",
                    link_id,
                    projection.target_crs()
                ))
            })?;
            let from = network.node(&link.from).ok_or_else(|| {
                CoreError::NetworkInconsistent(format!(
                    "link {} references unknown from-node {} (crs {})",
                    link_id,
                    link.from,
                    projection.target_crs()
                ))
            })?;
            let to = network.node(&link.to).ok_or_else(|| {
                CoreError::NetworkInconsistent(format!(
                    "link {} references unknown to-node {} (crs {})",
                    link_id,
                    link.to,
                    projection.target_crs()
                ))
            })?;

            let from_in = crate::geodesy::point_in_polygon::point_in_polygon((from.x, from.y), rings);
            let to_in = crate::geodesy::point_in_polygon::point_in_polygon((to.x, to.y), rings);

            set.all_links.insert(link_id.clone());
            match (from_in, to_in) {
                (false, true) => {
                    set.entry_gateways.insert(link_id.clone());
                }
                (true, false) => {
                    set.exit_gateways.insert(link_id.clone());
                }
                (true, true) => {
                    set.interior_links.insert(link_id.clone());
                }
                (false, false) => {
                    // Chord: both endpoints outside but the link crosses the polygon. It counts
                    // as both a gateway in and a gateway out on the same event.
                    set.entry_gateways.insert(link_id.clone());
                    set.exit_gateways.insert(link_id.clone());
                }
            }
        }
        Ok(set)
    }
}

/// Dense linkId → index mapping used by the policy index to back its rule tables with plain
/// vectors instead of per-link allocations.
pub fn dense_link_index(network_link_ids: impl IntoIterator<Item = Id<Link>>) -> IntMap<Id<Link>, usize> {
    network_link_ids
        .into_iter()
        .enumerate()
        .map(|(idx, id)| (id, idx))
        .collect()
}
