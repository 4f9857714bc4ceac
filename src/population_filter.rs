use crate::error::CoreError;
use crate::geodesy::point_in_polygon;
use crate::id::Id;
use crate::network::Link;
use crate::population::InternalPerson;
use crate::zones::link_set::ZoneLinkSet;
use crate::zones::{TripMatchMode, Zone};
use itertools::izip;
use nohash_hasher::IntSet;

/// Real backends batch IN-clause queries against the source-population store at this many link
/// ids per query, to respect the backing store's parameter limit. The in-memory
/// `PopulationFilter` below doesn't need to batch anything itself — it's a hook for a real
/// `PopulationSource` to honor when translating a zone's link set into a query.
pub const LINK_ID_QUERY_BATCH_SIZE: usize = 500;

/// A custom or scaled simulation area: not one of the request's zones, but selected into the
/// working population the same way.
pub struct SimulationArea {
    pub rings_projected: Vec<Vec<(f64, f64)>>,
    pub link_ids: IntSet<Id<Link>>,
}

/// Selects, out of a source population, the persons whose trips or activities fall inside the
/// request's zones or custom simulation areas.
pub struct PopulationFilter;

impl PopulationFilter {
    /// `zone_rings_projected` must be parallel to `zones`/`link_sets` (same projection the
    /// resolver used) so routeless-person activity checks run in the same CRS as the link sets.
    pub fn select(
        zones: &[Zone],
        link_sets: &[ZoneLinkSet],
        zone_rings_projected: &[Vec<Vec<(f64, f64)>>],
        persons: &[InternalPerson],
        custom_areas: &[SimulationArea],
    ) -> Result<IntSet<Id<InternalPerson>>, CoreError> {
        let mut selected: IntSet<Id<InternalPerson>> = IntSet::default();

        for (zone, link_set, rings) in izip!(zones, link_sets, zone_rings_projected) {
            for person in persons {
                if selected.contains(&person.id) {
                    continue;
                }
                if Self::person_matches_zone(zone, link_set, rings, person) {
                    selected.insert(person.id.clone());
                }
            }
        }

        for area in custom_areas {
            for person in persons {
                if selected.contains(&person.id) {
                    continue;
                }
                if Self::person_touches_area(area, person) {
                    selected.insert(person.id.clone());
                }
            }
        }

        if selected.is_empty() {
            return Err(CoreError::EmptyPopulation(
                "no person matched any requested zone or simulation area".to_string(),
            ));
        }

        Ok(selected)
    }

    fn person_matches_zone(
        zone: &Zone,
        link_set: &ZoneLinkSet,
        rings_projected: &[Vec<(f64, f64)>],
        person: &InternalPerson,
    ) -> bool {
        if zone.match_modes.contains(&TripMatchMode::Start) {
            if let Some(first_trip) = person.plan.first() {
                if let Some(first_link) = first_trip.visited_links().first() {
                    if link_set.all_links.contains(first_link) {
                        return true;
                    }
                }
            }
        }

        if zone.match_modes.contains(&TripMatchMode::End) {
            let matches_end = person.plan.iter().any(|trip| {
                trip.visited_links()
                    .last()
                    .map(|link| link_set.all_links.contains(link))
                    .unwrap_or(false)
            });
            if matches_end {
                return true;
            }
        }

        if zone.match_modes.contains(&TripMatchMode::Pass) {
            let matches_pass = person
                .plan
                .iter()
                .any(|trip| trip.visited_links().iter().any(|link| link_set.all_links.contains(link)));
            if matches_pass {
                return true;
            }
        }

        person.has_any_routeless_trip()
            && person
                .activity_locations
                .iter()
                .any(|&point| point_in_polygon(point, rings_projected))
    }

    fn person_touches_area(area: &SimulationArea, person: &InternalPerson) -> bool {
        let touches_link = person
            .plan
            .iter()
            .any(|trip| trip.visited_links().iter().any(|link| area.link_ids.contains(link)));
        if touches_link {
            return true;
        }
        person.has_any_routeless_trip()
            && person
                .activity_locations
                .iter()
                .any(|&point| point_in_polygon(point, &area.rings_projected))
    }
}
