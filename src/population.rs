use crate::id::Id;
use crate::network::Link;

/// A simulated traveller. The core only ever needs a person's planned trips (as sequences of
/// link ids, possibly with gaps where a route has not been computed yet) to decide whether a
/// leg passes through, starts, or ends inside a zone.
#[derive(Debug, Clone)]
pub struct InternalPerson {
    pub id: Id<InternalPerson>,
    pub plan: Vec<Trip>,
    /// Activity location points, in the run's projected CRS. Consulted only for persons with no
    /// route at all but with at least one activity that falls inside a zone polygon.
    pub activity_locations: Vec<(f64, f64)>,
}

impl InternalPerson {
    pub fn new(id: Id<InternalPerson>, plan: Vec<Trip>, activity_locations: Vec<(f64, f64)>) -> Self {
        Self {
            id,
            plan,
            activity_locations,
        }
    }

    pub fn has_any_routeless_trip(&self) -> bool {
        self.plan.is_empty() || self.plan.iter().any(|trip| trip.route.is_none())
    }
}

/// One leg of a person's day plan. `route` is `None` when the leg has not been routed yet
/// (e.g. the population was loaded before the first routing pass); `start_link`/`end_link` are
/// always known, since they come straight from the activity locations.
#[derive(Debug, Clone)]
pub struct Trip {
    pub start_link: Id<Link>,
    pub end_link: Id<Link>,
    pub route: Option<Vec<Id<Link>>>,
}

impl Trip {
    pub fn new(start_link: Id<Link>, end_link: Id<Link>, route: Option<Vec<Id<Link>>>) -> Self {
        Self {
            start_link,
            end_link,
            route,
        }
    }

    /// The full sequence of links this trip is known to visit, falling back to just the
    /// endpoints when no route has been computed yet. A population filter matching on
    /// `start`/`end`/`pass` trip-match modes uses this rather than re-deriving it.
    pub fn visited_links(&self) -> Vec<Id<Link>> {
        match &self.route {
            Some(route) if !route.is_empty() => route.clone(),
            _ => vec![self.start_link.clone(), self.end_link.clone()],
        }
    }
}
