use crate::config::Config;
use crate::disutility::{BanAwareDisutility, TravelDisutility};
use crate::enforcement::EnforcementHandler;
use crate::error::CoreError;
use crate::events::MoneyEventSink;
use crate::geodesy::Projection;
use crate::network::LinkLookup;
use crate::policy_index::ZonePolicyIndex;
use crate::resolver::ZoneLinkResolver;
use crate::spatial::SpatialLinkIndex;
use crate::vehicles::VehicleClassLookup;
use crate::zones::link_set::ZoneLinkSet;
use crate::zones::Zone;
use std::sync::Arc;

/// Everything a run needs assembled once: the resolved link sets, the immutable policy index,
/// and the handler ready to be registered against the kernel's event manager.
pub struct AssembledScenario {
    pub link_sets: Vec<ZoneLinkSet>,
    pub index: Arc<ZonePolicyIndex>,
    pub handler: Arc<EnforcementHandler>,
    vehicle_classes: Arc<dyn VehicleClassLookup>,
}

impl AssembledScenario {
    /// Wraps a base disutility with the ban-aware layer, but only if the index actually has any
    /// tier-3 policies — otherwise routing runs against the base cost unchanged.
    pub fn wrap_disutility<D: TravelDisutility>(&self, delegate: D) -> Option<BanAwareDisutility<D>> {
        if !self.index.has_any_bans() {
            return None;
        }
        Some(BanAwareDisutility::new(
            self.index.clone(),
            delegate,
            self.vehicle_classes.clone(),
        ))
    }
}

/// Binds the resolver, policy index, enforcement handler and disutility wrapping into a
/// simulation run. Invoked once per run; nothing here mutates state after assembly completes —
/// subsequent mutation is confined to the handler's per-iteration tables.
pub struct ScenarioAssembler;

impl ScenarioAssembler {
    pub fn assemble<N: LinkLookup>(
        zones: &[Zone],
        network: &N,
        spatial_index: &dyn SpatialLinkIndex,
        projection: &Projection,
        config: &Config,
        vehicle_classes: Arc<dyn VehicleClassLookup>,
        sink: Arc<dyn MoneyEventSink>,
    ) -> Result<AssembledScenarioWithDeps, CoreError> {
        if projection.target_crs() != config.target_crs {
            return Err(CoreError::CrsMismatch(format!(
                "projection is centred for {}, but config declares {}",
                projection.target_crs(),
                config.target_crs
            )));
        }

        let resolver = ZoneLinkResolver::new(config.overlap_first_wins);
        let link_sets = resolver.resolve(zones, network, spatial_index, projection)?;
        let index = Arc::new(ZonePolicyIndex::build(zones, &link_sets));
        let handler = Arc::new(EnforcementHandler::new(
            index.clone(),
            vehicle_classes.clone(),
            sink,
        ));

        Ok(AssembledScenarioWithDeps {
            scenario: AssembledScenario {
                link_sets,
                index,
                handler,
                vehicle_classes: vehicle_classes.clone(),
            },
        })
    }
}

/// Thin wrapper so `vehicle_classes` (needed later by `wrap_disutility`) doesn't have to be a
/// public field callers reach into directly.
pub struct AssembledScenarioWithDeps {
    scenario: AssembledScenario,
}

impl std::ops::Deref for AssembledScenarioWithDeps {
    type Target = AssembledScenario;
    fn deref(&self) -> &Self::Target {
        &self.scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::test_support::RecordingSink;
    use crate::id::{reset_id_store, Id};
    use crate::network::{Link, Network, Node};
    use crate::spatial::InMemorySpatialIndex;
    use crate::vehicles::{InternalVehicle, VehicleClass};
    use crate::zones::{Period, Policy, TripMatchMode};
    use serial_test::serial;
    use std::collections::HashSet;

    struct FixedClass(VehicleClass);
    impl VehicleClassLookup for FixedClass {
        fn vehicle_class_of(&self, _vehicle: &Id<InternalVehicle>) -> Option<VehicleClass> {
            Some(self.0)
        }
    }

    fn node(id: &str, x: f64, y: f64) -> Node {
        Node {
            id: Id::create(id),
            x,
            y,
        }
    }

    fn link(id: &str, from: &str, to: &str) -> Link {
        Link {
            id: Id::create(id),
            from: Id::create(from),
            to: Id::create(to),
            length: 100.0,
            freespeed: 13.9,
            capacity: 1000.0,
            lanes: 1.0,
            allowed_modes: vec!["car".to_string()],
            hbefa_road_type: "URB/Local/50".to_string(),
        }
    }

    #[test]
    #[serial]
    fn assembles_index_and_handler_and_installs_disutility_when_banned() {
        reset_id_store();
        let ring = vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.01), (0.0, 0.0)];
        let mut modes = HashSet::new();
        modes.insert(TripMatchMode::Pass);
        let policy = Policy::ban(VehicleClass::HighEmission, Period::new(0, 86_400).unwrap());
        let zone = Zone::new(Id::create("z1"), vec![ring], modes, vec![policy]).unwrap();

        let mut network = Network::new();
        network.add_node(node("a", 2.0, 2.0));
        network.add_node(node("b", 8.0, 8.0));
        network.add_link(link("l_int", "a", "b"));

        let all_ids: Vec<Id<Link>> = network.link_ids().into_iter().collect();
        let index = InMemorySpatialIndex::new(&network, all_ids);
        let projection = Projection::centered_on(0.0, 0.0, "EPSG:25832");
        let config = Config {
            overlap_first_wins: true,
            target_crs: "EPSG:25832".to_string(),
        };

        let assembled = ScenarioAssembler::assemble(
            &[zone],
            &network,
            &index,
            &projection,
            &config,
            Arc::new(FixedClass(VehicleClass::HighEmission)),
            Arc::new(RecordingSink::default()),
        )
        .unwrap();

        assert!(assembled.index.has_any_bans());
        assert_eq!(assembled.link_sets.len(), 1);

        struct ZeroCost;
        impl TravelDisutility for ZeroCost {
            fn cost(
                &self,
                _link: &Id<Link>,
                _time_sec: u32,
                _person: Option<&Id<crate::population::InternalPerson>>,
                _vehicle: Option<&Id<InternalVehicle>>,
            ) -> f64 {
                0.0
            }
            fn min_cost(&self, _link: &Id<Link>) -> f64 {
                0.0
            }
        }

        assert!(assembled.wrap_disutility(ZeroCost).is_some());
    }

    #[test]
    #[serial]
    fn does_not_install_disutility_without_any_bans() {
        reset_id_store();
        let ring = vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.01), (0.0, 0.0)];
        let mut modes = HashSet::new();
        modes.insert(TripMatchMode::Pass);
        let policy =
            Policy::congestion(VehicleClass::MidEmission, Period::new(0, 86_400).unwrap(), 2.5, 600)
                .unwrap();
        let zone = Zone::new(Id::create("z1"), vec![ring], modes, vec![policy]).unwrap();

        let mut network = Network::new();
        network.add_node(node("a", 2.0, 2.0));
        network.add_node(node("b", 8.0, 8.0));
        network.add_link(link("l_int", "a", "b"));

        let all_ids: Vec<Id<Link>> = network.link_ids().into_iter().collect();
        let index = InMemorySpatialIndex::new(&network, all_ids);
        let projection = Projection::centered_on(0.0, 0.0, "EPSG:4326");
        let config = Config::default();

        let assembled = ScenarioAssembler::assemble(
            &[zone],
            &network,
            &index,
            &projection,
            &config,
            Arc::new(FixedClass(VehicleClass::MidEmission)),
            Arc::new(RecordingSink::default()),
        )
        .unwrap();

        assert!(!assembled.index.has_any_bans());

        struct ZeroCost;
        impl TravelDisutility for ZeroCost {
            fn cost(
                &self,
                _link: &Id<Link>,
                _time_sec: u32,
                _person: Option<&Id<crate::population::InternalPerson>>,
                _vehicle: Option<&Id<InternalVehicle>>,
            ) -> f64 {
                0.0
            }
            fn min_cost(&self, _link: &Id<Link>) -> f64 {
                0.0
            }
        }

        assert!(assembled.wrap_disutility(ZeroCost).is_none());
    }

    #[test]
    #[serial]
    fn crs_mismatch_between_projection_and_config_is_rejected() {
        reset_id_store();
        let ring = vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.01), (0.0, 0.0)];
        let mut modes = HashSet::new();
        modes.insert(TripMatchMode::Pass);
        let policy = Policy::ban(VehicleClass::HighEmission, Period::new(0, 86_400).unwrap());
        let zone = Zone::new(Id::create("z1"), vec![ring], modes, vec![policy]).unwrap();

        let mut network = Network::new();
        network.add_node(node("a", 2.0, 2.0));
        network.add_node(node("b", 8.0, 8.0));
        network.add_link(link("l_int", "a", "b"));

        let all_ids: Vec<Id<Link>> = network.link_ids().into_iter().collect();
        let index = InMemorySpatialIndex::new(&network, all_ids);
        let projection = Projection::centered_on(0.0, 0.0, "EPSG:25832");
        let config = Config {
            overlap_first_wins: true,
            target_crs: "EPSG:4326".to_string(),
        };

        let result = ScenarioAssembler::assemble(
            &[zone],
            &network,
            &index,
            &projection,
            &config,
            Arc::new(FixedClass(VehicleClass::HighEmission)),
            Arc::new(RecordingSink::default()),
        );

        assert!(matches!(result, Err(CoreError::CrsMismatch(_))));
    }
}
