use crate::id::Id;
use crate::network::Link;
use crate::vehicles::VehicleClass;
use crate::zones::link_set::ZoneLinkSet;
use crate::zones::{Tier, Zone};
use nohash_hasher::{IntMap, IntSet};

/// A link-level ban: this class is forbidden on the attached link during `[start_sec, end_sec)`.
#[derive(Debug, Clone, Copy)]
pub struct BanRule {
    pub vehicle_class: VehicleClass,
    pub start_sec: u32,
    pub end_sec: u32,
}

impl BanRule {
    pub fn matches(&self, vehicle_class: VehicleClass, time_sec: u32) -> bool {
        self.vehicle_class == vehicle_class && time_sec >= self.start_sec && time_sec < self.end_sec
    }
}

/// A tier-2 or tier-3 rule attached to a zone's entry gateways.
#[derive(Debug, Clone, Copy)]
pub struct EnforcementRule {
    pub zone_id: Id<Zone>,
    pub vehicle_class: VehicleClass,
    pub tier: Tier,
    pub start_sec: u32,
    pub end_sec: u32,
    pub penalty: Option<f64>,
    pub interval_sec: Option<u32>,
}

impl EnforcementRule {
    pub fn matches(&self, vehicle_class: VehicleClass, time_sec: u32) -> bool {
        self.vehicle_class == vehicle_class && time_sec >= self.start_sec && time_sec < self.end_sec
    }
}

/// Immutable linkId → rule lookup table built once per run from the resolver's output and the
/// zone/policy list. Safe to share read-only across every thread in a run — there is nothing
/// here that ever mutates after [`ZonePolicyIndex::build`] returns.
#[derive(Debug, Default)]
pub struct ZonePolicyIndex {
    ban_rules: IntMap<Id<Link>, Vec<BanRule>>,
    entry_rules: IntMap<Id<Link>, Vec<EnforcementRule>>,
    exit_zones: IntMap<Id<Link>, IntSet<Id<Zone>>>,
    has_any_bans: bool,
}

impl ZonePolicyIndex {
    pub fn build(zones: &[Zone], link_sets: &[ZoneLinkSet]) -> Self {
        let mut index = Self::default();

        for (zone, link_set) in zones.iter().zip(link_sets.iter()) {
            for policy in &zone.policies {
                match policy.tier {
                    Tier::Exempt => continue,
                    Tier::Ban => {
                        for link_id in &link_set.all_links {
                            index.ban_rules.entry(link_id.clone()).or_default().push(BanRule {
                                vehicle_class: policy.vehicle_class,
                                start_sec: policy.period.start_sec,
                                end_sec: policy.period.end_sec,
                            });
                        }
                        index.has_any_bans = true;
                        index.push_entry_rules(zone, policy, link_set);
                    }
                    Tier::Congestion => {
                        index.push_entry_rules(zone, policy, link_set);
                        for link_id in &link_set.exit_gateways {
                            index
                                .exit_zones
                                .entry(link_id.clone())
                                .or_default()
                                .insert(zone.id.clone());
                        }
                    }
                }
            }
        }

        index
    }

    fn push_entry_rules(
        &mut self,
        zone: &Zone,
        policy: &crate::zones::Policy,
        link_set: &ZoneLinkSet,
    ) {
        for link_id in &link_set.entry_gateways {
            self.entry_rules.entry(link_id.clone()).or_default().push(EnforcementRule {
                zone_id: zone.id.clone(),
                vehicle_class: policy.vehicle_class,
                tier: policy.tier,
                start_sec: policy.period.start_sec,
                end_sec: policy.period.end_sec,
                penalty: policy.penalty,
                interval_sec: policy.interval_sec,
            });
        }
    }

    pub fn is_banned(&self, link_id: &Id<Link>, vehicle_class: VehicleClass, time_sec: u32) -> bool {
        self.ban_rules
            .get(link_id)
            .map(|rules| rules.iter().any(|rule| rule.matches(vehicle_class, time_sec)))
            .unwrap_or(false)
    }

    pub fn entry_rules(&self, link_id: &Id<Link>) -> &[EnforcementRule] {
        self.entry_rules.get(link_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn exit_zones(&self, link_id: &Id<Link>) -> Option<&IntSet<Id<Zone>>> {
        self.exit_zones.get(link_id)
    }

    pub fn has_any_bans(&self) -> bool {
        self.has_any_bans
    }
}
