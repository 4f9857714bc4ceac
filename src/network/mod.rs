use crate::id::Id;
use nohash_hasher::{IntMap, IntSet};

/// A road-network node in the run's projected (metric) CRS.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: Id<Node>,
    pub x: f64,
    pub y: f64,
}

/// A road-network link. `allowed_modes` and `hbefa_road_type` are carried through for the
/// collaborators that need them (mode-filtered routing, emissions modelling) but are not
/// interpreted here.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: Id<Link>,
    pub from: Id<Node>,
    pub to: Id<Node>,
    pub length: f64,
    pub freespeed: f32,
    pub capacity: f32,
    pub lanes: f32,
    pub allowed_modes: Vec<String>,
    pub hbefa_road_type: String,
}

/// Minimal capability the core needs from the surrounding scenario's road network: resolve a
/// link or node id to its data. Kept as a trait (rather than requiring the concrete `Network`
/// below) per the "dependency injection by interface" design note, so a collaborator can hand
/// the core a view over its own network representation without copying it.
pub trait LinkLookup: Send + Sync {
    fn link(&self, id: &Id<Link>) -> Option<&Link>;
    fn node(&self, id: &Id<Node>) -> Option<&Node>;
}

/// A plain in-memory road network, good enough as both the reference `LinkLookup`
/// implementation and as test fixture data.
#[derive(Debug, Default)]
pub struct Network {
    pub nodes: IntMap<Id<Node>, Node>,
    pub links: IntMap<Id<Link>, Link>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            nodes: IntMap::default(),
            links: IntMap::default(),
        }
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.insert(link.id.clone(), link);
    }

    pub fn link_ids(&self) -> IntSet<Id<Link>> {
        self.links.keys().cloned().collect()
    }
}

impl LinkLookup for Network {
    fn link(&self, id: &Id<Link>) -> Option<&Link> {
        self.links.get(id)
    }

    fn node(&self, id: &Id<Node>) -> Option<&Node> {
        self.nodes.get(id)
    }
}
