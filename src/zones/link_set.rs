use crate::id::Id;
use crate::network::Link;
use nohash_hasher::IntSet;

/// The resolved link classification for one zone. `entry_gateways` and `exit_gateways` overlap
/// exactly for chord links (both endpoints outside the polygon but the link crosses it) — that
/// duplication is intentional; a chord counts as both a gateway in and a gateway out.
#[derive(Debug, Clone, Default)]
pub struct ZoneLinkSet {
    pub all_links: IntSet<Id<Link>>,
    pub entry_gateways: IntSet<Id<Link>>,
    pub exit_gateways: IntSet<Id<Link>>,
    pub interior_links: IntSet<Id<Link>>,
}

impl ZoneLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.all_links.is_empty()
    }
}
