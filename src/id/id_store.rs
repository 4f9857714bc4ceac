use dashmap::DashMap;
use std::sync::Arc;

use crate::id::serializable_type::StableTypeId;
use crate::id::Id;

#[derive(Debug)]
pub struct UntypedId {
    pub(crate) internal: u64,
    pub(crate) external: String,
}

impl UntypedId {
    pub(crate) fn new(internal: u64, external: String) -> Self {
        Self { internal, external }
    }
}

/// Global, process-wide cache of ids. Kept private so that `id::Id` is the only way callers can
/// touch it; shared across every thread in a run via `DashMap`, never behind a `Mutex`, so that
/// lookups from the enforcement handler's parallel event-dispatch threads never block each other.
#[derive(Debug, Default)]
pub struct IdStore {
    ids: DashMap<u64, Vec<Arc<UntypedId>>>,
    mapping: DashMap<u64, DashMap<String, u64>>,
}

impl IdStore {
    pub fn new() -> Self {
        Self {
            ids: DashMap::default(),
            mapping: DashMap::default(),
        }
    }

    fn create_id_with_type_id(&self, id: &str, type_id: u64) -> Arc<UntypedId> {
        if let Some(type_mapping) = self.mapping.get(&type_id) {
            if let Some(internal) = type_mapping.get(id) {
                return self
                    .ids
                    .get(&type_id)
                    .unwrap()
                    .get(*internal as usize)
                    .unwrap()
                    .clone();
            }
        }

        // Two threads can race to create the same external id here; the loser's candidate id is
        // dropped and it re-reads the winner's entry instead of registering a second copy.
        let mut type_ids = self.ids.entry(type_id).or_default();
        let type_mapping = self.mapping.entry(type_id).or_default();
        if let Some(internal) = type_mapping.get(id) {
            return type_ids.get(*internal as usize).unwrap().clone();
        }

        let next_internal = type_ids.len() as u64;
        let next_id = Arc::new(UntypedId::new(next_internal, String::from(id)));
        type_ids.push(next_id.clone());
        type_mapping.insert(String::from(id), next_internal);

        next_id
    }

    pub(crate) fn create_id<T: StableTypeId + 'static>(&self, id: &str) -> Id<T> {
        let type_id = T::stable_type_id();
        Id::new(self.create_id_with_type_id(id, type_id))
    }

    pub(crate) fn get<T: StableTypeId + 'static>(&self, internal: u64) -> Id<T> {
        let type_id = T::stable_type_id();
        let type_ids = self.ids.get(&type_id).unwrap_or_else(|| {
            panic!("No ids for type {type_id:?}. Use Id::create(...) to create ids")
        });

        let untyped_id = type_ids
            .get(internal as usize)
            .unwrap_or_else(|| panic!("No id found for internal {internal}"))
            .clone();
        Id::new(untyped_id)
    }

    pub(crate) fn try_get_from_ext<T: StableTypeId + 'static>(
        &self,
        external: &str,
    ) -> Option<Id<T>> {
        let type_id = T::stable_type_id();
        let type_mapping = self.mapping.get(&type_id)?;
        let index = *type_mapping.get(external)?;
        Some(self.get(index))
    }

    pub(crate) fn get_from_ext<T: StableTypeId + 'static>(&self, external: &str) -> Id<T> {
        self.try_get_from_ext(external)
            .unwrap_or_else(|| panic!("Could not find id for external id: {external}"))
    }

    #[cfg(any(test, feature = "test_util"))]
    pub(crate) fn reset(&self) {
        self.ids.clear();
        self.mapping.clear();
    }
}
