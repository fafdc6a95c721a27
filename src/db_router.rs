use std::collections::HashMap;

use crate::calculations::CalculationStore;

/// Identity of a store in the registry. Routing never fails: an unconfigured
/// server id resolves to `Default` instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreId {
    Default,
    Server(i64),
}

/// Routes records to physical stores. One store per configured server id plus
/// a default store, all populated at startup; schema is replicated identically
/// to every store.
#[derive(Debug, Clone)]
pub struct StoreRegistry {
    default_store: CalculationStore,
    stores: HashMap<i64, CalculationStore>,
}

impl StoreRegistry {
    pub fn new(server_ids: &[i64]) -> Self {
        let stores = server_ids
            .iter()
            .map(|&id| (id, CalculationStore::new()))
            .collect();
        Self {
            default_store: CalculationStore::new(),
            stores,
        }
    }

    /// Where a record for `server_id` lands.
    pub fn route_for(&self, server_id: i64) -> StoreId {
        if self.stores.contains_key(&server_id) {
            StoreId::Server(server_id)
        } else {
            StoreId::Default
        }
    }

    /// The store handling reads and writes for `server_id`. Unconfigured ids
    /// fall back to the default store.
    pub fn resolve_store(&self, server_id: i64) -> &CalculationStore {
        self.stores.get(&server_id).unwrap_or(&self.default_store)
    }

    pub fn store(&self, id: StoreId) -> Option<&CalculationStore> {
        match id {
            StoreId::Default => Some(&self.default_store),
            StoreId::Server(server_id) => self.stores.get(&server_id),
        }
    }

    /// A relation between two entities is allowed only when both belong to
    /// the known set of stores.
    pub fn allow_relation(&self, a: StoreId, b: StoreId) -> bool {
        self.is_known(a) && self.is_known(b)
    }

    /// Every store carries the full schema.
    pub fn allow_migrate_schema(&self, _store: StoreId, _entity_type: &str) -> bool {
        true
    }

    fn is_known(&self, id: StoreId) -> bool {
        match id {
            StoreId::Default => true,
            StoreId::Server(server_id) => self.stores.contains_key(&server_id),
        }
    }
}
