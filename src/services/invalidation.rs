// ============================================================================
// INVALIDATION - Qué claves invalida cada mutación
// ============================================================================
// Tabla declarativa: la única fuente de reglas de invalidación. El gateway
// aplica `invalidates()` solo después de una respuesta exitosa.
// ============================================================================

use crate::state::query_cache::{KeyPattern, QueryCache, QueryKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateOrder,
    UpdateOrder { id: String },
    DeleteOrder { id: String },
    CreateItem { order_id: String },
    UpdateItem { order_id: String, voucher_id: String },
    DeleteItem { order_id: String, voucher_id: String },
    CreateCollect { voucher_id: String },
    CreateDelivery { voucher_id: String },
}

impl Mutation {
    pub fn invalidates(&self) -> Vec<KeyPattern> {
        match self {
            Mutation::CreateOrder
            | Mutation::UpdateOrder { .. }
            | Mutation::DeleteOrder { .. } => vec![QueryKey::orders().into()],
            Mutation::CreateItem { order_id } => vec![
                QueryKey::items(order_id.as_str()).into(),
                QueryKey::all_items().into(),
            ],
            Mutation::UpdateItem {
                order_id,
                voucher_id,
            }
            | Mutation::DeleteItem {
                order_id,
                voucher_id,
            } => vec![
                QueryKey::items(order_id.as_str()).into(),
                QueryKey::all_items().into(),
                QueryKey::item(voucher_id.as_str()).into(),
            ],
            // El total `collected` del pedido se refresca con la respuesta
            Mutation::CreateCollect { voucher_id } => {
                vec![QueryKey::collects(voucher_id.as_str()).into()]
            }
            Mutation::CreateDelivery { voucher_id } => {
                vec![QueryKey::deliveries(voucher_id.as_str()).into()]
            }
        }
    }

    /// Aplica la tabla sobre la caché. Devuelve cuántas entradas quedaron `Stale`.
    pub fn apply(&self, cache: &QueryCache) -> usize {
        self.invalidates()
            .iter()
            .map(|pattern| cache.invalidate(pattern))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::query_cache::Freshness;

    fn seeded(keys: &[QueryKey]) -> QueryCache {
        let cache = QueryCache::new();
        for key in keys {
            let ticket = cache.begin_fetch(key);
            cache.complete(&ticket, &0);
        }
        cache
    }

    #[test]
    fn order_mutations_only_touch_the_orders_list() {
        for mutation in [
            Mutation::CreateOrder,
            Mutation::UpdateOrder { id: "O1".into() },
            Mutation::DeleteOrder { id: "O1".into() },
        ] {
            assert_eq!(mutation.invalidates(), vec![KeyPattern::Exact(QueryKey::orders())]);
        }
    }

    #[test]
    fn create_item_hits_its_order_and_the_all_bucket() {
        let cache = seeded(&[
            QueryKey::items("O1"),
            QueryKey::items("O2"),
            QueryKey::all_items(),
        ]);
        let touched = Mutation::CreateItem {
            order_id: "O1".into(),
        }
        .apply(&cache);

        assert_eq!(touched, 2);
        assert_eq!(cache.freshness(&QueryKey::items("O1")), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::all_items()), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::items("O2")), Some(Freshness::Fresh));
    }

    #[test]
    fn item_edits_also_drop_the_single_item_entry() {
        let patterns = Mutation::UpdateItem {
            order_id: "O1".into(),
            voucher_id: "V1".into(),
        }
        .invalidates();
        assert!(patterns.contains(&KeyPattern::Exact(QueryKey::item("V1"))));
        assert!(patterns.contains(&KeyPattern::Exact(QueryKey::all_items())));
    }

    #[test]
    fn collect_and_delivery_stay_in_their_own_lane() {
        let cache = seeded(&[QueryKey::collects("V1"), QueryKey::deliveries("V1")]);

        Mutation::CreateCollect {
            voucher_id: "V1".into(),
        }
        .apply(&cache);
        assert_eq!(cache.freshness(&QueryKey::collects("V1")), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::deliveries("V1")), Some(Freshness::Fresh));

        Mutation::CreateDelivery {
            voucher_id: "V1".into(),
        }
        .apply(&cache);
        assert_eq!(cache.freshness(&QueryKey::deliveries("V1")), Some(Freshness::Stale));
    }
}
