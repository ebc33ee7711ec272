// ============================================================================
// QUERY CACHE - Caché de entidades del servidor con invalidación por clave
// ============================================================================
// El servidor es la fuente de verdad. `Fresh` solo significa "ninguna
// mutación conocida lo invalidó desde el último fetch".
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Alcance de una lista de pedidos
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemScope {
    Order(String),
    /// Vista "todos los pedidos", independiente de las listas por orden
    All,
}

/// Clave de caché: tipo de entidad + identificador del padre.
/// Al ser un enum, la composición es total y sin colisiones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Orders,
    Items(ItemScope),
    /// Pedido individual por comprobante
    Item(String),
    Collects(String),
    Deliveries(String),
}

impl QueryKey {
    pub fn orders() -> Self {
        QueryKey::Orders
    }

    pub fn items(order_id: impl Into<String>) -> Self {
        QueryKey::Items(ItemScope::Order(order_id.into()))
    }

    pub fn all_items() -> Self {
        QueryKey::Items(ItemScope::All)
    }

    pub fn item(voucher_id: impl Into<String>) -> Self {
        QueryKey::Item(voucher_id.into())
    }

    pub fn collects(voucher_id: impl Into<String>) -> Self {
        QueryKey::Collects(voucher_id.into())
    }

    pub fn deliveries(voucher_id: impl Into<String>) -> Self {
        QueryKey::Deliveries(voucher_id.into())
    }

    /// Segmentos jerárquicos, p.ej. `["items", "order", "O1"]`
    pub fn segments(&self) -> Vec<String> {
        let parts: Vec<&str> = match self {
            QueryKey::Orders => vec!["orders", "list"],
            QueryKey::Items(ItemScope::Order(id)) => vec!["items", "order", id],
            QueryKey::Items(ItemScope::All) => vec!["items", "all"],
            QueryKey::Item(voucher) => vec!["item", voucher],
            QueryKey::Collects(voucher) => vec!["collects", voucher],
            QueryKey::Deliveries(voucher) => vec!["deliveries", voucher],
        };
        parts.into_iter().map(str::to_string).collect()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

/// Qué entradas afecta una invalidación
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    Exact(QueryKey),
    Prefix(Vec<String>),
}

impl KeyPattern {
    pub fn prefix<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeyPattern::Prefix(segments.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            KeyPattern::Exact(exact) => exact == key,
            KeyPattern::Prefix(prefix) => {
                let segments = key.segments();
                segments.len() >= prefix.len()
                    && segments.iter().zip(prefix).all(|(a, b)| a == b)
            }
        }
    }
}

impl From<QueryKey> for KeyPattern {
    fn from(key: QueryKey) -> Self {
        KeyPattern::Exact(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Fetching,
}

/// Resultado de leer una clave
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead<T> {
    Fresh(T),
    /// Ausente o invalidada: el llamador debe pedirla al servidor
    Refetch { previous: Option<T> },
    InFlight { previous: Option<T> },
}

impl<T> CacheRead<T> {
    pub fn fresh(self) -> Option<T> {
        match self {
            CacheRead::Fresh(value) => Some(value),
            _ => None,
        }
    }
}

/// Comprobante de un fetch en curso. Solo el último emitido para una clave
/// puede escribir su resultado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
    seq: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug)]
struct Entry {
    value: Option<serde_json::Value>,
    freshness: Freshness,
    /// Se incrementa en cada invalidación
    generation: u64,
    latest_seq: u64,
}

impl Entry {
    fn empty() -> Self {
        Self {
            value: None,
            freshness: Freshness::Stale,
            generation: 0,
            latest_seq: 0,
        }
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, Entry>,
    next_seq: u64,
}

impl CacheInner {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Caché compartida (los clones apuntan al mismo mapa)
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Rc<RefCell<CacheInner>>,
}

fn decode<T: DeserializeOwned>(key: &QueryKey, value: &serde_json::Value) -> Option<T> {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("⚠️ Entrada de caché {} con tipo inesperado: {}", key, e);
            None
        }
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> CacheRead<T> {
        let inner = self.inner.borrow();
        let Some(entry) = inner.entries.get(key) else {
            return CacheRead::Refetch { previous: None };
        };

        let previous = entry.value.as_ref().and_then(|v| decode::<T>(key, v));
        match (entry.freshness, previous) {
            (Freshness::Fresh, Some(value)) => CacheRead::Fresh(value),
            (Freshness::Fetching, previous) => CacheRead::InFlight { previous },
            (_, previous) => CacheRead::Refetch { previous },
        }
    }

    /// Último valor conocido, sin importar su frescura
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let inner = self.inner.borrow();
        let value = inner.entries.get(key)?.value.as_ref()?;
        decode(key, value)
    }

    pub fn freshness(&self, key: &QueryKey) -> Option<Freshness> {
        self.inner.borrow().entries.get(key).map(|e| e.freshness)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// Marca la clave como `Fetching` y devuelve el comprobante del fetch
    pub fn begin_fetch(&self, key: &QueryKey) -> FetchTicket {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq();
        let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::empty);
        entry.freshness = Freshness::Fetching;
        entry.latest_seq = seq;

        FetchTicket {
            key: key.clone(),
            generation: entry.generation,
            seq,
        }
    }

    /// Guarda el resultado de un fetch. Un comprobante superado se descarta;
    /// si la clave se invalidó mientras tanto, el valor queda `Stale`.
    pub fn complete<T: Serialize>(&self, ticket: &FetchTicket, value: &T) -> bool {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("❌ No se pudo cachear {}: {}", ticket.key, e);
                self.fail(ticket);
                return false;
            }
        };

        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.entries.get_mut(&ticket.key) else {
            log::debug!("Fetch de {} descartado: la entrada ya no existe", ticket.key);
            return false;
        };
        if entry.latest_seq != ticket.seq {
            log::debug!("Fetch de {} descartado: superado por otro más reciente", ticket.key);
            return false;
        }

        entry.value = Some(encoded);
        entry.freshness = if entry.generation == ticket.generation {
            Freshness::Fresh
        } else {
            Freshness::Stale
        };
        true
    }

    /// Fetch fallido: se conserva el valor previo como `Stale`
    pub fn fail(&self, ticket: &FetchTicket) {
        let mut inner = self.inner.borrow_mut();
        if let Some(entry) = inner.entries.get_mut(&ticket.key) {
            if entry.latest_seq == ticket.seq {
                entry.freshness = Freshness::Stale;
            }
        }
    }

    /// Escritura directa con datos que el servidor acaba de devolver
    pub fn set<T: Serialize>(&self, key: &QueryKey, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("❌ No se pudo cachear {}: {}", key, e);
                return;
            }
        };

        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq();
        let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::empty);
        entry.value = Some(encoded);
        entry.freshness = Freshness::Fresh;
        // Cualquier fetch anterior en curso queda superado
        entry.latest_seq = seq;
    }

    /// Modifica el valor cacheado sin cambiar su frescura
    pub fn update<T, F>(&self, key: &QueryKey, mutate: F) -> bool
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let Some(mut value) = self.peek::<T>(key) else {
            return false;
        };
        mutate(&mut value);

        let Ok(encoded) = serde_json::to_value(&value) else {
            return false;
        };
        let mut inner = self.inner.borrow_mut();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.value = Some(encoded);
                true
            }
            None => false,
        }
    }

    /// Marca como `Stale` las entradas que coinciden. Devuelve cuántas.
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let mut inner = self.inner.borrow_mut();
        let mut touched = 0;
        for (key, entry) in inner.entries.iter_mut() {
            if !pattern.matches(key) {
                continue;
            }
            entry.generation += 1;
            if entry.freshness == Freshness::Fresh {
                entry.freshness = Freshness::Stale;
            }
            touched += 1;
        }
        if touched > 0 {
            log::debug!("🔄 {:?} invalidó {} entradas", pattern, touched);
        }
        touched
    }

    pub fn remove(&self, key: &QueryKey) {
        self.inner.borrow_mut().entries.remove(key);
    }

    /// Vacía la caché (logout)
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        let count = inner.entries.len();
        inner.entries.clear();
        log::info!("🗑️ Caché de consultas limpiada ({} entradas)", count);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed<T: Serialize>(cache: &QueryCache, key: &QueryKey, value: &T) {
        let ticket = cache.begin_fetch(key);
        assert!(cache.complete(&ticket, value));
    }

    #[test]
    fn absent_key_asks_for_a_fetch() {
        let cache = QueryCache::new();
        assert_eq!(
            cache.get::<Vec<String>>(&QueryKey::orders()),
            CacheRead::Refetch { previous: None }
        );
    }

    #[test]
    fn completed_fetch_reads_fresh() {
        let cache = QueryCache::new();
        let key = QueryKey::collects("V1");
        seed(&cache, &key, &vec![1, 2, 3]);
        assert_eq!(cache.get::<Vec<i32>>(&key), CacheRead::Fresh(vec![1, 2, 3]));
    }

    #[test]
    fn invalidation_is_scoped_to_the_parent() {
        let cache = QueryCache::new();
        seed(&cache, &QueryKey::items("A"), &vec!["a"]);
        seed(&cache, &QueryKey::items("B"), &vec!["b"]);

        assert_eq!(cache.invalidate(&QueryKey::items("A").into()), 1);
        assert_eq!(cache.freshness(&QueryKey::items("A")), Some(Freshness::Stale));
        assert_eq!(cache.freshness(&QueryKey::items("B")), Some(Freshness::Fresh));
        assert_eq!(
            cache.get::<Vec<String>>(&QueryKey::items("A")),
            CacheRead::Refetch {
                previous: Some(vec!["a".to_string()])
            }
        );
    }

    #[test]
    fn all_items_bucket_is_independent_of_order_buckets() {
        let cache = QueryCache::new();
        seed(&cache, &QueryKey::all_items(), &vec!["x"]);
        seed(&cache, &QueryKey::items("all"), &vec!["y"]);

        cache.invalidate(&QueryKey::items("all").into());
        assert_eq!(cache.freshness(&QueryKey::all_items()), Some(Freshness::Fresh));

        cache.invalidate(&QueryKey::all_items().into());
        assert_eq!(cache.freshness(&QueryKey::all_items()), Some(Freshness::Stale));
    }

    #[test]
    fn keys_never_collide_across_entity_types() {
        let keys = [
            QueryKey::orders(),
            QueryKey::items("V1"),
            QueryKey::all_items(),
            QueryKey::item("V1"),
            QueryKey::collects("V1"),
            QueryKey::deliveries("V1"),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a.segments(), b.segments());
            }
        }
    }

    #[test]
    fn prefix_invalidation_covers_a_whole_entity_type() {
        let cache = QueryCache::new();
        seed(&cache, &QueryKey::items("A"), &1);
        seed(&cache, &QueryKey::all_items(), &2);
        seed(&cache, &QueryKey::collects("A"), &3);

        assert_eq!(cache.invalidate(&KeyPattern::prefix(["items"])), 2);
        assert_eq!(cache.freshness(&QueryKey::collects("A")), Some(Freshness::Fresh));
    }

    #[test]
    fn wrong_type_never_reads_fresh() {
        let cache = QueryCache::new();
        let key = QueryKey::orders();
        seed(&cache, &key, &"text");
        assert_eq!(
            cache.get::<Vec<i32>>(&key),
            CacheRead::Refetch { previous: None }
        );
    }

    #[test]
    fn superseded_fetch_cannot_overwrite_the_latest() {
        let cache = QueryCache::new();
        let key = QueryKey::item("V1");
        let first = cache.begin_fetch(&key);
        let second = cache.begin_fetch(&key);

        assert!(cache.complete(&second, &"nuevo"));
        assert!(!cache.complete(&first, &"viejo"));
        assert_eq!(cache.get::<String>(&key), CacheRead::Fresh("nuevo".to_string()));
    }

    #[test]
    fn invalidation_during_fetch_lands_stale() {
        let cache = QueryCache::new();
        let key = QueryKey::deliveries("V1");
        let ticket = cache.begin_fetch(&key);
        assert_eq!(
            cache.get::<Vec<i32>>(&key),
            CacheRead::InFlight { previous: None }
        );

        cache.invalidate(&key.clone().into());
        assert!(cache.complete(&ticket, &vec![1]));
        assert_eq!(cache.freshness(&key), Some(Freshness::Stale));
    }

    #[test]
    fn failed_fetch_keeps_previous_value_as_stale() {
        let cache = QueryCache::new();
        let key = QueryKey::orders();
        seed(&cache, &key, &vec![7]);
        cache.invalidate(&key.clone().into());

        let ticket = cache.begin_fetch(&key);
        cache.fail(&ticket);
        assert_eq!(
            cache.get::<Vec<i32>>(&key),
            CacheRead::Refetch {
                previous: Some(vec![7])
            }
        );
    }

    #[test]
    fn direct_set_supersedes_in_flight_fetch() {
        let cache = QueryCache::new();
        let key = QueryKey::item("V1");
        let ticket = cache.begin_fetch(&key);
        cache.set(&key, &5);
        assert!(!cache.complete(&ticket, &4));
        assert_eq!(cache.get::<i32>(&key), CacheRead::Fresh(5));
    }

    #[test]
    fn update_keeps_freshness() {
        let cache = QueryCache::new();
        let key = QueryKey::all_items();
        seed(&cache, &key, &vec![1]);
        assert!(cache.update::<Vec<i32>, _>(&key, |v| v.push(2)));
        assert_eq!(cache.get::<Vec<i32>>(&key), CacheRead::Fresh(vec![1, 2]));
        assert!(!cache.update::<Vec<i32>, _>(&QueryKey::orders(), |v| v.push(3)));
    }

    #[test]
    fn clear_drops_everything() {
        let cache = QueryCache::new();
        seed(&cache, &QueryKey::orders(), &1);
        seed(&cache, &QueryKey::collects("V1"), &2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
