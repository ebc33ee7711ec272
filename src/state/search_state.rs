// ============================================================================
// SEARCH STATE - Resultado de la búsqueda por comprobante
// ============================================================================
// Cada búsqueda recibe un número de secuencia; solo la última emitida puede
// publicar su resultado. Una respuesta tardía de una búsqueda anterior se
// descarta aunque llegue después.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::models::Item;

/// Identifica una búsqueda en curso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Default)]
struct SearchInner {
    issued: Cell<u64>,
    current: RefCell<Option<Item>>,
}

/// Los clones comparten el mismo resultado
#[derive(Clone, Default)]
pub struct SearchState {
    inner: Rc<SearchInner>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> SearchTicket {
        let next = self.inner.issued.get() + 1;
        self.inner.issued.set(next);
        SearchTicket(next)
    }

    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        self.inner.issued.get() == ticket.0
    }

    /// Publica el resultado si la búsqueda sigue siendo la última.
    /// `None` limpia el resultado (no encontrado o error).
    pub fn complete(&self, ticket: SearchTicket, result: Option<Item>) -> bool {
        if !self.is_latest(ticket) {
            log::debug!("🔍 Búsqueda #{} descartada (hay una más reciente)", ticket.0);
            return false;
        }
        *self.inner.current.borrow_mut() = result;
        true
    }

    pub fn current(&self) -> Option<Item> {
        self.inner.current.borrow().clone()
    }

    /// Sustituye el pedido mostrado si es el mismo comprobante
    pub fn refresh(&self, item: &Item) -> bool {
        let mut current = self.inner.current.borrow_mut();
        match current.as_mut() {
            Some(shown) if shown.voucher_id == item.voucher_id => {
                *shown = item.clone();
                true
            }
            _ => false,
        }
    }

    /// Limpia el resultado y deja sin efecto cualquier búsqueda en curso
    pub fn reset(&self) {
        self.begin();
        self.inner.current.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, Status};

    fn item(voucher: &str, collected: f64) -> Item {
        Item {
            id: format!("id-{}", voucher),
            voucher_id: voucher.to_string(),
            order_id: "O1".to_string(),
            product: Product::Horcalsa,
            quantity: 10.0,
            collected,
            voucher_key: None,
            status: Some(Status::Pending),
            created_at: None,
            update_at: None,
        }
    }

    #[test]
    fn latest_search_wins_even_if_it_resolves_first() {
        let search = SearchState::new();
        let first = search.begin();
        let second = search.begin();

        assert!(search.complete(second, Some(item("V2", 0.0))));
        assert!(!search.complete(first, Some(item("V1", 0.0))));
        assert_eq!(search.current().unwrap().voucher_id, "V2");
    }

    #[test]
    fn refresh_only_touches_the_same_voucher() {
        let search = SearchState::new();
        let ticket = search.begin();
        search.complete(ticket, Some(item("V1", 0.0)));

        assert!(!search.refresh(&item("V9", 5.0)));
        assert!(search.refresh(&item("V1", 5.0)));
        assert_eq!(search.current().unwrap().collected, 5.0);
    }

    #[test]
    fn reset_discards_in_flight_searches() {
        let search = SearchState::new();
        let ticket = search.begin();
        search.reset();
        assert!(!search.complete(ticket, Some(item("V1", 0.0))));
        assert!(search.current().is_none());
    }
}
