// ============================================================================
// NOTICE STATE - Avisos visibles para el usuario
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{Notice, NoticeLevel};

/// Cola de avisos pendientes de mostrar. Los clones comparten la cola.
#[derive(Clone, Default)]
pub struct NoticeBoard {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publica un aviso y lo registra en el log con el nivel equivalente
    pub fn push(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => log::info!("✅ {}", notice.message),
            NoticeLevel::Info => log::info!("ℹ️ {}", notice.message),
            NoticeLevel::Warning => log::warn!("⚠️ {}", notice.message),
            NoticeLevel::Error => log::error!("❌ {}", notice.message),
        }
        self.notices.borrow_mut().push(notice);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Notice::success(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Notice::info(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(Notice::warning(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notice::error(message));
    }

    /// Vacía la cola (la vista los muestra y los descarta)
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    pub fn len(&self) -> usize {
        self.notices.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.borrow().is_empty()
    }
}
