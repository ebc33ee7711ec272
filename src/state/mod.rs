// ============================================================================
// STATE MODULE - State Management con Rc<RefCell>
// ============================================================================

pub mod notice_state;
pub mod session_store;
pub mod query_cache;
pub mod search_state;

pub use notice_state::NoticeBoard;
pub use session_store::SessionStore;
pub use query_cache::{CacheRead, Freshness, ItemScope, KeyPattern, QueryCache, QueryKey};
pub use search_state::SearchState;
