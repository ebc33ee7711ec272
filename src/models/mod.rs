pub mod session;
pub mod entities;
pub mod envelope;
pub mod notice;

pub use session::{
    Identity, InvalidReason, RestoreOutcome, Role, SessionCheck, SessionData, SessionStatus,
    SignedSession,
};
pub use entities::{
    Collect, CollectCreated, Delivery, ImageUpload, ImageUploadBody, Item, ItemUpdate, NewCollect,
    NewDelivery, NewItem, Order, OrderUpdate, Product, QueryPage, Status,
};
pub use envelope::{ApiEnvelope, Lookup};
pub use notice::{Notice, NoticeLevel};
