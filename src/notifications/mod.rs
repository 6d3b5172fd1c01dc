//! Booking notifications module

mod models;
mod store;

pub use models::{
    ExternalId, IncomingEvent, NotificationAction, NotificationRecord, RawEvent, RawEventDetails,
    RawUser,
};
pub use store::{count_records, NotificationCounts, NotificationStore};
