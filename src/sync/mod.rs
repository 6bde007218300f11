//! Client data synchronisation
//!
//! Used by the field application on top of the REST API: a shared query
//! cache, optimistic mutations, realtime subscriptions with reconnection,
//! the time tracking session and local drafts. Every network boundary is a
//! trait so the logic runs against in-memory fakes in tests.

pub mod backend;
pub mod cache;
pub mod error;
pub mod http;
pub mod local_store;
pub mod mutation;
pub mod notify;
pub mod realtime;
pub mod record;
pub mod time_tracker;

pub use backend::{Backend, TaskBackend, TimeEntryBackend};
pub use cache::QueryCache;
pub use error::{ErrorKind, SyncError, SyncResult};
pub use http::HttpBackend;
pub use local_store::{FormDraft, LocalStore, Preferences};
pub use mutation::{apply_optimistic, Change, MutationState, Mutations, TaskMutations};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use realtime::{
    ReconnectPolicy, SubscriptionHandle, SubscriptionManager, SubscriptionSpec, SubscriptionStatus,
};
pub use record::Record;
pub use time_tracker::TimeTracker;
