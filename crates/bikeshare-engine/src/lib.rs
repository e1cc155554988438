//! Synchronization and query engine: reconciles the upstream feed into the
//! station catalog and the availability cache, and answers station queries
//! from both.

pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod query;
pub mod reconcile;

pub use error::{QueryError, SyncError};
pub use fingerprint::{FeedSlot, FingerprintSlots};
pub use gate::{JobGate, JobGuard};
pub use query::{NearestQuery, QueryEngine, StationView, DEFAULT_LIMIT, DEFAULT_RADIUS_MILES};
pub use reconcile::{PassOutcome, PassStats, Reconciler};
