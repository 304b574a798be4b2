//! traveal-anon: privacy reduction for trip records
//!
//! ```text
//! user_id        ──chained SHA-256 (1/3/5 rounds, keyed)──> user_hash
//! [lat, lng]     ──trunc to 0.001° + uniform noise──────> start/end area
//! start_time     ──truncate to the hour─────────────────> start_hour
//! anything else  ──dropped
//! ```
//!
//! [`fields`] covers the other path: keeping an identifying value but
//! sealing it in an envelope.

pub mod fields;
pub mod location;
pub mod pipeline;
pub mod pseudonym;
pub mod record;

pub use fields::{decrypt_sensitive_fields, encrypt_sensitive_fields};
pub use pipeline::Anonymizer;
pub use pseudonym::{anonymous_trip_id, chained_hash};
pub use record::{AnonymizedTripRecord, Area, RawTripRecord, TripTime};
