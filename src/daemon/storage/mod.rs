//!  Storage is organized through [usage_store::UsageStore].
//!  The basic idea is:
//!   - The whole history lives in one json document inside the application directory.
//!   - The document maps a day to the seconds spent in every application during that day.
//!   - The daemon keeps the document in memory as a [shared::SharedUsageLog] and rewrites the
//!     file in full when saving.

pub mod entities;
pub mod shared;
pub mod usage_store;
