//! Filesystem helpers shared by the storage layer.

pub mod operations;
