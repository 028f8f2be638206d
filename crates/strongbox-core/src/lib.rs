//! Core abstractions for Strongbox: backing-store contract, configuration snapshots,
//! and tolerant value parsing. Cryptography lives in `strongbox-storage`.

pub mod config;
pub mod storage;
pub mod value;
