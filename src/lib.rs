//! offline-cache-agent: tiered asset caching with offline degradation.
//!
//! Answers asset requests from a storage tier chosen once at startup:
//!   whole-response cache (preferred) → key-value record store → pass-through
//!
//! Cache misses fall back to the network and populate the tier; when both
//! the tier and the network fail, requests degrade to a static offline page.

pub mod agent;
pub mod config;
pub mod net;
pub mod storage;
