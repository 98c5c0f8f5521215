//! sizelogd - directory size logging daemon
//!
//! Exposes the daemon lifecycle components so they can be driven and tested
//! without forking.

#![deny(unsafe_code)]

pub mod constants;
pub mod daemon;
pub mod models;
pub mod workload;
