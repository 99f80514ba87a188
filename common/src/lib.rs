//! Shared vocabulary for `deployr`: targets, OS families, the failure
//! taxonomy and configuration.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod os;
