pub mod assessment;
pub mod auth;
pub mod deployment;
pub mod discovery;
pub mod engine;
pub mod inventory;
pub mod osdetect;
pub mod plan;
pub mod policy;
pub mod runner;
pub mod scanner;
