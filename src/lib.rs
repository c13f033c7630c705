#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A task management API guarded by an authentication/authorization"]
#![doc = "pipeline with two credential sources: local email + password and"]
#![doc = "Google sign-in. The pipeline covers credential verification, token"]
#![doc = "issuance/verification, federated identity resolution, per-task"]
#![doc = "ownership checks, and a centralized error taxonomy that every stage"]
#![doc = "reports into. The binary (`main.rs`) wires these pieces together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod federation;
pub mod identity;
pub mod models;
pub mod ownership;
pub mod rate_limit;
pub mod routes;
pub mod store;
