//! Core of the flow relay: configuration, the tweaks map and the client
//! that talks to the downstream flow-execution API.

pub mod config;
pub mod flow;
pub mod tweaks;

pub use config::Config;
pub use flow::{FlowClient, RunRequest};
pub use tweaks::Tweaks;
