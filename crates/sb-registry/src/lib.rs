//! Agent Card Client (C1) and Agent Registry (C2).

mod client;
mod registry;

pub use client::AgentCardClient;
pub use registry::{AgentRegistry, AgentSummary};
