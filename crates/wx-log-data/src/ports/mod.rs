//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound store).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
