//! Core identifier types and utilities for agent-flow.
//!
//! This crate provides the foundational types shared by the flow editor
//! and its front ends.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConnectionId, FlowId, NodeId, ParseIdError};
