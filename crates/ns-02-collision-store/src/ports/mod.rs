//! # Ports Layer
//!
//! - **Inbound (Driving)**: API the commit consumer calls
//! - **Outbound (Driven)**: key-value store and record serializer

pub mod inbound;
pub mod outbound;
