//! # Ports Layer
//!
//! - **Inbound (Driving)**: API the scan loop calls

pub mod inbound;
