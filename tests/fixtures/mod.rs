//! Test fixtures for route-planner.
//!
//! Provides delivery service payloads around real Bogotá locations:
//! - candidate records as the service sends them
//! - route results with encoded geometry

#![allow(dead_code)]

pub mod bogota_payloads;

pub use bogota_payloads::*;
