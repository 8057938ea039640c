//! PCPOS Test Harness - Simulation and end-to-end validation
//!
//! This crate provides:
//! - Frame timing jitter and stall models
//! - Random-walk emotion producers
//! - A seeded companion simulator with invariant tracking
//! - End-to-end scenario tests

pub mod simulator;
pub mod integration;

pub use simulator::*;
pub use integration::*;
