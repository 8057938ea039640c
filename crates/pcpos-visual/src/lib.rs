//! PCPOS Visual - decorative depth and iconography
//!
//! Symbols are STATE assigned to depth layers, not sprites moved by hand.
//! One global rotation value drives every layer; each layer derives its own
//! rotation, opacity, blur and scale from a fixed table, which is what makes
//! the parallax read as depth.
//!
//! The lock/scan/unlock machine picks which symbols and colours are on
//! screen and how lively they are.

pub mod compositor;
pub mod faceid;
pub mod symbols;

pub use compositor::*;
pub use faceid::*;
pub use symbols::*;
