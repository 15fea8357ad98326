//! Robot Arena
//!
//! Headless core of a sumo-style robot arena: fighters grow by collecting
//! fuel tanks and absorbing the fuel of opponents they knock off the platform.
//!
//! # Features
//!
//! - `parallel_ai` - Evaluate autonomous pilot decisions with rayon (enabled by default)

pub mod config;
pub mod game;
pub mod util;
