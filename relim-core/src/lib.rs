//! Relim Core - Fundamental types
//!
//! This crate provides the core types used throughout Relim:
//! - `Quantity`: a concentration tagged with its unit
//! - `Unit`: mass concentration (g/l) or mass fraction (%w/w)
//! - `Density`: validated product density used for conversions
//! - `ConfigError`: structured errors for rule configuration

mod unit;
mod quantity;
mod error;

pub use unit::{Unit, ConversionError};
pub use quantity::{Quantity, Density};
pub use error::{ConfigError, Location, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Quantity, Unit, Density, ConfigError, ConversionError, Location};
    pub use crate::error::codes;
}
