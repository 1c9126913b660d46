//! Spread the effects of a show's reference rectangle onto the rest of a
//! Light-O-Rama sequence, following per-fixture assignment files.

pub mod address;
pub mod assign;
pub mod error;
pub mod extract;
pub mod lms;
pub mod paths;
pub mod propagate;
pub mod settings;
pub mod spread;
pub mod storage;

pub use error::SpreadError;
