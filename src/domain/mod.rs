//! Domain Layer
//!
//! Core entity definitions

pub mod message;
pub mod provider;

pub use message::*;
pub use provider::*;
