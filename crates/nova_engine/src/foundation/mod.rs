//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and transform conventions
//! - Generation-checked resource keys
//! - Frame timing and pacing
//! - Logging initialization

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
