//! Core input-method functionality
//!
//! This module contains the per-scheme composition state machine.

pub mod engine;
