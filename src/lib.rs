//! # GPIO Mock Library
//!
//! A software stand-in for a microcontroller's GPIO register file, for
//! exercising pin/port abstractions and interrupt handlers without hardware.
//!
//! This library provides:
//! - An 8-bit register bank with output, input, direction and one-shot
//!   set/clear registers per port
//! - Directive-configured wiring rules ("BitLink") that mirror bits of one
//!   register onto another, simulating physical connections between pins
//! - A deterministic, zero-delay tick that consumes set/clear commands,
//!   evaluates the wiring and fires change watchers
//! - JSON-configurable setup for whole cores

pub mod directive;
pub mod error;
pub mod interconnect;
pub mod mock_core;
pub mod register_bank;
pub mod string_hash;
pub mod system_config;
pub mod types;
pub mod watcher;

// Re-export commonly used items for easier importing
pub use directive::{Directive, DirectiveBuilder, DirectiveKind};
pub use error::{ConfigError, CoreError};
pub use interconnect::{BitLink, InterconnectRule};
pub use mock_core::MockCore;
pub use types::{PortId, RegisterGroup, RegisterId, RegisterValue, REGISTER_WIDTH};
pub use watcher::{ChangeEvent, WatcherId};
