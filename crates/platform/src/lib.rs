//! Hardware Abstraction Layer (HAL) for the SoulAudio playlist player
//!
//! This crate provides trait-based abstractions for every collaborator the
//! player talks to, so the control logic can be developed and tested without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: boot, control loop, command console)
//!         ↓
//! Feature Layers (playback, library, bluetooth)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (SD card driver, I2S DAC, BLE stack, GPIO)
//! ```
//!
//! # Abstractions
//!
//! - [`Storage`] - File system access on the removable card
//! - [`AudioOutput`] - PCM sink with gain control
//! - [`ButtonPanel`] - Raw button sampling (debounce lives in firmware)
//! - [`ConsoleWriter`] / [`LineSource`] - Serial console text I/O
//! - [`RemoteTransport`] - Wireless command channel
//!
//! # Features
//!
//! - `std`: Desktop filesystem storage and mock implementations

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)] // plain accessors
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // single-threaded control loop, Send bounds not needed

pub mod audio;
pub mod audio_types;
pub mod bluetooth;
pub mod config;
pub mod console;
pub mod input;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod storage_local;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use audio::{AudioConfig, AudioOutput};
pub use audio_types::{Gain, VolumePercent};
pub use bluetooth::RemoteTransport;
pub use console::{ConsoleWriter, Line, LineSource, MAX_LINE_LEN};
pub use input::{Button, ButtonPanel};
pub use storage::{DirEntry, Directory, File, OpenMode, Storage};
