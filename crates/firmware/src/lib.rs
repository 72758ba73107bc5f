//! SoulAudio Player application layer.
//!
//! Ties the feature crates together into the running player:
//!
//! ```text
//! Application Layer (this crate: boot, control loop, command console)
//!         ↓
//! Feature Layers (playback, library, bluetooth)
//!         ↓
//! Platform HAL (platform crate - trait abstractions)
//! ```
//!
//! # Modules
//!
//! - [`app`] - boot sequence, `Player` control loop, command execution
//! - [`command`] - text command parsing shared by console and remote
//! - [`input`] - button edge detection and press spacing
//! - [`output`] - console + remote response sink
//! - [`config`] - `PlayerConfig` / `DebounceConfig`
//! - `host` - desktop collaborators (feature `emulator`)
//!
//! # Features
//!
//! - `emulator` - Build the desktop player binary (tokio, clap, tracing-subscriber)
//! - `std` - Enable standard library

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![warn(clippy::print_stdout)] // prefer tracing over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(async_fn_in_trait)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

pub mod app;
pub mod command;
pub mod config;
pub mod input;
pub mod output;

#[cfg(feature = "emulator")]
pub mod host;

pub use app::{load_playlist, BootError, Player};
pub use command::{parse_command, parse_line, Command};
pub use config::{DebounceConfig, PlayerConfig};
pub use input::ButtonPoller;
pub use output::OutputSink;
