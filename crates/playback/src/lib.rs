//! Playback control: the track-switch state machine and the decode pipeline
//! it drives.
//!
//! # Modules
//!
//! - [`engine`]: `PlaybackController`: switching, retries, auto-advance
//! - [`pipeline`]: `DecodePipeline` seam and the reference `Pipeline`
//! - [`decoder`]: `Generator` trait shared by every decoder family
//! - [`wav`] / [`mp3_decoder`]: the two generators
//! - [`events`]: user-visible notices and the `EventSink` seam
//! - [`volume`]: `+`/`-` gain steps
//!
//! # Features
//!
//! - `mp3` (default): real MP3 decoding through nanomp3
//! - `std`: test doubles for downstream crates

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![allow(async_fn_in_trait)]

pub mod decoder;
pub mod engine;
pub mod events;
pub mod mp3_decoder;
pub mod pipeline;
pub mod volume;
pub mod wav;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use decoder::{DecodeError, Generator};
pub use engine::{
    PlaybackConfig, PlaybackController, PlaybackError, PlaybackSession, PlayerState, ServiceOutcome,
};
pub use events::{EventSink, NullSink, PlaybackEvent};
pub use pipeline::{DecodePipeline, Pipeline};
pub use volume::{display_volume, VolumeStep};
