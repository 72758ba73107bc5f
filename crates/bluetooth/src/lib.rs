//! Remote control link: connection edge tracking and notification chunking.
//!
//! The radio itself sits behind [`platform::RemoteTransport`]. This crate
//! holds the transport-independent logic: noticing connect/disconnect edges,
//! scheduling the advertising restart, and splitting response text into
//! notification-sized pieces.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![allow(async_fn_in_trait)]
#![allow(missing_docs)]

pub mod notify;
pub mod state;

pub use notify::{chunks, NotifyError, NotifyQueue, Utf8Chunks};
pub use state::{LinkEvent, LinkState};
