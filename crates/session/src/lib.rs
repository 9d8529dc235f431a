//! Session state for live media streams.
//!
//! The codec crates in this workspace are pure byte transforms; this crate
//! holds the state that a live session accumulates around them: which
//! decoder configurations have been published, where the timestamp origin
//! is, and whether the platform decoder is currently usable.
//!
//! [`SendSession`] and [`ReceiveSession`] are synchronous and transport
//! agnostic. The caller feeds them encoder outputs or received messages and
//! gets back the bytes to send or the buffers to decode; all I/O and
//! scheduling stays with the caller.
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

mod error;
mod lifecycle;
mod receive;
mod send;
mod timestamp;

pub use error::SessionError;
pub use lifecycle::DecoderLifecycle;
pub use receive::{DecodedInput, MediaTrack, ReceiveSession, SessionConfig};
pub use send::{AudioTrack, EncoderOutput, SendSession, SessionOutput, VideoTrack};
pub use timestamp::{NormalizedTimestamp, TimestampNormalizer};
