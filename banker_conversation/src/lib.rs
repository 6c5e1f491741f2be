#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Conversation session management independent of any UI or vendor.
//!
//! # Key Features
//! - Append-only transcript with on-demand statistics
//! - Whole-session snapshots for the caller to persist
//! - One request/response cycle per `submit`, with provider failures
//!   normalized into a single error type

mod controller;
mod transcript;

pub use controller::{SessionController, SessionError};
pub use transcript::{SessionStats, TranscriptError, TranscriptSnapshot, TranscriptStore, Turn};
