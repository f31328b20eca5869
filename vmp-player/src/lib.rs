//! # VMP Player Core (vmp-player)
//!
//! Unattended background-music player core for venues.
//!
//! **Purpose:** Keep a rolling, time-of-day-aware playlist populated from
//! the venue's music configuration, and keep the media for upcoming slots
//! downloaded locally ahead of playback.
//!
//! **Architecture:** Two periodic services (playlist scheduler, download
//! coordinator) sharing one state container, plus a catalog fetch boundary
//! and an HTTP status/snapshot interface.

pub mod api;
pub mod catalog;
pub mod download;
pub mod playlist;
pub mod state;

pub use state::SharedState;
