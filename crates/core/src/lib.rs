//! Functional core of the glowbook client.
//!
//! Pure types, validation and queries for the appointment lifecycle, plus
//! the traits the imperative shell implements: storage mediums, backends and
//! notification collaborators. Nothing in this crate performs I/O.

pub mod appointment;
pub mod cache;
pub mod catalog;
pub mod notify;
pub mod serde;
pub mod storage;
