//! Integration test crate for MediaSyncer.
//!
//! This crate exists solely to hold cross-crate integration tests. Every
//! scenario drives a real `Session` with synthetic media whose clock and
//! seek completions are controlled by the test.

#[cfg(test)]
mod harness;

#[cfg(test)]
mod sync;

#[cfg(test)]
mod lifecycle;
