//! Transport layer: establishing the raw byte stream.
//!
//! The client core is transport-agnostic and consumes any
//! `AsyncRead`/`AsyncWrite` pair; this module provides the TCP one.

pub mod tcp;
