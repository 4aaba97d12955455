//! Security modules.
//!
//! Signing and encryption of cookie payloads.

pub mod crypto;
