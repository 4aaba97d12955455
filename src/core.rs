//! Core cookie handling.
//!
//! Contains the signed cookie accessor and the request/response context it works against.

pub mod context;
pub mod cookie;
