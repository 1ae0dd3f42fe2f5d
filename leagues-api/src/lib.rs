//! Shared wire types for the leagues database API.
//!
//! Every type in this crate maps directly onto a JSON request or response
//! body. The serialized key names are part of the public HTTP surface and
//! must not change without a protocol revision.

pub mod auth;
pub mod games;
pub mod id;
pub mod leagues;
pub mod matches;
pub mod players;
pub mod teams;
