//! API middleware.
//!
//! A single layer: bearer-token auth. The token is hashed and resolved
//! against the users table, and handlers receive the resulting
//! `AuthedUser` extension.

pub mod auth;
