//! Small infrastructure helpers shared across the crate.
//!
//! Currently this is limited to validated environment variable access in
//! [`env`], which backs the ambient credential detection in [`crate::auth`].

pub mod env;
