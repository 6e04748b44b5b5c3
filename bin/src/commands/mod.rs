//! CLI command implementations.

pub(crate) mod upload;
