//! CLI command implementations

pub(crate) mod common;
pub(crate) mod exec;
pub(crate) mod setup;
pub(crate) mod status;
pub(crate) mod upgrade;
