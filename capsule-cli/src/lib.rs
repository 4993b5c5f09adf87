//! Command-line front end for `capsule-validator`.

pub mod cli;
pub mod logging;
