//! Library side of the `webui` command: logging setup and command runners.

#![deny(unsafe_code)]

pub mod commands;
pub mod logging;
