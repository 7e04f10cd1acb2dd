//! ConfRadar conference wizard core
//!
//! State machine, delete tracking and step validation behind the
//! conference creation/edit wizard, plus the CLI plumbing that drives it.

pub mod config;
pub mod error;
pub mod logging;
pub mod replay;
pub mod validation;
pub mod wizard;
