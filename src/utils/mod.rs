//! Shared helpers with no knowledge of routes or configuration.

pub mod date;
pub mod git;
pub mod html;
pub mod plural;
