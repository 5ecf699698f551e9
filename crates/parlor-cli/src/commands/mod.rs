//! Command handlers

pub mod paths;
pub mod session;
pub mod show;
