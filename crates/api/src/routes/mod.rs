//! API Routes

pub mod alerts;
pub mod fusion;
pub mod overlay;
