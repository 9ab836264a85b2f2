//! API Routes
//!
//! Route handlers organized by functionality.

pub mod ai;
pub mod entries;
pub mod games;
pub mod health;
