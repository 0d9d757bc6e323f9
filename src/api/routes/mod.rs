//! API Routes
//!
//! Route handlers organized by functionality.

pub mod admins;
pub mod campaigns;
pub mod dashboard;
pub mod health;
