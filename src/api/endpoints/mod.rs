//! API endpoint handlers.
//!
//! Handlers lock the shared connection for one unit of work and delegate to
//! the domain modules.

pub mod adherence;
pub mod health;
pub mod medicines;
pub mod prescriptions;
pub mod profiles;
pub mod risk;
