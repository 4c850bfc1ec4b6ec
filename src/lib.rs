//! Work log for freelance film crew. Days worked are logged against projects and tagged with the
//! role taken on that day, from which statistics about projects, production companies, weekly
//! activity and payment are derived.
//!
//! Data lives either in a per-owner document store or in a single local file.

pub mod cli;
pub mod model;
pub mod session;
pub mod state;
pub mod stats;
pub mod store;
pub mod utils;
