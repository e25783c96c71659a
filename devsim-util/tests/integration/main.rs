//! Integration tests for the traffic hierarchies and the `devsim` driver.
//!
//! Run with: `cargo test -p devsim-util --test integration`

mod cli;
mod periodic_intersection;
mod queue_intersection;
