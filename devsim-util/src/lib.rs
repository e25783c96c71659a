//! Reference models and tooling built on top of [`devsim`].
//!
//! The [`traffic`] module contains two traffic intersection hierarchies that
//! serve both as worked examples of atomic and coupled models and as
//! regression benches for the simulator. The `devsim` binary of this crate
//! runs any of them from the command line and prints the resulting trace.
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

pub mod traffic;
