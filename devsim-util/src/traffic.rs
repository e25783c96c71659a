//! Traffic intersection models.
//!
//! Two independent hierarchies are provided:
//!
//! * [`queue`]: a car generator feeding a traffic light that queues cars
//!   until a policeman lets them through,
//! * [`periodic`]: an autonomous traffic light periodically put in manual
//!   mode by a policeman.
//!
//! Each module exposes its atomic models together with functions that
//! assemble them into ready-to-simulate coupled models.

pub mod periodic;
pub mod queue;
