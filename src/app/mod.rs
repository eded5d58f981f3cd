//! Application core: sequencing rules, zero I/O.
//!
//! This module holds the airlock's behaviour: command dispatch, the
//! occupancy counter, task start and supersession, and status rendering.
//! All interaction with the grid happens through **port traits** defined
//! in [`ports`], keeping this layer testable without a live grid.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
