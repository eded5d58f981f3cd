//! Airlock sequencer library.
//!
//! Coordinates two door groups and one pressurization vent so that a
//! door never opens against a pressure difference.  The host drives the
//! service one invocation at a time; see [`app::service::AirlockService`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod layout;
pub mod occupancy;
pub mod scheduler;
