//! chemcache - cached, rate-limited compound lookups
//!
//! Sits between an application and a rate-limited compound lookup service.
//! Remote calls go through a FIFO [`limiter::RateLimiter`]; results are kept
//! in a namespaced [`store::PersistentStore`] with expiry and a capacity
//! bound; [`batch::BatchOrchestrator`] drives long lists of lookups with
//! progress and cooperative cancellation. [`service::CompoundService`] ties
//! it together.

pub mod batch;
pub mod cache;
pub mod cli;
pub mod compound;
pub mod config;
pub mod error;
pub mod limiter;
pub mod remote;
pub mod service;
pub mod store;
pub mod ui;

pub use error::{ChemError, ChemResult};
