//! Client for the ACWD customer portal.
//!
//! The portal has no public API. A run scrapes an anti-forgery token from the
//! landing page, then drives the JSON endpoints behind the dashboard with that
//! token and the session cookie on every call.

mod auth;
mod billing;
mod client;
mod collector;
mod envelope;
mod helper;
mod meter;
mod normalize;
mod session;
mod token;
mod usage;

pub use client::Client;
pub use collector::WaterUsageCollector;
