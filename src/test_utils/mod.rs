//! Shared test utilities: config builders, fixtures and a mock portal.

#![cfg(test)]

pub mod config;
pub mod fixtures;
pub mod mocks;
