//! Partyline server library
//!
//! This module re-exports the server's modules for integration testing.

pub mod config;
pub mod gateway;
pub mod http;
