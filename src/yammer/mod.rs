//! Yammer fetch client.
//!
//! This module provides the OAuth login flow and the topic messages request.

pub mod client;
pub mod login;

pub use client::YammerClient;
