//! Ember Wallet — a watch-only TUI wallet.
//!
//! The library half carries the headless presentation core:
//! - feed sections, keyed snapshots/diffing and the list controller
//! - the chart presenter with its data-source and view seams
//! - the HTTP gateway and the price feed behind the chart

pub mod action;
pub mod config;
pub mod domain;
pub mod infra;
