//! Zarista storefront core library.
//!
//! The state and query layer behind the Zarista storefront UI:
//!
//! - [`catalog`] - product fetching plus the pure search/filter/sort engine
//! - [`cart`] - the in-memory cart ledger
//! - [`config`] - environment-driven configuration
//! - [`favorites`] - per-user favorites synchronized against a remote store
//! - [`currency`] - display formatting for prices
//! - [`state`] - the injectable state container the UI shell holds
//!
//! The crate owns no page rendering, routing, or authentication mechanics;
//! it is consumed by a UI shell that supplies the authenticated user (if any)
//! and renders what these modules produce.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod currency;
pub mod favorites;
pub mod state;
