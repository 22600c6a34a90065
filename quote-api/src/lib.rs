//! Client for the quote service's HTTP listing endpoint.

pub mod client;
mod wire;

pub use client::{ApiError, QuoteApiClient};
