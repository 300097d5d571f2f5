//! Command-line facing adapters: request files in, listings out.

pub mod output;
pub mod requests;
