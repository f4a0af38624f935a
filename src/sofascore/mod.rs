pub mod client;
pub mod provider;

pub use client::SofascoreClient;
pub use provider::{FetchError, SportsApi};

#[cfg(test)]
pub mod stub;
