pub mod client;
pub mod fingerprint;

pub use client::InventoryClient;
