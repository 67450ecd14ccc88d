//! Terraform provider for Rapidapp managed databases

pub mod api;
pub mod data_sources;
pub mod provider;
pub mod provider_data;
pub mod resources;
pub mod wait;

pub use provider::RapidappProvider;
pub use provider_data::RapidappProviderData;
