//! tfplug - Terraform Plugin Framework for Rust
//!
//! Implements the server side of Terraform plugin protocol 6: the go-plugin
//! handshake, AutoMTLS, the tfplugin6 gRPC service and the msgpack value
//! codec. Providers implement [`Provider`] and hand out factories for their
//! resources and data sources; [`serve_default`] does the rest.
//!
//! Plan computation is intentionally small. The server marks computed
//! attributes unknown when something changed and then runs each attribute's
//! [`PlanModifier`]s, which is enough for id-style computed values and
//! force-new arguments.

pub mod context;
pub mod error;
pub mod types;

pub mod plan_modifier;
pub mod schema;

pub mod data_source;
pub mod import;
pub mod provider;
pub mod resource;

pub mod grpc;
pub mod proto;
pub mod server;

pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use grpc::ProviderService;
pub use import::import_state_passthrough_id;
pub use plan_modifier::{PlanModifier, RequiresReplace, UseStateForUnknown};
pub use provider::{DataSourceFactory, Provider, ProviderData, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use server::{serve, serve_default, ServerConfig};
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

/// Generates a tokio `main` that serves the given provider.
///
/// Without a config the server settings come from the environment
/// (see [`ServerConfig::from_env`]).
#[macro_export]
macro_rules! serve_provider {
    ($provider:expr) => {
        #[tokio::main]
        async fn main() -> $crate::Result<()> {
            $crate::serve_default($provider).await
        }
    };
    ($provider:expr, $config:expr) => {
        #[tokio::main]
        async fn main() -> $crate::Result<()> {
            $crate::serve($provider, $config).await
        }
    };
}
