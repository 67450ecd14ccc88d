use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderData, ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};
use tfplug::{DataSourceWithConfigure, ResourceWithConfigure};

use crate::api::{self, DEFAULT_ENDPOINT};
use crate::data_sources::PostgresDatabaseDataSource;
use crate::provider_data::RapidappProviderData;
use crate::resources::PostgresDatabaseResource;
use crate::wait::WaitConfig;

pub const API_KEY_ENV: &str = "RAPIDAPP_API_KEY";
pub const ENDPOINT_ENV: &str = "RAPIDAPP_ENDPOINT";

pub struct RapidappProvider {
    wait_config: WaitConfig,
}

impl Default for RapidappProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RapidappProvider {
    pub fn new() -> Self {
        Self {
            wait_config: WaitConfig::default(),
        }
    }

    /// Override the polling used by resources configured from this provider
    pub fn with_wait_config(mut self, wait_config: WaitConfig) -> Self {
        self.wait_config = wait_config;
        self
    }
}

#[async_trait]
impl Provider for RapidappProvider {
    fn type_name(&self) -> &str {
        "rapidapp"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .description("Interact with Rapidapp managed databases")
            .attribute(
                AttributeBuilder::new("api_key", AttributeType::String)
                    .description(&format!(
                        "API key for Rapidapp. May also be set with the {} environment variable.",
                        API_KEY_ENV
                    ))
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description(&format!(
                        "Rapidapp API endpoint. Defaults to {}, or {} when set.",
                        DEFAULT_ENDPOINT, ENDPOINT_ENV
                    ))
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];
        let api_key_path = AttributePath::new("api_key");

        if request
            .config
            .get(&api_key_path)
            .is_some_and(|v| v.is_unknown())
        {
            diagnostics.push(
                Diagnostic::error(
                    "Unknown Api Key value",
                    format!(
                        "The provider cannot create the Rapidapp API client as there is an \
                         unknown configuration value for the api key. Either target apply the \
                         source of the value first, set the value statically in the \
                         configuration, or use the {} environment variable.",
                        API_KEY_ENV
                    ),
                )
                .with_attribute(api_key_path),
            );
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let api_key = request
            .config
            .get_optional_string(&api_key_path)
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default();

        if api_key.is_empty() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Api Key",
                    format!(
                        "The provider cannot create the Rapidapp API client as there is a \
                         missing or empty value for the api key. Set the api_key value in the \
                         configuration or use the {} environment variable.",
                        API_KEY_ENV
                    ),
                )
                .with_attribute(api_key_path),
            );
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let endpoint_path = AttributePath::new("endpoint");
        if request
            .config
            .get(&endpoint_path)
            .is_some_and(|v| v.is_unknown())
        {
            diagnostics.push(
                Diagnostic::error(
                    "Unknown Endpoint value",
                    format!(
                        "The provider cannot create the Rapidapp API client as there is an \
                         unknown configuration value for the endpoint. Either target apply the \
                         source of the value first, set the value statically in the \
                         configuration, or use the {} environment variable.",
                        ENDPOINT_ENV
                    ),
                )
                .with_attribute(endpoint_path),
            );
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let endpoint = request
            .config
            .get_optional_string(&endpoint_path)
            .or_else(|| std::env::var(ENDPOINT_ENV).ok())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        tracing::debug!(endpoint = %endpoint, "configuring rapidapp client");

        match api::Client::new(&endpoint, &api_key) {
            Ok(client) => {
                let data =
                    RapidappProviderData::new(client).with_wait_config(self.wait_config.clone());
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(data) as ProviderData),
                }
            }
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Unable to Create Rapidapp API Client",
                        format!("An unexpected error occurred when creating the client: {}", e),
                    )
                    .with_attribute(endpoint_path),
                );
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(
            "rapidapp_postgres_database".to_string(),
            Box::new(|| {
                Box::new(PostgresDatabaseResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert(
            "rapidapp_postgres_database".to_string(),
            Box::new(|| {
                Box::new(PostgresDatabaseDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        data_sources
    }
}
