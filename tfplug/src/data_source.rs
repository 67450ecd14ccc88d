//! Data sources
//!
//! Read-only lookups. Like resources they are built per call and configured
//! with the provider data before `read` runs.

use crate::context::Context;
use crate::provider::ProviderData;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// MUST match the key used in Provider::data_sources()
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse;

    async fn schema(
        &self,
        ctx: Context,
        request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse;

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse::default()
    }

    /// The returned state must have every computed attribute filled in
    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

#[async_trait]
pub trait DataSourceWithConfigure: DataSource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse;
}

#[derive(Debug)]
pub struct DataSourceMetadataRequest;

#[derive(Debug)]
pub struct DataSourceMetadataResponse {
    pub type_name: String,
}

#[derive(Debug)]
pub struct DataSourceSchemaRequest;

#[derive(Debug)]
pub struct DataSourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ValidateDataSourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

#[derive(Debug, Default)]
pub struct ValidateDataSourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ReadDataSourceRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

#[derive(Debug)]
pub struct ReadDataSourceResponse {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadDataSourceResponse {
    pub fn found(state: DynamicValue) -> Self {
        Self {
            state,
            diagnostics: vec![],
        }
    }

    /// Echoes the config back alongside the error
    pub fn failed(config: DynamicValue, diagnostic: Diagnostic) -> Self {
        Self {
            state: config,
            diagnostics: vec![diagnostic],
        }
    }
}

pub struct ConfigureDataSourceRequest {
    pub provider_data: Option<ProviderData>,
}

#[derive(Debug, Default)]
pub struct ConfigureDataSourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}
