//! Managed resources
//!
//! A resource is built fresh by its factory for every RPC, configured with the
//! provider data, and then asked to do exactly one thing. Planning is handled
//! by the server using the schema's plan modifiers, so resources only deal
//! with the remote API.

use crate::context::Context;
use crate::provider::ProviderData;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;

#[async_trait]
pub trait Resource: Send + Sync {
    /// MUST match the key used in Provider::resources()
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse;

    async fn schema(&self, ctx: Context, request: ResourceSchemaRequest) -> ResourceSchemaResponse;

    /// Extra checks on top of the schema validation the server already did
    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse::default()
    }

    /// new_state must not contain unknown values once this returns without errors
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// Return `ReadResourceResponse::removed()` when the remote object is gone
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        None
    }
}

/// Every registered resource receives the provider data before it is used
#[async_trait]
pub trait ResourceWithConfigure: Resource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse;
}

/// `terraform import` support, reached through Resource::as_import_state
#[async_trait]
pub trait ResourceWithImportState: Resource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse;
}

#[derive(Debug)]
pub struct ResourceMetadataRequest;

#[derive(Debug)]
pub struct ResourceMetadataResponse {
    pub type_name: String,
}

#[derive(Debug)]
pub struct ResourceSchemaRequest;

#[derive(Debug)]
pub struct ResourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ValidateResourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

#[derive(Debug, Default)]
pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct CreateResourceRequest {
    pub type_name: String,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

#[derive(Debug)]
pub struct CreateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl CreateResourceResponse {
    pub fn created(new_state: DynamicValue) -> Self {
        Self {
            new_state,
            diagnostics: vec![],
        }
    }

    /// Nothing was created, so nothing is written to state
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            new_state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
        }
    }
}

#[derive(Debug)]
pub struct ReadResourceRequest {
    pub type_name: String,
    pub current_state: DynamicValue,
}

#[derive(Debug)]
pub struct ReadResourceResponse {
    /// None removes the resource from state
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadResourceResponse {
    pub fn found(new_state: DynamicValue) -> Self {
        Self {
            new_state: Some(new_state),
            diagnostics: vec![],
        }
    }

    pub fn removed() -> Self {
        Self {
            new_state: None,
            diagnostics: vec![],
        }
    }

    /// Keeps the current state so a failed refresh does not drop the resource
    pub fn failed(current_state: DynamicValue, diagnostic: Diagnostic) -> Self {
        Self {
            new_state: Some(current_state),
            diagnostics: vec![diagnostic],
        }
    }
}

#[derive(Debug)]
pub struct UpdateResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
    pub planned_state: DynamicValue,
    pub config: DynamicValue,
}

#[derive(Debug)]
pub struct UpdateResourceResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct DeleteResourceRequest {
    pub type_name: String,
    pub prior_state: DynamicValue,
}

#[derive(Debug, Default)]
pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureResourceRequest {
    /// None until the provider itself has been configured
    pub provider_data: Option<ProviderData>,
}

#[derive(Debug, Default)]
pub struct ConfigureResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ImportResourceStateRequest {
    pub type_name: String,
    pub id: String,
}

#[derive(Debug, Default)]
pub struct ImportResourceStateResponse {
    pub imported_resources: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: DynamicValue,
}
