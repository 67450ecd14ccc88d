//! Managed Postgres database resource

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::{import_state_passthrough_id, RequiresReplace, UseStateForUnknown};

use crate::api::PostgresDatabase;
use crate::provider_data::RapidappProviderData;
use crate::wait::{wait_for_deleted, wait_for_ready, WaitError};

#[derive(Default)]
pub struct PostgresDatabaseResource {
    provider_data: Option<RapidappProviderData>,
}

impl PostgresDatabaseResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_configured() -> Diagnostic {
        Diagnostic::error(
            "Provider not configured",
            "The provider has not been configured. Make sure the provider block has an api key.",
        )
    }
}

fn postgres_state(id: &str, name: &str, status: Dynamic) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(HashMap::from([
        ("id".to_string(), Dynamic::String(id.to_string())),
        ("name".to_string(), Dynamic::String(name.to_string())),
        ("status".to_string(), status),
    ])))
}

/// State built from an API record
pub(crate) fn database_state(db: &PostgresDatabase) -> DynamicValue {
    postgres_state(&db.id, &db.name, Dynamic::String(db.status.clone()))
}

pub(crate) fn wait_diagnostic(summary: &str, id: &str, err: &WaitError) -> Diagnostic {
    let detail = match err {
        WaitError::Timeout(message) => format!(
            "Timed out waiting for postgres database {}: {}. The database may still become \
             available, run terraform refresh to pick it up.",
            id, message
        ),
        WaitError::Cancelled => format!(
            "Stopped waiting for postgres database {} because the operation was cancelled",
            id
        ),
        WaitError::Api(e) => format!("Could not poll postgres database {}: {}", id, e),
    };
    Diagnostic::error(summary, detail)
}

#[async_trait]
impl Resource for PostgresDatabaseResource {
    fn type_name(&self) -> &str {
        "rapidapp_postgres_database"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .description("Manages a Rapidapp postgres database")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Postgres database identifier")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Postgres database name. Changing it creates a new database.")
                    .required()
                    .plan_modifier(RequiresReplace)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .description("Postgres database status")
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return CreateResourceResponse::failed(Self::not_configured());
        };

        let name = match request.planned_state.get_string(&AttributePath::new("name")) {
            Ok(name) => name,
            Err(e) => {
                return CreateResourceResponse::failed(
                    Diagnostic::error(
                        "Invalid name",
                        format!("Could not read name from plan: {}", e),
                    )
                    .with_attribute(AttributePath::new("name")),
                );
            }
        };

        let client = &provider_data.client;
        let id = match client.postgres().create(&name).await {
            Ok(id) => id,
            Err(e) => {
                return CreateResourceResponse::failed(Diagnostic::error(
                    "Error creating postgres database",
                    format!("Could not create postgres database, unexpected error: {}", e),
                ));
            }
        };

        // name comes from the plan, not the API record
        match wait_for_ready(&ctx, client, &id, &provider_data.wait_config).await {
            Ok(db) => CreateResourceResponse::created(postgres_state(
                &db.id,
                &name,
                Dynamic::String(db.status),
            )),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "postgres database did not become ready");
                // Keep the id so terraform tracks (and taints) what was created
                CreateResourceResponse {
                    new_state: postgres_state(&id, &name, Dynamic::Null),
                    diagnostics: vec![wait_diagnostic(
                        "Error waiting for postgres database",
                        &id,
                        &e,
                    )],
                }
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return ReadResourceResponse::failed(request.current_state, Self::not_configured());
        };

        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return ReadResourceResponse::failed(
                    request.current_state,
                    Diagnostic::error(
                        "Error reading postgres database",
                        format!("Could not read id from state: {}", e),
                    ),
                );
            }
        };

        let client = &provider_data.client;
        let db = match client.postgres().get(&id).await {
            Ok(db) => db,
            Err(e) if e.is_not_found() => {
                tracing::info!(id = %id, "postgres database no longer exists, removing from state");
                return ReadResourceResponse::removed();
            }
            Err(e) => {
                return ReadResourceResponse::failed(
                    request.current_state,
                    Diagnostic::error(
                        "Error reading postgres database",
                        format!("Could not read postgres database {}: {}", id, e),
                    ),
                );
            }
        };

        if db.is_running() {
            return ReadResourceResponse::found(database_state(&db));
        }

        match wait_for_ready(&ctx, client, &id, &provider_data.wait_config).await {
            Ok(db) => ReadResourceResponse::found(database_state(&db)),
            Err(e) => ReadResourceResponse::failed(
                request.current_state,
                wait_diagnostic("Error waiting for postgres database", &id, &e),
            ),
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.prior_state,
            diagnostics: vec![Diagnostic::error(
                "Update not supported",
                "Postgres databases cannot be updated in place. \
                 Changing the name replaces the database.",
            )],
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut response = DeleteResourceResponse::default();
        let Some(provider_data) = &self.provider_data else {
            response.diagnostics.push(Self::not_configured());
            return response;
        };

        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                response.diagnostics.push(Diagnostic::error(
                    "Error deleting postgres database",
                    format!("Could not read id from state: {}", e),
                ));
                return response;
            }
        };

        let client = &provider_data.client;
        match client.postgres().delete(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(id = %id, "postgres database already deleted");
                return response;
            }
            Err(e) => {
                response.diagnostics.push(Diagnostic::error(
                    "Error deleting postgres database",
                    format!("Could not delete postgres database {}: {}", id, e),
                ));
                return response;
            }
        }

        if let Err(e) = wait_for_deleted(&ctx, client, &id, &provider_data.wait_config).await {
            response.diagnostics.push(wait_diagnostic(
                "Error waiting for postgres database to be deleted",
                &id,
                &e,
            ));
        }

        response
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithConfigure for PostgresDatabaseResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut response = ConfigureResourceResponse::default();

        // Not configured yet during early validation calls
        let Some(data) = request.provider_data else {
            return response;
        };

        match data.downcast_ref::<RapidappProviderData>() {
            Some(provider_data) => self.provider_data = Some(provider_data.clone()),
            None => response.diagnostics.push(Diagnostic::error(
                "Unexpected Resource Configure Type",
                "Expected RapidappProviderData. \
                 Please report this issue to the provider developers.",
            )),
        }

        response
    }
}

#[async_trait]
impl ResourceWithImportState for PostgresDatabaseResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse::default();
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}
