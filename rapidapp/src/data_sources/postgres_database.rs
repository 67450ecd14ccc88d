use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceMetadataRequest, DataSourceMetadataResponse, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse, ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic};

use crate::provider_data::RapidappProviderData;
use crate::resources::postgres_database::database_state;

#[derive(Default)]
pub struct PostgresDatabaseDataSource {
    provider_data: Option<RapidappProviderData>,
}

impl PostgresDatabaseDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for PostgresDatabaseDataSource {
    fn type_name(&self) -> &str {
        "rapidapp_postgres_database"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .description("Fetches a Rapidapp postgres database")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Postgres database identifier")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Postgres database name")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .description("Postgres database status")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let mut response = ValidateDataSourceConfigResponse::default();

        // Unknown ids are resolved at apply time
        if request
            .config
            .get_optional_string(&AttributePath::new("id"))
            .is_some_and(|id| id.trim().is_empty())
        {
            response.diagnostics.push(
                Diagnostic::error("Invalid id", "id must not be empty")
                    .with_attribute(AttributePath::new("id")),
            );
        }

        response
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let Some(provider_data) = &self.provider_data else {
            return ReadDataSourceResponse::failed(
                request.config,
                Diagnostic::error(
                    "Provider not configured",
                    "The provider has not been configured. \
                     Make sure the provider block has an api key.",
                ),
            );
        };

        let id = match request.config.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(e) => {
                return ReadDataSourceResponse::failed(
                    request.config,
                    Diagnostic::error(
                        "Unable to Read Postgres databases data",
                        format!("Could not read id from config: {}", e),
                    )
                    .with_attribute(AttributePath::new("id")),
                );
            }
        };

        match provider_data.client.postgres().get(&id).await {
            Ok(db) => ReadDataSourceResponse::found(database_state(&db)),
            Err(e) => ReadDataSourceResponse::failed(
                request.config,
                Diagnostic::error("Unable to Read Postgres databases data", e.to_string()),
            ),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for PostgresDatabaseDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut response = ConfigureDataSourceResponse::default();

        if let Some(data) = request.provider_data {
            match data.downcast_ref::<RapidappProviderData>() {
                Some(provider_data) => self.provider_data = Some(provider_data.clone()),
                None => response.diagnostics.push(Diagnostic::error(
                    "Unexpected Data Source Configure Type",
                    "Expected RapidappProviderData. \
                     Please report this issue to the provider developers.",
                )),
            }
        }

        response
    }
}
