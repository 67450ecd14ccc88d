//! gRPC service implementation of the tfplugin6 Provider service
//!
//! Resources and data sources are built on demand from the provider's
//! factories, configured with the stored provider data, and dropped once the
//! call returns. The only shared mutable state is the provider itself and the
//! provider data produced by ConfigureProvider.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::plan_modifier::{values_equal, PlanModifyRequest};
use crate::proto::tfplugin6 as proto;
use crate::proto::tfplugin6::provider_server::Provider as ProtoProvider;
use crate::provider::{
    ConfigureProviderRequest, DataSourceFactory, Provider, ProviderData, ProviderSchemaRequest,
    ResourceFactory, ValidateProviderConfigRequest,
};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, ResourceSchemaRequest,
    ResourceWithConfigure, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::schema::{Schema, StringKind};
use crate::types::{
    has_errors, AttributePath, AttributePathStep, Diagnostic, DiagnosticSeverity, Dynamic,
    DynamicValue,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

type RpcResult<T> = std::result::Result<Response<T>, Status>;

pub struct ProviderService<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: Arc<RwLock<Option<ProviderData>>>,
    resources: Arc<HashMap<String, ResourceFactory>>,
    data_sources: Arc<HashMap<String, DataSourceFactory>>,
    ctx: Context,
}

impl<P: Provider + 'static> ProviderService<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();

        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: Arc::new(RwLock::new(None)),
            resources: Arc::new(resources),
            data_sources: Arc::new(data_sources),
            ctx: Context::new(),
        }
    }

    /// Root context handed to every operation; StopProvider cancels it
    pub fn context(&self) -> Context {
        self.ctx.clone()
    }

    /// Build and configure a resource, or explain why it could not be
    async fn resource(
        &self,
        type_name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn ResourceWithConfigure>> {
        let Some(factory) = self.resources.get(type_name) else {
            tracing::warn!(type_name, "unknown resource type requested");
            diagnostics.push(Diagnostic::error(
                "Resource Type Not Found",
                format!(
                    "The provider does not support the resource type \"{}\".",
                    type_name
                ),
            ));
            return None;
        };

        let mut resource = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(self.ctx.clone(), ConfigureResourceRequest { provider_data })
            .await;
        let failed = has_errors(&response.diagnostics);
        diagnostics.extend(response.diagnostics);

        (!failed).then_some(resource)
    }

    async fn data_source(
        &self,
        type_name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Box<dyn DataSourceWithConfigure>> {
        let Some(factory) = self.data_sources.get(type_name) else {
            tracing::warn!(type_name, "unknown data source type requested");
            diagnostics.push(Diagnostic::error(
                "Data Source Type Not Found",
                format!(
                    "The provider does not support the data source type \"{}\".",
                    type_name
                ),
            ));
            return None;
        };

        let mut data_source = factory();
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(self.ctx.clone(), ConfigureDataSourceRequest { provider_data })
            .await;
        let failed = has_errors(&response.diagnostics);
        diagnostics.extend(response.diagnostics);

        (!failed).then_some(data_source)
    }

    async fn resource_schema(
        &self,
        resource: &dyn ResourceWithConfigure,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Schema {
        let response = resource
            .schema(self.ctx.clone(), ResourceSchemaRequest)
            .await;
        diagnostics.extend(response.diagnostics);
        response.schema
    }

    fn sorted_names<V>(map: &HashMap<String, V>) -> Vec<String> {
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }
}

#[tonic::async_trait]
impl<P: Provider + 'static> ProtoProvider for ProviderService<P> {
    async fn get_metadata(
        &self,
        _request: Request<proto::get_metadata::Request>,
    ) -> RpcResult<proto::get_metadata::Response> {
        let resources = Self::sorted_names(&self.resources)
            .into_iter()
            .map(|type_name| proto::get_metadata::ResourceMetadata { type_name })
            .collect();
        let data_sources = Self::sorted_names(&self.data_sources)
            .into_iter()
            .map(|type_name| proto::get_metadata::DataSourceMetadata { type_name })
            .collect();

        Ok(Response::new(proto::get_metadata::Response {
            server_capabilities: Some(server_capabilities()),
            diagnostics: vec![],
            data_sources,
            resources,
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<proto::get_provider_schema::Request>,
    ) -> RpcResult<proto::get_provider_schema::Response> {
        let mut diagnostics = Vec::new();

        let provider_schema = {
            let provider = self.provider.read().await;
            let response = provider.schema(self.ctx.clone(), ProviderSchemaRequest).await;
            diagnostics.extend(response.diagnostics);
            response.schema
        };

        let mut resource_schemas = HashMap::new();
        for (type_name, factory) in self.resources.iter() {
            let resource = factory();
            let response = resource
                .schema(self.ctx.clone(), ResourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            resource_schemas.insert(type_name.clone(), schema_to_proto(&response.schema));
        }

        let mut data_source_schemas = HashMap::new();
        for (type_name, factory) in self.data_sources.iter() {
            let data_source = factory();
            let response = data_source
                .schema(self.ctx.clone(), DataSourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            data_source_schemas.insert(type_name.clone(), schema_to_proto(&response.schema));
        }

        Ok(Response::new(proto::get_provider_schema::Response {
            provider: Some(schema_to_proto(&provider_schema)),
            resource_schemas,
            data_source_schemas,
            diagnostics: diagnostics_to_proto(diagnostics),
            provider_meta: None,
            server_capabilities: Some(server_capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<proto::validate_provider_config::Request>,
    ) -> RpcResult<proto::validate_provider_config::Response> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        let provider = self.provider.read().await;
        let schema = provider
            .schema(self.ctx.clone(), ProviderSchemaRequest)
            .await
            .schema;

        let mut diagnostics = schema.validate_config(&config);
        if !has_errors(&diagnostics) {
            let response = provider
                .validate(self.ctx.clone(), ValidateProviderConfigRequest { config })
                .await;
            diagnostics.extend(response.diagnostics);
        }

        Ok(Response::new(proto::validate_provider_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<proto::validate_resource_config::Request>,
    ) -> RpcResult<proto::validate_resource_config::Response> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;
        let mut diagnostics = Vec::new();

        if let Some(resource) = self.resource(&req.type_name, &mut diagnostics).await {
            let schema = self.resource_schema(resource.as_ref(), &mut diagnostics).await;
            let schema_diagnostics = schema.validate_config(&config);
            let failed = has_errors(&schema_diagnostics);
            diagnostics.extend(schema_diagnostics);

            if !failed {
                let response = resource
                    .validate(
                        self.ctx.clone(),
                        ValidateResourceConfigRequest {
                            type_name: req.type_name,
                            config,
                        },
                    )
                    .await;
                diagnostics.extend(response.diagnostics);
            }
        }

        Ok(Response::new(proto::validate_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<proto::validate_data_resource_config::Request>,
    ) -> RpcResult<proto::validate_data_resource_config::Response> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;
        let mut diagnostics = Vec::new();

        if let Some(data_source) = self.data_source(&req.type_name, &mut diagnostics).await {
            let response = data_source
                .schema(self.ctx.clone(), DataSourceSchemaRequest)
                .await;
            diagnostics.extend(response.diagnostics);
            let schema_diagnostics = response.schema.validate_config(&config);
            let failed = has_errors(&schema_diagnostics);
            diagnostics.extend(schema_diagnostics);

            if !failed {
                let response = data_source
                    .validate(
                        self.ctx.clone(),
                        ValidateDataSourceConfigRequest {
                            type_name: req.type_name,
                            config,
                        },
                    )
                    .await;
                diagnostics.extend(response.diagnostics);
            }
        }

        Ok(Response::new(proto::validate_data_resource_config::Response {
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<proto::upgrade_resource_state::Request>,
    ) -> RpcResult<proto::upgrade_resource_state::Response> {
        let req = request.into_inner();
        let mut diagnostics = Vec::new();

        let Some(resource) = self.resource(&req.type_name, &mut diagnostics).await else {
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        };
        let schema = self.resource_schema(resource.as_ref(), &mut diagnostics).await;

        if req.version > schema.version {
            diagnostics.push(Diagnostic::error(
                "Unable to upgrade resource state",
                format!(
                    "The stored state of {} has schema version {}, which is newer than \
                     version {} supported by this provider. Upgrade the provider.",
                    req.type_name, req.version, schema.version
                ),
            ));
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        }

        let raw_state = req.raw_state.unwrap_or_default();
        if raw_state.json.is_empty() && !raw_state.flatmap.is_empty() {
            diagnostics.push(Diagnostic::error(
                "Unable to upgrade resource state",
                "Flatmap state from Terraform 0.11 and earlier is not supported.",
            ));
            return Ok(Response::new(proto::upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        }

        let state = DynamicValue::decode_json(&raw_state.json)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        let state = conform_to_schema(state, &schema);

        Ok(Response::new(proto::upgrade_resource_state::Response {
            upgraded_state: Some(encode_dynamic_value(&state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn configure_provider(
        &self,
        request: Request<proto::configure_provider::Request>,
    ) -> RpcResult<proto::configure_provider::Response> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;

        tracing::info!(terraform_version = %req.terraform_version, "configuring provider");

        let response = {
            let mut provider = self.provider.write().await;
            provider
                .configure(
                    self.ctx.clone(),
                    ConfigureProviderRequest {
                        terraform_version: req.terraform_version,
                        config,
                    },
                )
                .await
        };

        if let Some(data) = response.provider_data {
            *self.provider_data.write().await = Some(data);
        }

        Ok(Response::new(proto::configure_provider::Response {
            diagnostics: diagnostics_to_proto(response.diagnostics),
        }))
    }

    async fn read_resource(
        &self,
        request: Request<proto::read_resource::Request>,
    ) -> RpcResult<proto::read_resource::Response> {
        let req = request.into_inner();
        let current_state = decode_dynamic_value(&req.current_state)?;
        let mut diagnostics = Vec::new();

        let Some(resource) = self.resource(&req.type_name, &mut diagnostics).await else {
            return Ok(Response::new(proto::read_resource::Response {
                new_state: req.current_state,
                diagnostics: diagnostics_to_proto(diagnostics),
                private: req.private,
            }));
        };
        let schema = self.resource_schema(resource.as_ref(), &mut diagnostics).await;

        let response = resource
            .read(
                self.ctx.clone(),
                ReadResourceRequest {
                    type_name: req.type_name.clone(),
                    current_state: current_state.clone(),
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);

        let new_state = match response.new_state {
            Some(state) => conform_to_schema(state, &schema),
            // Keep what Terraform has when the read itself failed
            None if has_errors(&diagnostics) => current_state,
            None => {
                tracing::info!(
                    type_name = %req.type_name,
                    "resource no longer exists, removing from state"
                );
                DynamicValue::null()
            }
        };

        Ok(Response::new(proto::read_resource::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
            private: req.private,
        }))
    }

    async fn plan_resource_change(
        &self,
        request: Request<proto::plan_resource_change::Request>,
    ) -> RpcResult<proto::plan_resource_change::Response> {
        let req = request.into_inner();
        let prior_state = decode_dynamic_value(&req.prior_state)?;
        let proposed_new_state = decode_dynamic_value(&req.proposed_new_state)?;
        let config = decode_dynamic_value(&req.config)?;
        let mut diagnostics = Vec::new();

        // Destroy plans are passed through untouched
        if proposed_new_state.is_null() {
            return Ok(Response::new(proto::plan_resource_change::Response {
                planned_state: Some(encode_dynamic_value(&DynamicValue::null())?),
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: vec![],
                legacy_type_system: false,
            }));
        }

        let Some(resource) = self.resource(&req.type_name, &mut diagnostics).await else {
            return Ok(Response::new(proto::plan_resource_change::Response {
                planned_state: req.proposed_new_state,
                requires_replace: vec![],
                planned_private: req.prior_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
            }));
        };
        let schema = self.resource_schema(resource.as_ref(), &mut diagnostics).await;

        let is_create = prior_state.is_null();
        let has_changes = is_create || !values_equal(&prior_state.value, &proposed_new_state.value);
        let mut planned_state = proposed_new_state;
        let mut requires_replace = Vec::new();

        for attr in &schema.block.attributes {
            let path = AttributePath::new(&attr.name);
            let config_value = config.get(&path).cloned().unwrap_or(Dynamic::Null);

            // Computed values the config leaves unset will be decided by apply
            if attr.computed && has_changes && config_value.is_null() {
                planned_state
                    .set_value(&path, Dynamic::Unknown)
                    .map_err(|e| Status::internal(e.to_string()))?;
            }

            let state_value = prior_state.get(&path).cloned().unwrap_or(Dynamic::Null);
            let mut plan_value = planned_state.get(&path).cloned().unwrap_or(Dynamic::Null);

            for modifier in &attr.plan_modifiers {
                let response = modifier.modify_plan(PlanModifyRequest {
                    state: state_value.clone(),
                    plan: plan_value,
                    config: config_value.clone(),
                    attribute_path: path.clone(),
                });
                plan_value = response.plan_value;
                diagnostics.extend(response.diagnostics);

                if response.requires_replace && !requires_replace.contains(&path) {
                    requires_replace.push(path.clone());
                }
            }

            planned_state
                .set_value(&path, plan_value)
                .map_err(|e| Status::internal(e.to_string()))?;
        }

        if !requires_replace.is_empty() {
            tracing::debug!(
                type_name = %req.type_name,
                attributes = ?requires_replace.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "plan requires replacement"
            );
        }

        Ok(Response::new(proto::plan_resource_change::Response {
            planned_state: Some(encode_dynamic_value(&planned_state)?),
            requires_replace: requires_replace.iter().map(attribute_path_to_proto).collect(),
            planned_private: req.prior_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<proto::apply_resource_change::Request>,
    ) -> RpcResult<proto::apply_resource_change::Response> {
        let req = request.into_inner();
        let prior_state = decode_dynamic_value(&req.prior_state)?;
        let planned_state = decode_dynamic_value(&req.planned_state)?;
        let config = decode_dynamic_value(&req.config)?;
        let mut diagnostics = Vec::new();

        let Some(resource) = self.resource(&req.type_name, &mut diagnostics).await else {
            return Ok(Response::new(proto::apply_resource_change::Response {
                new_state: req.prior_state,
                private: req.planned_private,
                diagnostics: diagnostics_to_proto(diagnostics),
                legacy_type_system: false,
            }));
        };
        let schema = self.resource_schema(resource.as_ref(), &mut diagnostics).await;
        let type_name = req.type_name;

        let new_state = if planned_state.is_null() {
            tracing::info!(%type_name, "deleting resource");
            let response = resource
                .delete(
                    self.ctx.clone(),
                    DeleteResourceRequest {
                        type_name,
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);

            if has_errors(&diagnostics) {
                prior_state
            } else {
                DynamicValue::null()
            }
        } else if prior_state.is_null() {
            tracing::info!(%type_name, "creating resource");
            let response = resource
                .create(
                    self.ctx.clone(),
                    CreateResourceRequest {
                        type_name,
                        planned_state,
                        config,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            response.new_state
        } else {
            tracing::info!(%type_name, "updating resource");
            let response = resource
                .update(
                    self.ctx.clone(),
                    UpdateResourceRequest {
                        type_name,
                        prior_state,
                        planned_state,
                        config,
                    },
                )
                .await;
            diagnostics.extend(response.diagnostics);
            response.new_state
        };

        let new_state = conform_to_schema(new_state, &schema);
        if !has_errors(&diagnostics) && !new_state.value.is_fully_known() {
            diagnostics.push(Diagnostic::error(
                "Provider returned invalid result object after apply",
                "After applying this change, the provider left some attributes unknown. \
                 This is a bug in the provider.",
            ));
        }

        Ok(Response::new(proto::apply_resource_change::Response {
            new_state: Some(encode_dynamic_value(&new_state)?),
            private: req.planned_private,
            diagnostics: diagnostics_to_proto(diagnostics),
            legacy_type_system: false,
        }))
    }

    async fn import_resource_state(
        &self,
        request: Request<proto::import_resource_state::Request>,
    ) -> RpcResult<proto::import_resource_state::Response> {
        let req = request.into_inner();
        let mut diagnostics = Vec::new();
        let mut imported_resources = Vec::new();

        if let Some(resource) = self.resource(&req.type_name, &mut diagnostics).await {
            let schema = self.resource_schema(resource.as_ref(), &mut diagnostics).await;

            match resource.as_import_state() {
                Some(importer) => {
                    let response = importer
                        .import_state(
                            self.ctx.clone(),
                            ImportResourceStateRequest {
                                type_name: req.type_name.clone(),
                                id: req.id,
                            },
                        )
                        .await;
                    diagnostics.extend(response.diagnostics);

                    for imported in response.imported_resources {
                        let state = conform_to_schema(imported.state, &schema);
                        imported_resources.push(proto::import_resource_state::ImportedResource {
                            type_name: imported.type_name,
                            state: Some(encode_dynamic_value(&state)?),
                            private: vec![],
                        });
                    }
                }
                None => diagnostics.push(Diagnostic::error(
                    "Resource Import Not Implemented",
                    format!(
                        "This resource does not support import: {}",
                        req.type_name
                    ),
                )),
            }
        }

        Ok(Response::new(proto::import_resource_state::Response {
            imported_resources,
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<proto::read_data_source::Request>,
    ) -> RpcResult<proto::read_data_source::Response> {
        let req = request.into_inner();
        let config = decode_dynamic_value(&req.config)?;
        let mut diagnostics = Vec::new();

        let Some(data_source) = self.data_source(&req.type_name, &mut diagnostics).await else {
            return Ok(Response::new(proto::read_data_source::Response {
                state: None,
                diagnostics: diagnostics_to_proto(diagnostics),
            }));
        };
        let schema_response = data_source
            .schema(self.ctx.clone(), DataSourceSchemaRequest)
            .await;
        diagnostics.extend(schema_response.diagnostics);

        let response = data_source
            .read(
                self.ctx.clone(),
                ReadDataSourceRequest {
                    type_name: req.type_name,
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        let state = conform_to_schema(response.state, &schema_response.schema);

        Ok(Response::new(proto::read_data_source::Response {
            state: Some(encode_dynamic_value(&state)?),
            diagnostics: diagnostics_to_proto(diagnostics),
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<proto::stop_provider::Request>,
    ) -> RpcResult<proto::stop_provider::Response> {
        tracing::info!("stop requested, cancelling in-flight operations");
        self.ctx.cancel();

        Ok(Response::new(proto::stop_provider::Response {
            error: String::new(),
        }))
    }
}

fn server_capabilities() -> proto::ServerCapabilities {
    proto::ServerCapabilities {
        plan_destroy: false,
        get_provider_schema_optional: false,
        move_resource_state: false,
    }
}

/// Object values get every schema attribute and nothing else
fn conform_to_schema(value: DynamicValue, schema: &Schema) -> DynamicValue {
    match value.value {
        Dynamic::Map(mut values) => {
            let conformed = schema
                .block
                .attributes
                .iter()
                .map(|attr| {
                    let value = values.remove(&attr.name).unwrap_or(Dynamic::Null);
                    (attr.name.clone(), value)
                })
                .collect();
            DynamicValue::new(Dynamic::Map(conformed))
        }
        other => DynamicValue::new(other),
    }
}

#[allow(clippy::result_large_err)]
fn decode_dynamic_value(
    value: &Option<proto::DynamicValue>,
) -> std::result::Result<DynamicValue, Status> {
    let Some(value) = value else {
        return Ok(DynamicValue::null());
    };

    let decoded = if !value.msgpack.is_empty() {
        DynamicValue::decode_msgpack(&value.msgpack)
    } else {
        DynamicValue::decode_json(&value.json)
    };

    decoded.map_err(|e| {
        tracing::error!(error = %e, "failed to decode dynamic value");
        Status::invalid_argument(e.to_string())
    })
}

#[allow(clippy::result_large_err)]
fn encode_dynamic_value(value: &DynamicValue) -> std::result::Result<proto::DynamicValue, Status> {
    let msgpack = value
        .encode_msgpack()
        .map_err(|e| Status::internal(e.to_string()))?;

    Ok(proto::DynamicValue {
        msgpack,
        json: vec![],
    })
}

fn schema_to_proto(schema: &Schema) -> proto::Schema {
    let attributes = schema
        .block
        .attributes
        .iter()
        .map(|attr| proto::schema::Attribute {
            name: attr.name.clone(),
            r#type: attr.r#type.to_bytes(),
            description: attr.description.clone(),
            required: attr.required,
            optional: attr.optional,
            computed: attr.computed,
            sensitive: attr.sensitive,
            description_kind: string_kind_to_proto(schema.block.description_kind),
            deprecated: attr.deprecated,
            write_only: false,
        })
        .collect();

    proto::Schema {
        version: schema.version,
        block: Some(proto::schema::Block {
            version: schema.block.version,
            attributes,
            description: schema.block.description.clone(),
            description_kind: string_kind_to_proto(schema.block.description_kind),
            deprecated: schema.block.deprecated,
        }),
    }
}

fn string_kind_to_proto(kind: StringKind) -> i32 {
    match kind {
        StringKind::Plain => proto::StringKind::Plain as i32,
        StringKind::Markdown => proto::StringKind::Markdown as i32,
    }
}

fn attribute_path_to_proto(path: &AttributePath) -> proto::AttributePath {
    use proto::attribute_path::step::Selector;

    proto::AttributePath {
        steps: path
            .steps
            .iter()
            .map(|step| proto::attribute_path::Step {
                selector: Some(match step {
                    AttributePathStep::AttributeName(name) => Selector::AttributeName(name.clone()),
                    AttributePathStep::ElementKeyString(key) => {
                        Selector::ElementKeyString(key.clone())
                    }
                    AttributePathStep::ElementKeyInt(idx) => Selector::ElementKeyInt(*idx),
                }),
            })
            .collect(),
    }
}

fn diagnostics_to_proto(diagnostics: Vec<Diagnostic>) -> Vec<proto::Diagnostic> {
    diagnostics
        .into_iter()
        .map(|diag| {
            let severity = match diag.severity {
                DiagnosticSeverity::Invalid => proto::diagnostic::Severity::Invalid,
                DiagnosticSeverity::Error => proto::diagnostic::Severity::Error,
                DiagnosticSeverity::Warning => proto::diagnostic::Severity::Warning,
            };
            proto::Diagnostic {
                severity: severity as i32,
                summary: diag.summary,
                detail: diag.detail,
                attribute: diag.attribute.as_ref().map(attribute_path_to_proto),
            }
        })
        .collect()
}
