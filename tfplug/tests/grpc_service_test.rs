//! Drives the tfplugin6 service with a small in-memory provider

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource,
    DataSourceMetadataRequest, DataSourceMetadataResponse, DataSourceSchemaRequest,
    DataSourceSchemaResponse, DataSourceWithConfigure, ReadDataSourceRequest,
    ReadDataSourceResponse,
};
use tfplug::proto::tfplugin6 as proto;
use tfplug::proto::tfplugin6::provider_server::Provider as _;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::{import_state_passthrough_id, ProviderService, RequiresReplace, UseStateForUnknown};
use tonic::Request;

// Shared fake backend handed out as provider data
#[derive(Default)]
struct Store {
    items: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
}

struct InventoryProvider;

#[async_trait]
impl Provider for InventoryProvider {
    fn type_name(&self) -> &str {
        "inventory"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: "inventory".to_string(),
            version: "0.1.0".to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(
                    AttributeBuilder::new("token", AttributeType::String)
                        .optional()
                        .sensitive()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        if request
            .config
            .get_optional_string(&AttributePath::new("token"))
            .as_deref()
            == Some("bad")
        {
            return ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error("Invalid token", "rejected")
                    .with_attribute(AttributePath::new("token"))],
                provider_data: None,
            };
        }

        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(Arc::new(Store::default()) as Arc<dyn std::any::Any + Send + Sync>),
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "inventory_item".to_string(),
            Box::new(|| Box::new(ItemResource::default()) as Box<dyn ResourceWithConfigure>),
        );
        factories.insert(
            "inventory_label".to_string(),
            Box::new(|| Box::new(LabelResource) as Box<dyn ResourceWithConfigure>),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "inventory_item".to_string(),
            Box::new(|| Box::new(ItemDataSource::default()) as Box<dyn DataSourceWithConfigure>),
        );
        factories
    }
}

fn item_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .required()
                .plan_modifier(RequiresReplace)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("note", AttributeType::String)
                .optional()
                .build(),
        )
        .build()
}

#[derive(Default)]
struct ItemResource {
    store: Option<Arc<Store>>,
}

impl ItemResource {
    fn store(&self, diagnostics: &mut Vec<Diagnostic>) -> Option<&Arc<Store>> {
        if self.store.is_none() {
            diagnostics.push(Diagnostic::error("Unconfigured", "provider not configured"));
        }
        self.store.as_ref()
    }
}

#[async_trait]
impl Resource for ItemResource {
    fn type_name(&self) -> &str {
        "inventory_item"
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
        ResourceSchemaResponse {
            schema: item_schema(),
            diagnostics: vec![],
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let mut diagnostics = vec![];
        let Some(store) = self.store(&mut diagnostics) else {
            return CreateResourceResponse {
                new_state: DynamicValue::null(),
                diagnostics,
            };
        };

        let name = request
            .config
            .get_string(&AttributePath::new("name"))
            .unwrap();
        let id = format!("item-{}", store.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        store
            .items
            .lock()
            .unwrap()
            .insert(id.clone(), name.clone());

        let mut state = request.planned_state;
        state.set_string(&AttributePath::new("id"), id).unwrap();
        CreateResourceResponse {
            new_state: state,
            diagnostics,
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];
        let Some(store) = self.store(&mut diagnostics) else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics,
            };
        };

        let id = request
            .current_state
            .get_string(&AttributePath::new("id"))
            .unwrap();
        let name = store.items.lock().unwrap().get(&id).cloned();

        let new_state = name.map(|name| {
            let mut state = request.current_state.clone();
            state.set_string(&AttributePath::new("name"), name).unwrap();
            state
        });
        ReadResourceResponse {
            new_state,
            diagnostics,
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![],
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let mut diagnostics = vec![];
        if let Some(store) = self.store(&mut diagnostics) {
            let id = request
                .prior_state
                .get_string(&AttributePath::new("id"))
                .unwrap();
            store.items.lock().unwrap().remove(&id);
        }
        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithConfigure for ItemResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];
        if let Some(data) = request.provider_data {
            match data.downcast::<Store>() {
                Ok(store) => self.store = Some(store),
                Err(_) => diagnostics.push(Diagnostic::error(
                    "Unexpected Resource Configure Type",
                    "expected Store",
                )),
            }
        }
        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithImportState for ItemResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

// No import support and no store, only used for plan and error paths
struct LabelResource;

#[async_trait]
impl Resource for LabelResource {
    fn type_name(&self) -> &str {
        "inventory_label"
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
        ResourceSchemaResponse {
            schema: SchemaBuilder::new()
                .version(1)
                .attribute(
                    AttributeBuilder::new("text", AttributeType::String)
                        .required()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        CreateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        ReadResourceResponse {
            new_state: Some(request.current_state),
            diagnostics: vec![],
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![],
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        _request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for LabelResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        _request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[derive(Default)]
struct ItemDataSource {
    store: Option<Arc<Store>>,
}

#[async_trait]
impl DataSource for ItemDataSource {
    fn type_name(&self) -> &str {
        "inventory_item"
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
        DataSourceSchemaResponse {
            schema: SchemaBuilder::new()
                .attribute(
                    AttributeBuilder::new("id", AttributeType::String)
                        .required()
                        .build(),
                )
                .attribute(
                    AttributeBuilder::new("name", AttributeType::String)
                        .computed()
                        .build(),
                )
                .build(),
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let id = request.config.get_string(&AttributePath::new("id")).unwrap();
        let name = self
            .store
            .as_ref()
            .and_then(|store| store.items.lock().unwrap().get(&id).cloned());

        match name {
            Some(name) => {
                let mut state = request.config;
                state.set_string(&AttributePath::new("name"), name).unwrap();
                ReadDataSourceResponse {
                    state,
                    diagnostics: vec![],
                }
            }
            None => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error("Item not found", id)],
            },
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ItemDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        self.store = request
            .provider_data
            .and_then(|data| data.downcast::<Store>().ok());
        ConfigureDataSourceResponse {
            diagnostics: vec![],
        }
    }
}

// Helpers

fn object(pairs: &[(&str, Dynamic)]) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    ))
}

fn s(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

fn wire(value: &DynamicValue) -> Option<proto::DynamicValue> {
    Some(proto::DynamicValue {
        msgpack: value.encode_msgpack().unwrap(),
        json: vec![],
    })
}

fn unwire(value: Option<proto::DynamicValue>) -> DynamicValue {
    DynamicValue::decode_msgpack(&value.unwrap().msgpack).unwrap()
}

fn error_summaries(diagnostics: &[proto::Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|d| d.severity == proto::diagnostic::Severity::Error as i32)
        .map(|d| d.summary.clone())
        .collect()
}

async fn configured_service() -> ProviderService<InventoryProvider> {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: wire(&object(&[("token", Dynamic::Null)])),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.diagnostics.is_empty());
    service
}

async fn create_item(service: &ProviderService<InventoryProvider>, name: &str) -> DynamicValue {
    let planned = object(&[("id", Dynamic::Unknown), ("name", s(name)), ("note", Dynamic::Null)]);
    let config = object(&[("id", Dynamic::Null), ("name", s(name)), ("note", Dynamic::Null)]);

    let response = service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&DynamicValue::null()),
            planned_state: wire(&planned),
            config: wire(&config),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(error_summaries(&response.diagnostics).is_empty());
    unwire(response.new_state)
}

#[tokio::test]
async fn metadata_lists_every_type_name() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .get_metadata(Request::new(proto::get_metadata::Request {}))
        .await
        .unwrap()
        .into_inner();

    let resources: Vec<_> = response.resources.iter().map(|r| r.type_name.as_str()).collect();
    assert_eq!(resources, vec!["inventory_item", "inventory_label"]);
    assert_eq!(response.data_sources.len(), 1);
    assert!(response.server_capabilities.is_some());
}

#[tokio::test]
async fn provider_schema_includes_all_schemas() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .get_provider_schema(Request::new(proto::get_provider_schema::Request {}))
        .await
        .unwrap()
        .into_inner();

    let provider = response.provider.unwrap().block.unwrap();
    assert_eq!(provider.attributes[0].name, "token");
    assert!(provider.attributes[0].sensitive);

    let item = response.resource_schemas["inventory_item"].block.clone().unwrap();
    let names: Vec<_> = item.attributes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "note"]);
    assert_eq!(item.attributes[1].r#type, br#""string""#.to_vec());

    assert_eq!(response.resource_schemas["inventory_label"].version, 1);
    assert!(response.data_source_schemas.contains_key("inventory_item"));
}

#[tokio::test]
async fn validate_resource_config_reports_missing_required() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .validate_resource_config(Request::new(proto::validate_resource_config::Request {
            type_name: "inventory_item".to_string(),
            config: wire(&object(&[("id", Dynamic::Null), ("name", Dynamic::Null)])),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(
        error_summaries(&response.diagnostics),
        vec!["Missing required argument: name".to_string()]
    );
}

#[tokio::test]
async fn validate_provider_config_rejects_unknown_argument() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .validate_provider_config(Request::new(proto::validate_provider_config::Request {
            config: wire(&object(&[("region", s("eu"))])),
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(
        error_summaries(&response.diagnostics),
        vec!["Unsupported argument: region".to_string()]
    );
}

#[tokio::test]
async fn configure_errors_are_returned_as_diagnostics() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .configure_provider(Request::new(proto::configure_provider::Request {
            terraform_version: "1.9.0".to_string(),
            config: wire(&object(&[("token", s("bad"))])),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(error_summaries(&response.diagnostics), vec!["Invalid token".to_string()]);
    assert!(response.diagnostics[0].attribute.is_some());
}

#[tokio::test]
async fn plan_create_marks_computed_attributes_unknown() {
    let service = ProviderService::new(InventoryProvider);
    let proposed = object(&[("id", Dynamic::Null), ("name", s("bolts")), ("note", Dynamic::Null)]);

    let response = service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&DynamicValue::null()),
            proposed_new_state: wire(&proposed),
            config: wire(&proposed),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.requires_replace.is_empty());
    let planned = unwire(response.planned_state);
    assert!(planned.get(&AttributePath::new("id")).unwrap().is_unknown());
    assert_eq!(planned.get_string(&AttributePath::new("name")).unwrap(), "bolts");
    // Optional but not computed stays null
    assert!(planned.get(&AttributePath::new("note")).unwrap().is_null());
}

#[tokio::test]
async fn plan_name_change_requires_replace_and_keeps_id() {
    let service = ProviderService::new(InventoryProvider);
    let prior = object(&[("id", s("item-1")), ("name", s("bolts")), ("note", Dynamic::Null)]);
    let proposed = object(&[("id", s("item-1")), ("name", s("nuts")), ("note", Dynamic::Null)]);
    let config = object(&[("id", Dynamic::Null), ("name", s("nuts")), ("note", Dynamic::Null)]);

    let response = service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&prior),
            proposed_new_state: wire(&proposed),
            config: wire(&config),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.requires_replace.len(), 1);
    assert_eq!(
        response.requires_replace[0].steps[0].selector,
        Some(proto::attribute_path::step::Selector::AttributeName(
            "name".to_string()
        ))
    );

    let planned = unwire(response.planned_state);
    assert_eq!(planned.get_string(&AttributePath::new("id")).unwrap(), "item-1");
}

#[tokio::test]
async fn plan_without_changes_leaves_state_alone() {
    let service = ProviderService::new(InventoryProvider);
    let prior = object(&[("id", s("item-1")), ("name", s("bolts")), ("note", Dynamic::Null)]);
    let config = object(&[("id", Dynamic::Null), ("name", s("bolts")), ("note", Dynamic::Null)]);

    let response = service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&prior),
            proposed_new_state: wire(&prior),
            config: wire(&config),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.requires_replace.is_empty());
    assert_eq!(unwire(response.planned_state), prior);
}

#[tokio::test]
async fn plan_destroy_returns_null() {
    let service = ProviderService::new(InventoryProvider);
    let prior = object(&[("id", s("item-1")), ("name", s("bolts")), ("note", Dynamic::Null)]);

    let response = service
        .plan_resource_change(Request::new(proto::plan_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&prior),
            proposed_new_state: wire(&DynamicValue::null()),
            config: wire(&DynamicValue::null()),
            prior_private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(unwire(response.planned_state).is_null());
}

#[tokio::test]
async fn apply_create_read_delete_roundtrip() {
    let service = configured_service().await;

    let state = create_item(&service, "bolts").await;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "item-1");
    assert!(state.get(&AttributePath::new("note")).unwrap().is_null());

    let read = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "inventory_item".to_string(),
            current_state: wire(&state),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(unwire(read.new_state), state);

    let deleted = service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&state),
            planned_state: wire(&DynamicValue::null()),
            config: wire(&DynamicValue::null()),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(deleted.diagnostics.is_empty());
    assert!(unwire(deleted.new_state).is_null());

    // Gone remotely, so read drops it from state
    let read = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "inventory_item".to_string(),
            current_state: wire(&state),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(read.diagnostics.is_empty());
    assert!(unwire(read.new_state).is_null());
}

#[tokio::test]
async fn apply_before_configure_reports_resource_error() {
    let service = ProviderService::new(InventoryProvider);
    let planned = object(&[
        ("id", Dynamic::Unknown),
        ("name", s("bolts")),
        ("note", Dynamic::Null),
    ]);

    let response = service
        .apply_resource_change(Request::new(proto::apply_resource_change::Request {
            type_name: "inventory_item".to_string(),
            prior_state: wire(&DynamicValue::null()),
            planned_state: wire(&planned),
            config: wire(&planned),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert_eq!(error_summaries(&response.diagnostics), vec!["Unconfigured".to_string()]);
    assert!(unwire(response.new_state).is_null());
}

#[tokio::test]
async fn unknown_type_is_a_diagnostic_not_a_transport_error() {
    let service = configured_service().await;

    let response = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "inventory_missing".to_string(),
            current_state: wire(&object(&[("id", s("x"))])),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(
        error_summaries(&response.diagnostics),
        vec!["Resource Type Not Found".to_string()]
    );

    let response = service
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "inventory_missing".to_string(),
            config: wire(&object(&[("id", s("x"))])),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(
        error_summaries(&response.diagnostics),
        vec!["Data Source Type Not Found".to_string()]
    );
}

#[tokio::test]
async fn undecodable_payload_is_invalid_argument() {
    let service = ProviderService::new(InventoryProvider);
    let status = service
        .read_resource(Request::new(proto::read_resource::Request {
            type_name: "inventory_item".to_string(),
            current_state: Some(proto::DynamicValue {
                msgpack: vec![0xc1],
                json: vec![],
            }),
            private: vec![],
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);
}

#[tokio::test]
async fn import_passes_id_through() {
    let service = configured_service().await;

    let response = service
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "inventory_item".to_string(),
            id: "item-42".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let imported = response.imported_resources.into_iter().next().unwrap();
    assert_eq!(imported.type_name, "inventory_item");
    let state = unwire(imported.state);
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "item-42");
    assert!(state.get(&AttributePath::new("name")).unwrap().is_null());
}

#[tokio::test]
async fn import_unsupported_resource_is_an_error() {
    let service = configured_service().await;

    let response = service
        .import_resource_state(Request::new(proto::import_resource_state::Request {
            type_name: "inventory_label".to_string(),
            id: "x".to_string(),
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.imported_resources.is_empty());
    assert_eq!(
        error_summaries(&response.diagnostics),
        vec!["Resource Import Not Implemented".to_string()]
    );
}

#[tokio::test]
async fn read_data_source_uses_provider_data() {
    let service = configured_service().await;
    let created = create_item(&service, "washers").await;
    let id = created.get_string(&AttributePath::new("id")).unwrap();

    let response = service
        .read_data_source(Request::new(proto::read_data_source::Request {
            type_name: "inventory_item".to_string(),
            config: wire(&object(&[("id", s(&id)), ("name", Dynamic::Null)])),
            provider_meta: None,
            client_capabilities: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let state = unwire(response.state);
    assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "washers");
}

#[tokio::test]
async fn upgrade_state_reencodes_json() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .upgrade_resource_state(Request::new(proto::upgrade_resource_state::Request {
            type_name: "inventory_item".to_string(),
            version: 0,
            raw_state: Some(proto::RawState {
                json: br#"{"id":"item-1","name":"bolts"}"#.to_vec(),
                flatmap: HashMap::new(),
            }),
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty());
    let state = unwire(response.upgraded_state);
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "item-1");
    assert!(state.get(&AttributePath::new("note")).unwrap().is_null());
}

#[tokio::test]
async fn upgrade_state_from_newer_schema_is_an_error() {
    let service = ProviderService::new(InventoryProvider);
    let response = service
        .upgrade_resource_state(Request::new(proto::upgrade_resource_state::Request {
            type_name: "inventory_item".to_string(),
            version: 3,
            raw_state: Some(proto::RawState {
                json: br#"{"id":"item-1"}"#.to_vec(),
                flatmap: HashMap::new(),
            }),
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.upgraded_state.is_none());
    assert_eq!(
        error_summaries(&response.diagnostics),
        vec!["Unable to upgrade resource state".to_string()]
    );
}

#[tokio::test]
async fn stop_provider_cancels_root_context() {
    let service = ProviderService::new(InventoryProvider);
    let ctx = service.context();
    assert!(!ctx.is_cancelled());

    let response = service
        .stop_provider(Request::new(proto::stop_provider::Request {}))
        .await
        .unwrap()
        .into_inner();

    assert!(response.error.is_empty());
    assert!(ctx.is_cancelled());
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let service = configured_service().await;

    let (a, b, c) = tokio::join!(
        create_item(&service, "a"),
        create_item(&service, "b"),
        create_item(&service, "c"),
    );

    let mut ids: Vec<String> = [a, b, c]
        .iter()
        .map(|state| state.get_string(&AttributePath::new("id")).unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}
