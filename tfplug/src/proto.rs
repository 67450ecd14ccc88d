//! Generated protobuf types
//!
//! `tfplugin6` holds the Terraform plugin protocol v6 messages and the
//! `Provider` service. `plugin` holds the go-plugin controller service the
//! host uses to shut the plugin down.
//!
//! Several generated types share names with framework types
//! (`DynamicValue`, `Schema`, `Diagnostic`), so always refer to these
//! through the module path.

#[allow(clippy::all)]
pub mod tfplugin6 {
    tonic::include_proto!("tfplugin6");
}

#[allow(clippy::all)]
pub mod plugin {
    tonic::include_proto!("plugin");
}
