//! Server module for running Terraform providers
//!
//! This module performs the go-plugin handshake, picks the TLS mode the host
//! asked for, and serves the provider until the host shuts it down.

use crate::context::Context;
use crate::error::{Result, TfplugError};
use crate::grpc::ProviderService;
use crate::proto::plugin::grpc_controller_server::{GrpcController, GrpcControllerServer};
use crate::proto::plugin::Empty;
use crate::proto::tfplugin6::provider_server::ProviderServer;
use crate::provider::Provider;
use base64::Engine;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tonic::{Request, Response, Status};

pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";
pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";
pub const PROTOCOL_VERSION: u32 = 6;

const CORE_PROTOCOL_VERSION: u32 = 1;

/// Server configuration for running a Terraform provider
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PEM certificate served when the host does not request AutoMTLS
    pub cert_path: Option<PathBuf>,
    /// PEM key matching cert_path
    pub key_path: Option<PathBuf>,
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// How long in-flight calls get to finish after shutdown is requested
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cert_path: None,
            key_path: None,
            max_message_size: 256 << 20, // 256MB
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus TF_PROVIDER_CERT / TF_PROVIDER_KEY when both are set
    pub fn from_env() -> Self {
        let config = Self::default();
        match (
            std::env::var_os("TF_PROVIDER_CERT"),
            std::env::var_os("TF_PROVIDER_KEY"),
        ) {
            (Some(cert), Some(key)) => config
                .with_cert_path(PathBuf::from(cert))
                .with_key_path(PathBuf::from(key)),
            _ => config,
        }
    }

    pub fn with_cert_path(mut self, path: PathBuf) -> Self {
        self.cert_path = Some(path);
        self
    }

    pub fn with_key_path(mut self, path: PathBuf) -> Self {
        self.key_path = Some(path);
        self
    }

    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// go-plugin controller; Shutdown is how the host stops the plugin
struct Controller {
    shutdown: Context,
}

#[tonic::async_trait]
impl GrpcController for Controller {
    async fn shutdown(
        &self,
        _request: Request<Empty>,
    ) -> std::result::Result<Response<Empty>, Status> {
        tracing::info!("shutdown requested by host");
        self.shutdown.cancel();
        Ok(Response::new(Empty {}))
    }
}

enum TlsMode {
    /// Host sent its certificate; we answer with a fresh self-signed one
    Auto { client_cert: String },
    Files { cert: PathBuf, key: PathBuf },
    Plaintext,
}

impl TlsMode {
    fn select(config: &ServerConfig) -> Self {
        if let Ok(client_cert) = std::env::var("PLUGIN_CLIENT_CERT") {
            if !client_cert.is_empty() {
                return TlsMode::Auto { client_cert };
            }
        }

        match (&config.cert_path, &config.key_path) {
            (Some(cert), Some(key)) => TlsMode::Files {
                cert: cert.clone(),
                key: key.clone(),
            },
            _ => TlsMode::Plaintext,
        }
    }
}

/// Self-signed server certificate for AutoMTLS
pub(crate) struct GeneratedCertificate {
    pub cert_pem: String,
    pub cert_der: Vec<u8>,
    pub key_pem: String,
}

pub(crate) fn generate_certificate() -> Result<GeneratedCertificate> {
    use rcgen::{
        BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
        KeyUsagePurpose,
    };

    let mut params = CertificateParams::new(vec!["localhost".to_string()])?;
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params
        .distinguished_name
        .push(DnType::OrganizationName, "HashiCorp");
    params.distinguished_name.push(DnType::CommonName, "localhost");
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
        KeyUsagePurpose::KeyAgreement,
        KeyUsagePurpose::KeyCertSign,
    ];
    params.extended_key_usages = vec![
        ExtendedKeyUsagePurpose::ServerAuth,
        ExtendedKeyUsagePurpose::ClientAuth,
    ];

    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;

    Ok(GeneratedCertificate {
        cert_pem: cert.pem(),
        cert_der: cert.der().to_vec(),
        key_pem: key_pair.serialize_pem(),
    })
}

pub(crate) fn check_magic_cookie(value: Option<&str>) -> Result<()> {
    match value {
        Some(MAGIC_COOKIE_VALUE) => Ok(()),
        _ => Err(TfplugError::NotLaunchedByTerraform),
    }
}

/// PLUGIN_PROTOCOL_VERSIONS lists what the host speaks, e.g. "5,6"
pub(crate) fn check_protocol_versions(value: Option<&str>) -> Result<()> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(());
    };

    let supported = value
        .split(',')
        .filter_map(|v| v.trim().parse::<u32>().ok())
        .any(|v| v == PROTOCOL_VERSION);

    if supported {
        Ok(())
    } else {
        Err(TfplugError::UnsupportedProtocol(value.to_string()))
    }
}

pub(crate) fn handshake_line(addr: SocketAddr, server_cert_der: Option<&[u8]>) -> String {
    let mut line = format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, PROTOCOL_VERSION, addr
    );
    if let Some(der) = server_cert_der {
        line.push('|');
        line.push_str(&base64::engine::general_purpose::STANDARD_NO_PAD.encode(der));
    }
    line
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    check_magic_cookie(std::env::var(MAGIC_COOKIE_KEY).ok().as_deref())?;
    check_protocol_versions(std::env::var("PLUGIN_PROTOCOL_VERSIONS").ok().as_deref())?;

    // Only fails when a provider is already installed, which is fine
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let mut builder = Server::builder();
    let mut server_cert_der = None;

    match TlsMode::select(&config) {
        TlsMode::Auto { client_cert } => {
            let generated = generate_certificate()?;
            let tls = ServerTlsConfig::new()
                .identity(Identity::from_pem(&generated.cert_pem, &generated.key_pem))
                .client_ca_root(Certificate::from_pem(client_cert));
            builder = builder.tls_config(tls)?;
            server_cert_der = Some(generated.cert_der);
            tracing::debug!("serving with AutoMTLS");
        }
        TlsMode::Files { cert, key } => {
            let cert = tokio::fs::read(&cert)
                .await
                .map_err(|e| TfplugError::TlsError(format!("Failed to read certificate: {}", e)))?;
            let key = tokio::fs::read(&key)
                .await
                .map_err(|e| TfplugError::TlsError(format!("Failed to read key: {}", e)))?;
            builder = builder
                .tls_config(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))?;
            tracing::debug!("serving with TLS from certificate files");
        }
        TlsMode::Plaintext => {
            tracing::warn!("no TLS material available, serving plaintext");
        }
    }

    let service = ProviderService::new(provider);
    let provider_ctx = service.context();
    let provider_service = ProviderServer::new(service)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let shutdown = Context::new();
    let controller = GrpcControllerServer::new(Controller {
        shutdown: shutdown.clone(),
    });

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    // stdout belongs to the handshake; everything else goes to stderr
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", handshake_line(addr, server_cert_der.as_deref()))?;
    stdout.flush()?;
    tracing::info!(%addr, "provider server listening");

    let incoming = TcpListenerStream::new(listener);
    let signal = shutdown.clone();
    let mut server = tokio::spawn(
        builder
            .add_service(provider_service)
            .add_service(controller)
            .serve_with_incoming_shutdown(incoming, async move { signal.cancelled().await }),
    );

    tokio::select! {
        result = &mut server => return flatten(result),
        _ = shutdown.cancelled() => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted"),
    }

    shutdown.cancel();
    provider_ctx.cancel();

    match tokio::time::timeout(config.shutdown_timeout, server).await {
        Ok(result) => flatten(result),
        Err(_) => {
            tracing::warn!(
                timeout = ?config.shutdown_timeout,
                "in-flight calls did not finish before shutdown timeout"
            );
            Ok(())
        }
    }
}

fn flatten(
    result: std::result::Result<
        std::result::Result<(), tonic::transport::Error>,
        tokio::task::JoinError,
    >,
) -> Result<()> {
    match result {
        Ok(served) => Ok(served?),
        Err(e) => Err(TfplugError::Custom(format!("server task failed: {}", e))),
    }
}

/// Convenience function to run a provider with configuration from the environment
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::from_env()).await
}
