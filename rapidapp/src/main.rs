use rapidapp::RapidappProvider;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> tfplug::Result<()> {
    // stdout carries the plugin handshake
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tfplug::serve_default(RapidappProvider::new()).await
}
