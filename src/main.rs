use student_registry::{api, config, logging, store::StudentStore, summarization};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::init_config();
    logging::init_tracing(config.log_file.as_deref());
    tracing::debug!(
        server_port = config.server_port,
        summary_endpoint = %config.summary_endpoint,
        summary_model = %config.summary_model,
        id_allocation = ?config.id_allocation,
        log_file = ?config.log_file,
        "Loaded configuration"
    );

    let store = Arc::new(StudentStore::from_config(config));
    let summarizer = Arc::new(summarization::get_summary_client()?);
    let app = api::create_router(store, summarizer);

    let listener = bind_listener(config.server_port)
        .await
        .expect("Failed to bind listener");
    tracing::info!(
        id_allocation = ?config.id_allocation,
        summary_endpoint = %config.summary_endpoint,
        "Listening on http://0.0.0.0:{}",
        config.server_port
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn bind_listener(port: u16) -> Result<TcpListener, std::io::Error> {
    use std::net::Ipv4Addr;

    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await
}
