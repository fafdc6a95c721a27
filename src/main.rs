use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use calc_server::api;
use calc_server::api::objects::AppState;
use calc_server::config::AppConfig;
use calc_server::db_router::StoreRegistry;
use calc_server::tasks_queue;
use calc_server::worker::Worker;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    let registry = Arc::new(StoreRegistry::new(&config.configured_servers));
    let (queue, rx) = tasks_queue::channel();
    let rx = Arc::new(Mutex::new(rx));

    for worker_id in 0..config.num_workers {
        let worker = Worker::new(worker_id, config.worker_delay, registry.clone(), rx.clone());
        tokio::spawn(worker.run());
    }

    let bind_addr = config.bind_addr.clone();
    info!(
        server = config.server_label(),
        workers = config.num_workers,
        "server started on {bind_addr}"
    );

    let state = web::Data::new(AppState {
        config,
        queue,
        registry,
    });
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;
    Ok(())
}
