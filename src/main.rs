use std::io::Error;
use std::sync::Arc;

use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use sqlx::postgres::PgPoolOptions;
use tokio::main;
use tracing::info;

use crate::{
    application::{
        handlers::dispatch_cycle::DispatchCycle,
        services::scheduler::Scheduler,
        usecases::{
            list_delivered::ListDeliveredMessagesUseCase, submit_message::SubmitMessageUseCase,
        },
    },
    config::Config,
    domain::repositories::MessageRepository,
    infrastructure::{
        delivery::webhook::WebhookClient,
        repositories::{postgres::PostgresMessageRepository, redis::RedisDeliveryCache},
    },
    presentation::http::endpoints::{
        messages::MessagesEndpoints,
        root::{ApiState, Endpoints},
        scheduler::SchedulerEndpoints,
    },
};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

const BATCH_SIZE: i64 = 2;

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::try_parse().map_err(Error::other)?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(Error::other)?;
    sqlx::migrate!().run(&pool).await.map_err(Error::other)?;

    let cache = RedisDeliveryCache::connect(&config.redis_url)
        .await
        .map_err(Error::other)?;

    let repo: Arc<dyn MessageRepository> = PostgresMessageRepository::new(pool);
    let client = WebhookClient::new(config.webhook_url.clone(), config.webhook_auth_key.clone());

    let cycle = Arc::new(DispatchCycle::new(
        repo.clone(),
        cache,
        client,
        BATCH_SIZE,
        config.max_content_length,
    ));
    let scheduler = Scheduler::new(cycle);

    let state = Arc::new(ApiState {
        scheduler: scheduler.clone(),
        submit_message_usecase: Arc::new(SubmitMessageUseCase::new(repo.clone())),
        list_delivered_usecase: Arc::new(ListDeliveredMessagesUseCase::new(repo)),
    });

    // Dispatching begins as soon as the process is up; the admin surface can
    // still stop and restart it.
    scheduler.start();

    let server_url = format!("http://localhost:{}", config.port);

    let api_service = OpenApiService::new(
        (
            Endpoints,
            SchedulerEndpoints::new(state.clone()),
            MessagesEndpoints::new(state.clone()),
        ),
        "Courier API",
        "0.1.0",
    )
    .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    info!(port = config.port, "starting server");

    Server::new(TcpListener::bind(format!("localhost:{}", config.port)))
        .run(app)
        .await
}
