use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::config::game::default_max_rounds;
use backend::config::generation::GenerationConfig;
use backend::generation;
use backend::middleware::cors::cors_middleware;
use backend::routes;
use backend::services::registry::RoomRegistry;
use backend::services::rooms::RoomService;
use backend::state::app_state::AppState;
use backend::ws::hub::RoomHub;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    println!("🚀 Starting Storychain backend on http://{}:{}", host, port);

    let generation_config = GenerationConfig::from_env();
    if generation_config.offline() {
        println!("⚠️  OPENAI_API_KEY not set, using offline story generation");
    }

    let registry = Arc::new(RoomRegistry::new());
    let generator = generation::from_config(&generation_config);
    let rooms = Arc::new(RoomService::new(
        registry,
        generator,
        default_max_rounds(),
    ));
    let data = web::Data::new(AppState::new(rooms, Arc::new(RoomHub::new())));

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
