use std::sync::Arc;

use actix_web::{App, HttpServer};
use fireauth::config::FireAuthConfig;
use fireauth::identity::InMemoryIdentityProvider;
use fireauth::infra::state::build_state;
use fireauth::middleware::{RequestTrace, StructuredLogger};
use fireauth::routes;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // FIREAUTH_KEY_FILE, FIREAUTH_HOST, FIREAUTH_PORT, or PRIVATE_KEY + PUBLIC_KEY
    let config = match FireAuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let state = match build_state()
        .with_config(&config)
        .with_identity_provider(Arc::new(InMemoryIdentityProvider::new()))
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build auth state: {e}");
            std::process::exit(1);
        }
    };

    println!("🚀 Starting fireauth on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .configure(routes::configure(&state))
    })
    .bind((config.host, config.port))?
    .run()
    .await
}
