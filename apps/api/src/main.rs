use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod router;

use agenda_cell::handlers::AgendaState;
use agenda_cell::models::{AgendaFilterShape, Appointment};
use agenda_cell::{AgendaService, ClinicBootstrap};
use shared_config::AppConfig;
use shared_store::InMemoryStore;
use tenant_cell::models::{AllClinics, Clinic, Membership, MembershipFilter};
use tenant_cell::ClinicDirectory;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinica agenda API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Wire the stores and services
    let clinics: Arc<InMemoryStore<Clinic, AllClinics>> = Arc::new(InMemoryStore::new());
    let memberships: Arc<InMemoryStore<Membership, MembershipFilter>> =
        Arc::new(InMemoryStore::new());
    let appointments: Arc<InMemoryStore<Appointment, AgendaFilterShape>> =
        Arc::new(InMemoryStore::new());

    let directory = Arc::new(ClinicDirectory::new(clinics, memberships));
    let agenda = Arc::new(AgendaService::new(appointments));
    let bootstrap = Arc::new(ClinicBootstrap::new(
        Arc::clone(&directory),
        Arc::clone(&agenda),
    ));

    if config.seed_demo_clinic {
        match bootstrap
            .bootstrap_clinic(&config.demo_clinic_name, Uuid::new_v4())
            .await
        {
            Ok(outcome) => info!("Seeded demo clinic {}", outcome.clinic.id),
            Err(e) => warn!("Demo clinic seeding failed: {}", e),
        }
    }

    let state = AgendaState { agenda, bootstrap };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
    axum::serve(listener, app)
        .await
        .unwrap();
}
