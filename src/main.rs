//! KidTrack Server — activity sharing for families
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use kidtrack_core::config::AppConfig;
use kidtrack_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("KIDTRACK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting KidTrack v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = kidtrack_database::connection::DatabasePool::connect(&config.database).await?;
    kidtrack_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let pool = db.pool().clone();
    let user_repo = Arc::new(kidtrack_database::repositories::user::UserRepository::new(
        pool.clone(),
    ));
    let child_repo = Arc::new(kidtrack_database::repositories::child::ChildRepository::new(
        pool.clone(),
    ));
    let activity_repo = Arc::new(
        kidtrack_database::repositories::activity::ActivityRepository::new(pool.clone()),
    );
    let share_repo = Arc::new(kidtrack_database::repositories::share::ShareRepository::new(
        pool.clone(),
    ));
    let invitation_repo = Arc::new(
        kidtrack_database::repositories::invitation::InvitationRepository::new(pool.clone()),
    );
    let audit_repo = Arc::new(
        kidtrack_database::repositories::audit::AuditLogRepository::new(pool.clone()),
    );

    // ── Step 3: Services ─────────────────────────────────────────
    let notifier = Arc::new(kidtrack_service::notification::WebhookNotifier::new(
        &config.notification,
    ));
    let notifications = Arc::new(kidtrack_service::notification::NotificationService::new(
        notifier,
        config.notification.clone(),
    ));

    let sharing_service = Arc::new(kidtrack_service::sharing::SharingService::new(
        share_repo.clone(),
        child_repo.clone(),
        activity_repo.clone(),
        user_repo.clone(),
        audit_repo.clone(),
        notifications.clone(),
    ));
    let invitation_service = Arc::new(kidtrack_service::invitation::InvitationService::new(
        invitation_repo.clone(),
        share_repo.clone(),
        user_repo.clone(),
        audit_repo.clone(),
        notifications,
        config.sharing.clone(),
    ));
    let calendar_service = Arc::new(kidtrack_service::calendar::CalendarService::new(
        child_repo,
        activity_repo,
        sharing_service.clone(),
    ));

    tracing::info!("Services initialized");

    // ── Step 4: Maintenance scheduler ────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let sweep = Arc::new(kidtrack_worker::jobs::ExpirySweep::new(
            sharing_service.clone(),
            invitation_service.clone(),
        ));
        let scheduler =
            kidtrack_worker::MaintenanceScheduler::new(sweep, config.worker.clone()).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance worker disabled");
        None
    };

    // ── Step 5: HTTP server ──────────────────────────────────────
    let jwt_decoder = Arc::new(kidtrack_api::auth::JwtDecoder::new(&config.auth));
    let state = kidtrack_api::AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        jwt_decoder,
        sharing_service,
        invitation_service,
        calendar_service,
        audit_repo,
    };

    let app = kidtrack_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("KidTrack server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Drain background tasks ───────────────────────────
    if let Some(scheduler) = scheduler.as_mut() {
        let _ = scheduler.shutdown().await;
    }
    db.close().await;

    tracing::info!("KidTrack server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
