use axum::{
    Router,
    routing::{get, post},
};
use configuration::settings::Config;
use database::DbRepository;
use ledger::FundsLedger;
use mailer::Mailer;
use payment_client::{PayPalClient, PaymentGateway};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

use error::AppError;
use mailer::error::MailerError;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub repo: DbRepository,
    pub gateway: Arc<dyn PaymentGateway>,
    pub ledger: FundsLedger,
    pub mailer: Option<Arc<Mailer>>,
    pub config: Config,
}

impl AppState {
    /// The notification routes need a configured mailer; everything else
    /// treats an absent mailer as "email disabled".
    pub fn mailer(&self) -> Result<&Mailer, AppError> {
        self.mailer
            .as_deref()
            .ok_or(AppError::Mailer(MailerError::NotConfigured))
    }
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    // Note: Tracing is initialized by the binary, not here, so the server can
    // be embedded without fighting over the global subscriber.

    dotenvy::dotenv().ok();
    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let repo = DbRepository::new(db_pool);

    let gateway: Arc<dyn PaymentGateway> = Arc::new(PayPalClient::new(&config.paypal));
    let mailer = Mailer::new(&config.email, &config.server.public_base_url).map(Arc::new);
    let ledger = FundsLedger::new(gateway.clone(), repo.clone(), mailer.clone());

    let app_state = Arc::new(AppState {
        repo,
        gateway,
        ledger,
        mailer,
        config,
    });

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // Payments and the fund ledger
        .route("/api/orders", post(handlers::payments::create_order))
        .route("/api/orders/:order_id/capture", post(handlers::payments::capture_order))
        .route("/api/orders/:order_id/complete", post(handlers::payments::complete_order))
        .route("/api/funds", post(handlers::payments::update_funds))
        // Profiles
        .route("/api/pitchers", post(handlers::profiles::create_pitcher))
        .route(
            "/api/pitchers/:pitcher_id",
            get(handlers::profiles::get_pitcher).put(handlers::profiles::update_pitcher),
        )
        .route("/api/pitchers/by-slug/:slug", get(handlers::profiles::get_pitcher_by_slug))
        .route("/api/pitchers/:pitcher_id/funds", get(handlers::payments::get_fund_history))
        .route("/api/listeners", post(handlers::profiles::create_listener))
        .route(
            "/api/listeners/:listener_id",
            get(handlers::profiles::get_listener).put(handlers::profiles::update_listener),
        )
        .route("/api/listeners/by-slug/:slug", get(handlers::profiles::get_listener_by_slug))
        // Meetings
        .route("/api/meetings", post(handlers::meetings::create_meeting))
        .route("/api/meetings/:meeting_id", get(handlers::meetings::get_meeting))
        // Transactional email
        .route("/api/notifications/meeting", post(handlers::notifications::send_meeting_notification))
        .route("/api/notifications/signup", post(handlers::notifications::send_signup_email))
        .route(
            "/api/notifications/payment-confirmation",
            post(handlers::notifications::send_payment_confirmation),
        )
        // Processor webhooks
        .route("/api/webhooks/paypal", post(handlers::webhooks::paypal_webhook))
        .route("/api/webhooks/stripe", post(handlers::webhooks::stripe_webhook))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http());

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
