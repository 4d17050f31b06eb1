use crate::cli::ServeArgs;
use crate::infra::{seed_catalog, AppState, InMemoryChatService, InMemoryListingStore, InMemoryReviewSource};
use crate::routes::{with_marketplace_routes, PromotionState};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bazaar::config::AppConfig;
use bazaar::error::AppError;
use bazaar::listings::engagement::{EngagementHandle, InMemoryEngagementRepository};
use bazaar::listings::promotion::TopAssignmentService;
use bazaar::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryEngagementRepository::default());
    let chat = Arc::new(InMemoryChatService::default());
    let handle = Arc::new(EngagementHandle::new(repository, chat));

    let listing_store = Arc::new(InMemoryListingStore::default());
    let reviews = Arc::new(InMemoryReviewSource::default());
    let catalog = Arc::new(seed_catalog(&listing_store, &reviews));
    let promotion = PromotionState {
        top: TopAssignmentService::new(listing_store),
        catalog,
        reviews,
    };

    let app = with_marketplace_routes(handle, promotion)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace engagement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
