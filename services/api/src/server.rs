use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryMarketplace};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use property_desk::config::AppConfig;
use property_desk::error::AppError;
use property_desk::telemetry;
use property_desk::workflows::favorites::FavoritesService;
use property_desk::workflows::leads::LeadPipelineService;
use property_desk::workflows::listings::{
    ListingGalleryService, ListingLifecycleService, PublicBucketUrls,
};
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryMarketplace::default());
    let urls = Arc::new(PublicBucketUrls::from_config(&config.marketplace));
    let listings = Arc::new(ListingLifecycleService::new(store.clone()));
    let gallery = Arc::new(ListingGalleryService::new(
        store.clone(),
        store.clone(),
        urls,
        store.clone(),
    ));
    let leads = Arc::new(LeadPipelineService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        config.marketplace.clone(),
    ));
    let favorites = Arc::new(FavoritesService::new(store.clone(), store));

    let app = with_marketplace_routes(listings, gallery, leads, favorites)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, site = %config.marketplace.site_url, "property desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
