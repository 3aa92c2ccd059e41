//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, limits, headers, CORS)
//! - Gate `/api/*` behind admission control
//! - Serve the API and, when enabled, the admin API until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{GatewayConfig, SecurityConfig};
use crate::http::api;
use crate::http::middleware::{rate_limit_middleware, track_metrics};
use crate::http::request::{make_request_span, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::security::headers::{api_headers, security_headers};
use crate::security::{AdmissionControl, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<dyn AdmissionControl>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    admin_router: Option<Router>,
    state: AppState,
}

impl HttpServer {
    /// Create a server with an in-memory limiter on the wall clock.
    pub fn new(config: GatewayConfig) -> Self {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self::with_limiter(config, limiter)
    }

    /// Create a server around an existing admission controller.
    pub fn with_limiter(config: GatewayConfig, limiter: Arc<dyn AdmissionControl>) -> Self {
        let state = AppState {
            limiter,
            config: Arc::new(config),
        };

        let router = Self::build_router(&state);
        let admin_router = state
            .config
            .admin
            .enabled
            .then(|| setup_admin_router(state.clone()));

        Self {
            router,
            admin_router,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;

        let mut api = Router::new()
            .route("/search", post(api::search).get(api::search_by_params))
            .route("/chat", post(api::chat))
            .route("/inspect", post(api::inspect))
            .route_layer(middleware::from_fn(track_metrics));

        if config.rate_limit.enabled {
            api = api.layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ));
        } else {
            tracing::warn!("Rate limiting disabled");
        }

        // Wraps admission control so 429s carry them too.
        for (name, value) in api_headers() {
            api = api.layer(SetResponseHeaderLayer::overriding(name, value));
        }

        let mut router = Router::new()
            .route("/health", get(api::health))
            .nest("/api", api)
            .with_state(state.clone())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        if let Some(cors) = cors_layer(&config.security) {
            router = router.layer(cors);
        }

        if config.security.enable_headers {
            for (name, value) in security_headers(config.security.hsts) {
                router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
            }
        }

        router
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The public router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn admin_router(&self) -> Option<Router> {
        self.admin_router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.state.config
    }

    /// Run until `shutdown` fires. The admin API, when enabled, binds its own
    /// address and stops with the same signal.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(admin_router) = self.admin_router {
            let admin_listener = TcpListener::bind(&self.state.config.admin.bind_address).await?;
            tracing::info!(
                address = %admin_listener.local_addr()?,
                "Admin API starting"
            );
            let admin_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                if let Err(e) = axum::serve(admin_listener, admin_router)
                    .with_graceful_shutdown(shutdown::wait(admin_shutdown))
                    .await
                {
                    tracing::error!(error = %e, "Admin API failed");
                }
            });
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if security.allowed_origins.is_empty() {
        return None;
    }

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION];

    // Browsers refuse credentials with a wildcard origin, and tower-http panics on it.
    if security.allowed_origins.iter().any(|origin| origin == "*") {
        tracing::warn!("CORS allows any origin; credentials disabled");
        return Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::any())
                .allow_methods(methods)
                .allow_headers(headers),
        );
    }

    let origins: Vec<HeaderValue> = security
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods(methods)
            .allow_headers(headers),
    )
}
