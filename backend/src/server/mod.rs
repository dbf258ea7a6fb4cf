//! Server construction: configuration, CORS policy, and app wiring.

mod config;

pub use config::{
    AllowedOrigins, AppConfig, ConfigError, DEFAULT_PORT, DEFAULT_STATIC_ROOT, DEFAULT_TABLE,
    DEFAULT_USERS_FILE, Env, ProcessEnv, StoreConfig,
};

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::UserRepository;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::pages::index;
use crate::inbound::http::state::{HttpState, StaticRoot};
use crate::inbound::http::users::{create_user, delete_user, get_user, list_users, update_user};
use crate::middleware::RequestSpan;

/// Everything one app instance needs; cloned into the server factory.
#[derive(Clone)]
pub struct AppDependencies {
    /// Shared readiness state.
    pub health_state: web::Data<HealthState>,
    /// Handler state wrapping the storage adapter.
    pub http_state: web::Data<HttpState>,
    /// Directory the web client is served from.
    pub static_root: StaticRoot,
    /// Cross-origin policy.
    pub allowed_origins: AllowedOrigins,
}

fn cors_policy(allowed_origins: &AllowedOrigins) -> Cors {
    let cors = Cors::default().allow_any_method().allow_any_header();
    match allowed_origins {
        AllowedOrigins::Any => cors.allow_any_origin(),
        AllowedOrigins::List(origins) => origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin)),
    }
}

/// Assemble one app instance.
///
/// Public so integration tests can drive the full surface without binding
/// a socket. Route order matters: the API scope and explicit pages are
/// registered before the static file service mounted at `/`.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody<Error: std::fmt::Debug>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        static_root,
        allowed_origins,
    } = deps;

    let api = web::scope("/api")
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);

    let assets = Files::new("/", static_root.as_path().to_path_buf());

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::Data::new(static_root))
        .wrap(RequestSpan)
        .wrap(cors_policy(&allowed_origins))
        .service(api)
        .service(ready)
        .service(live)
        .service(index);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.service(assets)
}

/// Construct the HTTP server from configuration and a storage adapter.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the listener fails.
pub fn create_server(users: Arc<dyn UserRepository>, config: AppConfig) -> std::io::Result<Server> {
    let AppConfig {
        bind_addr,
        store: _,
        allowed_origins,
        static_root,
    } = config;

    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(HttpState::new(users));
    let static_root = StaticRoot::new(static_root);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            static_root: static_root.clone(),
            allowed_origins: allowed_origins.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
