//! OpenAPI document exposed through Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, User};
use crate::inbound::http::users::UserPayload;

/// Aggregated OpenAPI description of the REST surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(User, UserPayload, Error)),
    tags(
        (name = "users", description = "User roster CRUD"),
        (name = "health", description = "Orchestration probes")
    )
)]
pub struct ApiDoc;
