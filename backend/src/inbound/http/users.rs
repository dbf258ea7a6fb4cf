//! Users API handlers.
//!
//! ```text
//! GET    /api/users
//! GET    /api/users/{id}
//! POST   /api/users      {"name":"Ann","email":"ann@x.com"}
//! PUT    /api/users/{id} {"name":"Ann B","email":"annb@x.com"}
//! DELETE /api/users/{id}
//! ```
//!
//! Handlers are stateless: each call reads and writes only through the
//! repository held in [`HttpState`].

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, User, UserDraft, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const NOT_FOUND_MESSAGE: &str = "User not found";
const REQUIRED_MESSAGE: &str = "Name and email are required";

/// Request body for create and update.
///
/// Both fields stay optional at the JSON layer so an absent field produces
/// the contract's 400 message instead of a framework deserialisation error.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UserPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl TryFrom<UserPayload> for UserDraft {
    type Error = Error;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        let UserPayload { name, email } = value;
        UserDraft::new(name.unwrap_or_default(), email.unwrap_or_default())
            .map_err(|_| Error::invalid_request(REQUIRED_MESSAGE))
    }
}

fn user_not_found() -> Error {
    Error::not_found(NOT_FOUND_MESSAGE)
}

fn draft_from(payload: Option<web::Json<UserPayload>>) -> Result<UserDraft, Error> {
    UserDraft::try_from(payload.map(web::Json::into_inner).unwrap_or_default())
}

/// List every stored user.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 500, description = "Storage failure", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users().list_all().await?;
    Ok(web::Json(users))
}

/// Fetch a single user by id.
///
/// A path id that cannot belong to any stored record (not a UUID) behaves
/// exactly like an unknown id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "No user with this id", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let Ok(id) = UserId::parse(path.as_str()) else {
        return Err(user_not_found());
    };
    let user = state
        .users()
        .find_by_id(&id)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(web::Json(user))
}

/// Create a user under a freshly generated id.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Created user", body = User),
        (status = 400, description = "Missing name or email", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: Option<web::Json<UserPayload>>,
) -> ApiResult<HttpResponse> {
    let draft = draft_from(payload)?;
    let user = state.users().insert(draft).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Replace an existing user's name and email wholesale.
///
/// Existence is checked before the payload: updating an unknown id reports
/// 404 even when the body is also invalid.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Missing name or email", body = Error),
        (status = 404, description = "No user with this id", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: Option<web::Json<UserPayload>>,
) -> ApiResult<web::Json<User>> {
    let Ok(id) = UserId::parse(path.as_str()) else {
        return Err(user_not_found());
    };
    if state.users().find_by_id(&id).await?.is_none() {
        return Err(user_not_found());
    }
    let draft = draft_from(payload)?;
    let user = state
        .users()
        .replace(&id, draft)
        .await?
        .ok_or_else(user_not_found)?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    responses(
        (status = 200, description = "Deletion confirmation"),
        (status = 404, description = "No user with this id", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let Ok(id) = UserId::parse(path.as_str()) else {
        return Err(user_not_found());
    };
    if !state.users().remove_by_id(&id).await? {
        return Err(user_not_found());
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" })))
}
