//! Users API handlers.
//!
//! ```text
//! POST   /api/users        {"name":"Alice","dob":"1990-05-10"}
//! GET    /api/users?limit=100&offset=0
//! GET    /api/users/{id}
//! PUT    /api/users/{id}   {"name":"Alice","dob":"1990-05-10"}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AgedUser, DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_OFFSET, Error, PageRequest, TraceId, User,
    UserDetails, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_date, parse_name, parse_page_param, parse_user_id, require,
};

const NAME: FieldName = FieldName::new("name");
const DOB: FieldName = FieldName::new("dob");
const ID: FieldName = FieldName::new("id");

/// Request body for creating or replacing a user.
///
/// Both fields are optional at the wire level so that an absent field is
/// reported by name instead of as a generic deserialisation failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UserRequest {
    /// Display name; must not be empty.
    #[schema(example = "Alice")]
    pub name: Option<String>,
    /// Date of birth in `YYYY-MM-DD` form.
    #[schema(example = "1990-05-10")]
    pub dob: Option<String>,
}

/// Stored user as returned by create and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(value_type = String, format = Date, example = "1990-05-10")]
    pub dob: NaiveDate,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().value(),
            name: user.name().to_string(),
            dob: user.dob(),
        }
    }
}

/// Stored user plus the age derived at read time.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AgedUserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(value_type = String, format = Date, example = "1990-05-10")]
    pub dob: NaiveDate,
    /// Whole years elapsed since `dob`, never negative.
    #[schema(example = 35)]
    pub age: u32,
}

impl From<AgedUser> for AgedUserResponse {
    fn from(value: AgedUser) -> Self {
        let AgedUser { user, age } = value;
        Self {
            id: user.id().value(),
            name: user.name().to_string(),
            dob: user.dob(),
            age,
        }
    }
}

/// Raw pagination query; values that are not integers are ignored.
#[derive(Debug, Default)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListParams {
    /// Collect pagination values from decoded query pairs. The first
    /// occurrence of a repeated key wins; unknown keys are ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut params.limit,
                "offset" => &mut params.offset,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }

    fn page(&self) -> PageRequest {
        PageRequest {
            limit: parse_page_param(self.limit.as_deref(), DEFAULT_PAGE_LIMIT),
            offset: parse_page_param(self.offset.as_deref(), DEFAULT_PAGE_OFFSET),
        }
    }
}

fn parse_user_request(payload: UserRequest) -> Result<UserDetails, Error> {
    let name = require(payload.name, NAME)?;
    let dob = require(payload.dob, DOB)?;
    Ok(UserDetails {
        name: parse_name(name, NAME)?,
        dob: parse_date(dob, DOB)?,
    })
}

fn traced(trace_id: &TraceId) -> impl Fn(Error) -> Error + '_ {
    move |err| err.with_trace_id(trace_id.as_str())
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let details = parse_user_request(payload.into_inner()).map_err(traced(&trace_id))?;
    let user = state
        .users
        .create_user(details)
        .await
        .map_err(traced(&trace_id))?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Fetch one user with their current age.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = AgedUserResponse),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    path: web::Path<String>,
) -> ApiResult<web::Json<AgedUserResponse>> {
    let id = parse_user_id(&path, ID).map_err(traced(&trace_id))?;
    let user = state
        .users_query
        .get_user(id)
        .await
        .map_err(traced(&trace_id))?;
    Ok(web::Json(AgedUserResponse::from(user)))
}

/// Replace a user's name and date of birth.
///
/// Unknown identifiers yield 404; a record is never created implicitly.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    path: web::Path<String>,
    payload: web::Json<UserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id: UserId = parse_user_id(&path, ID).map_err(traced(&trace_id))?;
    let details = parse_user_request(payload.into_inner()).map_err(traced(&trace_id))?;
    let user = state
        .users
        .update_user(id, details)
        .await
        .map_err(traced(&trace_id))?;
    Ok(web::Json(UserResponse::from(user)))
}

/// Delete a user permanently.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path, ID).map_err(traced(&trace_id))?;
    state
        .users
        .delete_user(id)
        .await
        .map_err(traced(&trace_id))?;
    Ok(HttpResponse::NoContent().finish())
}

/// List users ordered by identifier, each with their current age.
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum rows to return (default 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip (default 0)")
    ),
    responses(
        (status = 200, description = "Users", body = [AgedUserResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    trace_id: TraceId,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<web::Json<Vec<AgedUserResponse>>> {
    let params = ListParams::from_pairs(query.into_inner());
    let users = state
        .users_query
        .list_users(params.page())
        .await
        .map_err(traced(&trace_id))?;
    Ok(web::Json(
        users.into_iter().map(AgedUserResponse::from).collect(),
    ))
}
