//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    bidding,
    error::{ApiError, ApiResult},
    jwt::Identity,
    middleware::{AuthUser, require_auth, require_owner},
    models::{BidStatusUpdate, Job, JobPatch, LoginRequest, NewBid, NewJob, SuccessResponse},
    state::AppState,
    validation::{parse_id, validate_present},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let owner_routes = Router::new()
        .route("/jobs/:email", get(jobs_by_owner))
        .route("/bids/:email", get(bids_by_bidder))
        .route("/bid-requests/:email", get(bid_requests))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_owner));

    let protected_routes = Router::new()
        .route("/my-posted-jobs/:id", delete(delete_job))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/jwt", post(issue_token))
        .route("/logout", get(logout))
        .route("/jobs", get(list_jobs))
        .route("/job/:id", get(get_job))
        .route("/update-job/:id", put(update_job))
        .route("/add-job", post(add_job))
        .route("/add-bid", post(add_bid))
        .route("/bid-requests-status-update/:id", patch(update_bid_status))
        .merge(owner_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Greeting
pub async fn root() -> &'static str {
    "Hello from job portal Server...."
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => match common::database::health_check(pool).await {
            Ok(true) => "up",
            _ => "down",
        },
        None => "memory",
    };

    Json(json!({
        "status": "ok",
        "service": "bidding-api",
        "database": database,
    }))
}

/// Issue a session credential as an HTTP-only cookie
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_present("email", &payload.email)?;

    let identity = Identity {
        email: payload.email,
    };
    let token = state.tokens.issue(&identity)?;
    info!("Issued session credential for {}", identity.email);

    Ok((
        state.cookies.grant(jar, token),
        Json(SuccessResponse { success: true }),
    ))
}

/// Clear the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        state.cookies.revoke(jar),
        Json(SuccessResponse { success: true }),
    )
}

/// Get all jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let jobs = state.jobs.list_all().await?;
    Ok(Json(jobs))
}

/// Get a job by ID, or `null`
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let job = state.jobs.find_by_id(id).await?;
    Ok(Json(job))
}

/// Set fields on a job, creating it if the ID is unknown
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<JobPatch>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let result = state.jobs.upsert(id, payload).await?;
    Ok(Json(result))
}

/// Get the jobs posted by the authenticated owner
pub async fn jobs_by_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let jobs = state.jobs.find_by_owner(&email).await?;
    Ok(Json(jobs))
}

/// Post a new job
pub async fn add_job(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewJob>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_present("buyer.buyer_email", &payload.buyer.buyer_email)?;

    let job = Job::from_new(Uuid::new_v4(), payload);
    let result = state.jobs.insert(&job).await?;
    info!("Job {} posted by {}", job.id, job.owner_email());
    Ok(Json(result))
}

/// Delete a job posted by the authenticated user
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;

    if let Some(job) = state.jobs.find_by_id(id).await? {
        if job.owner_email() != user.email {
            warn!(
                "{} tried to delete job {} of {}",
                user.email,
                id,
                job.owner_email()
            );
            return Err(ApiError::Unauthorized);
        }
    }

    let result = state.jobs.delete(id).await?;
    info!("Job {} deleted by {}", id, user.email);
    Ok(Json(result))
}

/// Place a bid on a job
pub async fn add_bid(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewBid>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let (jobs, bids) = (state.jobs.as_ref(), state.bids.as_ref());
    let result = bidding::place_bid(jobs, bids, payload).await?;
    Ok(Json(result))
}

/// Get the bids placed by the authenticated user
pub async fn bids_by_bidder(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bids = state.bids.find_by_bidder(&email).await?;
    Ok(Json(bids))
}

/// Get the bids received on the authenticated user's jobs
pub async fn bid_requests(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let bids = state.bids.find_by_buyer(&email).await?;
    Ok(Json(bids))
}

/// Change the status of a bid
pub async fn update_bid_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<BidStatusUpdate>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    validate_present("status", &payload.status)?;

    let result = state.bids.update_status(id, &payload.status).await?;
    info!("Bid {} status set to {}", id, payload.status);
    Ok(Json(result))
}
