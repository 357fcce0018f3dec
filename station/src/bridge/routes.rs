use crate::bridge::model::{DashboardSnapshot, ErrorBody, FeedStatus};
use anyhow::Context;
use kpcore::mission::FeedbackSubmission;
use kpcore::profile::UnitProfile;
use kpcore::{CoreError, Dashboard};
use log::{info, warn};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

const MAX_BODY_BYTES: u64 = 64 * 1024;

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

#[derive(Debug)]
struct DashboardPoisoned;

impl warp::reject::Reject for DashboardPoisoned {}

/// HTTP face of the dashboard for the presentation layer.
///
/// All handlers go through one mutex, so store writes are applied one at a time.
pub struct StationBridge {
    dashboard: SharedDashboard,
}

impl StationBridge {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let state = with_dashboard(self.dashboard.clone());

        let snapshot_route = warp::path::end()
            .and(warp::get())
            .and(state.clone())
            .and_then(get_snapshot);
        let profile_route = warp::path!("profile")
            .and(warp::get())
            .and(state.clone())
            .and_then(get_profile);
        let profile_save_route = warp::path!("profile")
            .and(warp::put())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .and(state.clone())
            .and_then(put_profile);
        let risk_route = warp::path!("risk")
            .and(warp::get())
            .and(state.clone())
            .and_then(get_risk);
        let series_route = warp::path!("series")
            .and(warp::get())
            .and(state.clone())
            .and_then(get_series);
        let logs_route = warp::path!("logs")
            .and(warp::get())
            .and(state.clone())
            .and_then(get_logs);
        let log_append_route = warp::path!("logs")
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .and(state.clone())
            .and_then(post_log);
        let refresh_route = warp::path!("refresh")
            .and(warp::post())
            .and(state.clone())
            .and_then(post_refresh);
        let feed_route = warp::path!("feed")
            .and(warp::get())
            .and(state)
            .and_then(get_feed);

        snapshot_route
            .or(profile_route)
            .or(profile_save_route)
            .or(risk_route)
            .or(series_route)
            .or(logs_route)
            .or(log_append_route)
            .or(refresh_route)
            .or(feed_route)
            .recover(handle_rejection)
    }

    /// Serves until `shutdown` resolves.
    pub async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .with_context(|| format!("binding station bridge to {}", addr))?;
        info!("station bridge listening on http://{}", bound);
        server.await;
        info!("station bridge stopped");
        Ok(())
    }
}

fn with_dashboard(
    shared: SharedDashboard,
) -> impl Filter<Extract = (SharedDashboard,), Error = Infallible> + Clone {
    warp::any().map(move || shared.clone())
}

fn lock(shared: &SharedDashboard) -> Result<MutexGuard<'_, Dashboard>, Rejection> {
    shared
        .lock()
        .map_err(|_| warp::reject::custom(DashboardPoisoned))
}

fn error_reply(status: StatusCode, message: String) -> Response {
    reply::with_status(reply::json(&ErrorBody { error: message }), status).into_response()
}

fn core_error_reply(err: &CoreError) -> Response {
    let status = match err {
        CoreError::Validation(_) | CoreError::UnknownEquipment(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_reply(status, err.to_string())
}

async fn get_snapshot(shared: SharedDashboard) -> Result<Response, Rejection> {
    let dashboard = lock(&shared)?;
    Ok(reply::json(&DashboardSnapshot::capture(&dashboard)).into_response())
}

async fn get_profile(shared: SharedDashboard) -> Result<Response, Rejection> {
    let dashboard = lock(&shared)?;
    Ok(reply::json(&dashboard.get_profile()).into_response())
}

async fn put_profile(profile: UnitProfile, shared: SharedDashboard) -> Result<Response, Rejection> {
    let mut dashboard = lock(&shared)?;
    match dashboard.save_profile(profile) {
        Ok(()) => Ok(reply::json(&dashboard.get_profile()).into_response()),
        Err(err) => Ok(core_error_reply(&err)),
    }
}

async fn get_risk(shared: SharedDashboard) -> Result<Response, Rejection> {
    let dashboard = lock(&shared)?;
    Ok(reply::json(&dashboard.current_risk_view()).into_response())
}

async fn get_series(shared: SharedDashboard) -> Result<Response, Rejection> {
    let series = {
        let dashboard = lock(&shared)?;
        dashboard.feed().series()
    };
    Ok(reply::json(&*series).into_response())
}

async fn get_logs(shared: SharedDashboard) -> Result<Response, Rejection> {
    let dashboard = lock(&shared)?;
    Ok(reply::json(&dashboard.get_logs()).into_response())
}

async fn post_log(
    submission: FeedbackSubmission,
    shared: SharedDashboard,
) -> Result<Response, Rejection> {
    let mut dashboard = lock(&shared)?;
    match dashboard.append_log(submission) {
        Ok(entry) => Ok(reply::with_status(reply::json(&entry), StatusCode::CREATED).into_response()),
        Err(err) => Ok(core_error_reply(&err)),
    }
}

async fn post_refresh(shared: SharedDashboard) -> Result<Response, Rejection> {
    // the lock must not be held across the fetch
    let feed = {
        let dashboard = lock(&shared)?;
        dashboard.feed()
    };
    let outcome = feed.refresh().await;
    Ok(reply::json(&outcome).into_response())
}

async fn get_feed(shared: SharedDashboard) -> Result<Response, Rejection> {
    let feed = {
        let dashboard = lock(&shared)?;
        dashboard.feed()
    };
    Ok(reply::json(&FeedStatus {
        source: feed.source(),
        metrics: feed.metrics(),
    })
    .into_response())
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body_err.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else if err.find::<DashboardPoisoned>().is_some() {
        warn!("dashboard state poisoned by an earlier panic");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "dashboard unavailable".to_string(),
        )
    } else {
        warn!("unhandled bridge rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };
    Ok(error_reply(status, message))
}
