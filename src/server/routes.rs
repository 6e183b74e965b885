use crate::analyzers::aggregate::Aggregator;
use crate::analyzers::types::{CityAndStateAqi, CityAqi, CompositeAqi, PollutionCheck, StateAqi};
use crate::chart::render_bar_chart;
use crate::server::ApiError;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

type Shared = State<Arc<Aggregator>>;

#[derive(Debug, Deserialize)]
pub struct StateQuery {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub state: String,
    pub city: String,
}

pub fn routes() -> Router<Arc<Aggregator>> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/states", get(states))
        .route("/cities", get(cities))
        .route("/check_pollution", get(check_pollution))
        .route("/city_aqi", get(city_aqi))
        .route("/composite_aqi", get(composite_aqi))
        .route("/state_aqi", get(state_aqi))
        .route("/city_and_state_aqi", get(city_and_state_aqi))
        .route("/plot_pollution", get(plot_pollution))
}

async fn states(State(agg): Shared) -> Json<Vec<String>> {
    Json(agg.table().states().into_iter().map(String::from).collect())
}

async fn cities(State(agg): Shared, Query(q): Query<StateQuery>) -> Json<Vec<String>> {
    Json(
        agg.table()
            .cities(&q.state)
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

async fn check_pollution(
    State(agg): Shared,
    Query(q): Query<LocationQuery>,
) -> Result<Json<PollutionCheck>, ApiError> {
    Ok(Json(agg.check_pollution(&q.state, &q.city)?))
}

async fn city_aqi(
    State(agg): Shared,
    Query(q): Query<LocationQuery>,
) -> Result<Json<CityAqi>, ApiError> {
    Ok(Json(agg.city_aqi(&q.state, &q.city)?))
}

async fn composite_aqi(
    State(agg): Shared,
    Query(q): Query<LocationQuery>,
) -> Result<Json<CompositeAqi>, ApiError> {
    Ok(Json(agg.composite_aqi(&q.state, &q.city)?))
}

async fn state_aqi(
    State(agg): Shared,
    Query(q): Query<StateQuery>,
) -> Result<Json<StateAqi>, ApiError> {
    Ok(Json(agg.state_aqi(&q.state)?))
}

async fn city_and_state_aqi(
    State(agg): Shared,
    Query(q): Query<LocationQuery>,
) -> Result<Json<CityAndStateAqi>, ApiError> {
    Ok(Json(agg.city_and_state_aqi(&q.state, &q.city)?))
}

async fn plot_pollution(
    State(agg): Shared,
    Query(q): Query<LocationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let breakdown = agg.state_breakdown(&q.state)?;
    let svg = render_bar_chart(&breakdown, Some(&q.city));
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
