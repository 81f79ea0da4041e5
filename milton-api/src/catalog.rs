use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use milton_catalog::{City, Tour};
use milton_core::Flash;
use serde::{Deserialize, Serialize};
use crate::error::AppError;
use crate::session::{close_session, open_session};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CitiesPage {
    pub cities: Vec<City>,
    pub messages: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct ToursPage {
    pub tours: Vec<Tour>,
    pub messages: Vec<Flash>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/tours/{city_id}", get(city_tours))
        .route("/search", get(search).post(search))
}

/// GET /
async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<CitiesPage>), AppError> {
    let mut session = open_session(&state, &jar).await?;
    let cities = state.catalog.list_cities().await?;
    let messages = session.take_flashes();
    let jar = close_session(&state, jar, &mut session).await?;

    Ok((jar, Json(CitiesPage { cities, messages })))
}

/// GET /tours/{city_id}
async fn city_tours(
    State(state): State<AppState>,
    Path(city_id): Path<i64>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ToursPage>), AppError> {
    let mut session = open_session(&state, &jar).await?;
    let tours = state.catalog.list_tours_by_city(city_id).await?;
    let messages = session.take_flashes();
    let jar = close_session(&state, jar, &mut session).await?;

    Ok((jar, Json(ToursPage { tours, messages })))
}

/// GET|POST /search?search=
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ToursPage>), AppError> {
    let mut session = open_session(&state, &jar).await?;
    let tours = state.catalog.search_tours(query.search.as_deref()).await?;
    let messages = session.take_flashes();
    let jar = close_session(&state, jar, &mut session).await?;

    Ok((jar, Json(ToursPage { tours, messages })))
}
