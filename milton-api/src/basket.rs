use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use milton_core::{CoreError, FieldErrors, Flash, FlashCategory};
use milton_order::{
    browsing_total, AddItemOutcome, EmptyBasketOutcome, RemoveItemOutcome, UpdateQuantityOutcome,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use crate::error::AppError;
use crate::session::{back_or, close_session, open_session};
use crate::state::AppState;
use crate::views::OrderSummary;

const NOTHING_TO_DELETE: &str = "There's no order to delete!";
const ADD_FAILED: &str = "There was an issue adding the item to your basket";

#[derive(Debug, Deserialize)]
pub struct BasketQuery {
    pub tour_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub id: String,
    pub qty: String,
}

#[derive(Debug, Serialize)]
pub struct BasketPage {
    pub basket: Option<OrderSummary>,
    pub total_price: Decimal,
    pub messages: Vec<Flash>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", get(order).post(order_form))
        .route("/deleteorderitem", post(delete_order_item))
        .route("/updateorderitem", post(update_order_item))
        .route("/deleteorder", get(delete_order))
}

/// GET /order[?tour_id=]
async fn order(
    State(state): State<AppState>,
    Query(query): Query<BasketQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    add_or_show(state, jar, query.tour_id).await
}

/// POST /order
///
/// `tour_id` may come from the query string or the form body; the query wins.
async fn order_form(
    State(state): State<AppState>,
    Query(query): Query<BasketQuery>,
    jar: CookieJar,
    body: Result<Form<BasketQuery>, FormRejection>,
) -> Result<Response, AppError> {
    let tour_id = query
        .tour_id
        .or_else(|| body.ok().and_then(|Form(form)| form.tour_id));
    add_or_show(state, jar, tour_id).await
}

/// Viewing never creates an order; adding does.
async fn add_or_show(
    state: AppState,
    jar: CookieJar,
    tour_id: Option<String>,
) -> Result<Response, AppError> {
    let mut session = open_session(&state, &jar).await?;

    if let Some(raw) = tour_id {
        match raw.trim().parse::<i64>() {
            Ok(tour_id) => match state.basket.add_item(&mut session, tour_id).await {
                AddItemOutcome::Added { order_id, total } => {
                    info!("Tour {} added to order {}, basket total {}", tour_id, order_id, total);
                }
                AddItemOutcome::NoBasket => {}
                AddItemOutcome::Warning(_) => session.flash(FlashCategory::Danger, ADD_FAILED),
            },
            Err(_) => session.flash(FlashCategory::Danger, ADD_FAILED),
        }

        let jar = close_session(&state, jar, &mut session).await?;
        return Ok((jar, Redirect::to("/order")).into_response());
    }

    let basket = state.basket.current(&session).await?;
    let total_price = basket.as_ref().map(browsing_total).unwrap_or(Decimal::ZERO);
    let page = BasketPage {
        basket: basket.as_ref().map(OrderSummary::from),
        total_price,
        messages: session.take_flashes(),
    };
    let jar = close_session(&state, jar, &mut session).await?;

    Ok((jar, Json(page)).into_response())
}

/// POST /deleteorderitem
async fn delete_order_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LineForm>,
) -> Result<Response, AppError> {
    let mut session = open_session(&state, &jar).await?;
    let tour_id = form
        .id
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::internal(format!("invalid tour id {:?}", form.id)))?;

    let outcome = state
        .basket
        .remove_item(&mut session, tour_id)
        .await
        .map_err(AppError::internal)?;

    let redirect = match outcome {
        RemoveItemOutcome::Removed { .. } => Redirect::to("/order"),
        RemoveItemOutcome::NothingToDelete => {
            session.flash(FlashCategory::Info, NOTHING_TO_DELETE);
            back_or(&headers, "/order")
        }
    };

    let jar = close_session(&state, jar, &mut session).await?;
    Ok((jar, redirect).into_response())
}

/// POST /updateorderitem
async fn update_order_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<QuantityForm>,
) -> Result<Response, AppError> {
    let mut session = open_session(&state, &jar).await?;
    let tour_id = form
        .id
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::internal(format!("invalid tour id {:?}", form.id)))?;
    let qty = match form.qty.trim().parse::<i32>() {
        Ok(qty) => qty,
        Err(_) => {
            let mut fields = FieldErrors::default();
            fields.push("qty", "Not a valid integer value");
            return Err(AppError::ValidationError(fields));
        }
    };

    let outcome = match state.basket.update_quantity(&mut session, tour_id, qty).await {
        Ok(outcome) => outcome,
        Err(e @ CoreError::Validation(_)) => return Err(e.into()),
        Err(e) => return Err(AppError::internal(e)),
    };

    let redirect = match outcome {
        UpdateQuantityOutcome::Updated { .. } => Redirect::to("/order"),
        UpdateQuantityOutcome::NothingToDelete => {
            session.flash(FlashCategory::Info, NOTHING_TO_DELETE);
            back_or(&headers, "/order")
        }
    };

    let jar = close_session(&state, jar, &mut session).await?;
    Ok((jar, redirect).into_response())
}

/// GET /deleteorder
async fn delete_order(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let mut session = open_session(&state, &jar).await?;

    match state.basket.empty_basket(&mut session).await {
        EmptyBasketOutcome::Emptied { .. } => session.flash(FlashCategory::Info, "Basket emptied!"),
        EmptyBasketOutcome::NothingToDelete => {
            session.flash(FlashCategory::Info, NOTHING_TO_DELETE)
        }
        EmptyBasketOutcome::Warning(e) => session.flash(
            FlashCategory::Danger,
            format!("An error occurred while deleting the order: {}", e),
        ),
    }

    let jar = close_session(&state, jar, &mut session).await?;
    Ok((jar, Redirect::to("/")).into_response())
}
