use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use milton_core::{CheckoutForm, Flash, FlashCategory};
use milton_order::{checkout_total, SubmitOutcome};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::error::AppError;
use crate::session::{back_or, close_session, open_session};
use crate::state::AppState;
use crate::views::OrderSummary;

const EMPTY_BASKET: &str = "You need to add some tours to your basket first!";

#[derive(Debug, Serialize)]
pub struct CheckoutPage {
    pub fields: [&'static str; 4],
    pub basket: OrderSummary,
    pub total_cost: Decimal,
    pub messages: Vec<Flash>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout", get(checkout_form).post(submit_checkout))
}

/// GET /checkout
async fn checkout_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let mut session = open_session(&state, &jar).await?;

    let Some(order) = state.checkout.ready(&session).await? else {
        session.flash(FlashCategory::Info, EMPTY_BASKET);
        let jar = close_session(&state, jar, &mut session).await?;
        return Ok((jar, back_or(&headers, "/order")).into_response());
    };

    let page = CheckoutPage {
        fields: CheckoutForm::FIELDS,
        basket: OrderSummary::from(&order),
        total_cost: checkout_total(&order),
        messages: session.take_flashes(),
    };
    let jar = close_session(&state, jar, &mut session).await?;
    Ok((jar, Json(page)).into_response())
}

/// POST /checkout
async fn submit_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, AppError> {
    let mut session = open_session(&state, &jar).await?;

    let redirect = match state.checkout.submit(&mut session, &form).await? {
        SubmitOutcome::Submitted { .. } => {
            session.flash(FlashCategory::Info, "Basket emptied!");
            session.flash(
                FlashCategory::Success,
                "Thank you! One of our team members will contact you soon.",
            );
            Redirect::to("/")
        }
        SubmitOutcome::EmptyBasket => {
            session.flash(FlashCategory::Info, EMPTY_BASKET);
            back_or(&headers, "/order")
        }
        SubmitOutcome::Invalid(fields) => return Err(AppError::ValidationError(fields)),
        SubmitOutcome::Failed(_) => {
            session.flash(FlashCategory::Danger, "There was an issue completing your order");
            back_or(&headers, "/checkout")
        }
    };

    let jar = close_session(&state, jar, &mut session).await?;
    Ok((jar, redirect).into_response())
}
