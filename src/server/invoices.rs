use std::convert::Infallible;

use axum::Form;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::actions::{self, INVOICES_PATH, MutationError};
use crate::data::{fetch_customers, fetch_invoice_by_id};
use crate::error::AppError;
use crate::resolver::{QueryState, SearchParams, canonical_redirect, resolve};
use crate::search::href;
use crate::ui::{FormValues, InvoiceFormView, InvoicesView};
use crate::validation::InvoiceForm;

use super::AppState;

pub(super) async fn list(
    State(state): State<AppState>,
    RawQuery(query_string): RawQuery,
) -> Result<Response, AppError> {
    let query_string = query_string.unwrap_or_default();
    if let Some(location) = canonical_redirect(INVOICES_PATH, &query_string) {
        return Ok(Redirect::to(&location).into_response());
    }

    let params = SearchParams::from_query_string(&query_string);
    let page = resolve(state.store.as_ref(), QueryState::from_params(&params)).await?;
    let body = state
        .renderer
        .invoices(&InvoicesView::new(INVOICES_PATH, &query_string, &page))?;

    Ok(([(header::CACHE_CONTROL, "no-store")], Html(body)).into_response())
}

pub(super) async fn create_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let customers = fetch_customers(state.store.as_ref()).await?;
    let view = InvoiceFormView::create(&customers, &FormValues::default(), None);
    Ok(Html(state.renderer.invoice_form(&view)?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Form(form): Form<InvoiceForm>,
) -> Result<Response, AppError> {
    match actions::create_invoice(state.store.as_ref(), &state.invalidator, &form).await {
        Ok(outcome) => Ok(Redirect::to(outcome.redirect.unwrap_or(INVOICES_PATH)).into_response()),
        Err(MutationError::Validation(errors)) => {
            let customers = fetch_customers(state.store.as_ref()).await?;
            let view = InvoiceFormView::create(&customers, &FormValues::from_form(&form), Some(&errors));
            rejected(&state, &view)
        }
        Err(MutationError::Store(failure)) => Err(failure.into()),
    }
}

pub(super) async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let store = state.store.as_ref();
    let (invoice, customers) =
        tokio::try_join!(fetch_invoice_by_id(store, &id), fetch_customers(store))?;
    let invoice = invoice.ok_or(AppError::NotFound)?;

    let view = InvoiceFormView::edit(&id, &customers, &FormValues::from_invoice(&invoice), None);
    Ok(Html(state.renderer.invoice_form(&view)?))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> Result<Response, AppError> {
    match actions::update_invoice(state.store.as_ref(), &state.invalidator, &id, &form).await {
        Ok(outcome) => Ok(Redirect::to(outcome.redirect.unwrap_or(INVOICES_PATH)).into_response()),
        Err(MutationError::Validation(errors)) => {
            let customers = fetch_customers(state.store.as_ref()).await?;
            let view = InvoiceFormView::edit(&id, &customers, &FormValues::from_form(&form), Some(&errors));
            rejected(&state, &view)
        }
        Err(MutationError::Store(failure)) => Err(failure.into()),
    }
}

/// Deletion keeps the user on the list they deleted from, search and page
/// included.
pub(super) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let outcome = actions::delete_invoice(state.store.as_ref(), &state.invalidator, &id).await?;
    let target = match outcome.redirect {
        Some(path) => path.to_string(),
        None => list_referer(&headers).unwrap_or_else(|| INVOICES_PATH.to_string()),
    };
    Ok(Redirect::to(&target))
}

/// Live-refresh stream for open list pages. A subscriber that fell behind
/// has missed events, so it is told to refresh as well.
pub(super) async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let stream = BroadcastStream::new(state.invalidator.subscribe()).map(|event| {
        let path = match event {
            Ok(event) => event.path,
            Err(BroadcastStreamRecvError::Lagged(_)) => INVOICES_PATH.to_string(),
        };
        Ok::<_, Infallible>(Event::default().event("invalidate").data(path))
    });

    (
        [(header::CACHE_CONTROL, "no-store")],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    )
}

fn rejected(state: &AppState, view: &InvoiceFormView) -> Result<Response, AppError> {
    let body = state.renderer.invoice_form(view)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response())
}

/// The list URL the request came from, if it came from the list.
fn list_referer(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let url = url::Url::parse(referer).ok()?;
    if url.path() != INVOICES_PATH {
        return None;
    }
    Some(href(INVOICES_PATH, url.query().unwrap_or_default()))
}
