//! Quote generation endpoint.
//!
//! `POST /api/generatequote` reads the line items of a CRM opportunity,
//! prices them with the regional discount (or a per-line override when
//! enabled), and writes a new Quote plus its QuoteLineItems back to the
//! CRM. The response carries the CRM-assigned quote id.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use quoteforge_core::errors::QuoteGenerationError;
use quoteforge_core::pricing;
use quoteforge_core::OpportunityLineItem;
use quoteforge_crm::{CrmClient, SObject};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

const QUOTE_OBJECT: &str = "Quote";
const QUOTE_LINE_OBJECT: &str = "QuoteLineItem";
const QUOTE_NAME: &str = "New Quote";

#[derive(Clone)]
pub struct QuoteState {
    pub crm: Arc<dyn CrmClient>,
    pub discount_overrides_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuoteGenerationRequest {
    #[serde(rename = "opportunityId")]
    pub opportunity_id: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteGenerationResponse {
    #[serde(rename = "quoteId")]
    pub quote_id: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteApiError {
    pub error: String,
}

pub fn router(state: QuoteState) -> Router {
    Router::new().route("/api/generatequote", post(generate_quote)).with_state(state)
}

async fn generate_quote(
    State(state): State<QuoteState>,
    Json(request): Json<QuoteGenerationRequest>,
) -> Result<Json<QuoteGenerationResponse>, (StatusCode, Json<QuoteApiError>)> {
    let correlation_id = Uuid::new_v4().simple().to_string();

    match generate_quote_for_opportunity(
        state.crm.as_ref(),
        state.discount_overrides_enabled,
        &request.opportunity_id,
    )
    .await
    {
        Ok(response) => {
            info!(
                event_name = "quote.generate.succeeded",
                correlation_id = %correlation_id,
                opportunity_id = %request.opportunity_id,
                quote_id = %response.quote_id,
                "quote generated"
            );
            Ok(Json(response))
        }
        Err(failure) => {
            error!(
                event_name = "quote.generate.failed",
                correlation_id = %correlation_id,
                opportunity_id = %request.opportunity_id,
                error = %failure,
                "quote generation failed"
            );
            Err((error_status(&failure), Json(QuoteApiError { error: failure.user_message() })))
        }
    }
}

fn error_status(error: &QuoteGenerationError) -> StatusCode {
    match error {
        QuoteGenerationError::NoLineItems(_) => StatusCode::NOT_FOUND,
        QuoteGenerationError::UpstreamWrite { .. } | QuoteGenerationError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Runs the three sequential CRM round trips: line-item query, quote
/// create, line-item bulk create.
pub(crate) async fn generate_quote_for_opportunity(
    crm: &dyn CrmClient,
    overrides_enabled: bool,
    opportunity_id: &str,
) -> Result<QuoteGenerationResponse, QuoteGenerationError> {
    let soql = line_item_query(opportunity_id, overrides_enabled);
    let query_result = crm.query(&soql).await?;
    if query_result.records.is_empty() {
        return Err(QuoteGenerationError::NoLineItems(opportunity_id.to_string()));
    }

    let line_items = query_result
        .records
        .iter()
        .map(OpportunityLineItem::from_record)
        .collect::<Result<Vec<_>, _>>()?;

    let default_rate = pricing::regional_discount_rate(pricing::DEFAULT_REGION);

    let quote =
        SObject::new(QUOTE_OBJECT).field("Name", QUOTE_NAME).field("OpportunityId", opportunity_id);
    let quote_results = crm.create(vec![quote]).await?;
    let quote_result = quote_results.first().ok_or_else(|| {
        QuoteGenerationError::Internal("crm returned no result for the quote create".to_string())
    })?;
    if !quote_result.success {
        return Err(QuoteGenerationError::UpstreamWrite {
            object: QUOTE_OBJECT,
            message: quote_result.first_error_message(),
        });
    }
    let quote_id = quote_result.id.clone().ok_or_else(|| {
        QuoteGenerationError::Internal("crm reported success without a quote id".to_string())
    })?;

    let mut quote_lines = Vec::with_capacity(line_items.len());
    for line in &line_items {
        let override_pct = if overrides_enabled { line.discount_override } else { None };
        let rate = pricing::effective_discount_rate(default_rate, override_pct);
        let unit_price = pricing::discounted_unit_price(line.quantity, line.unit_price, rate);
        if !unit_price.is_finite() {
            return Err(QuoteGenerationError::Internal(format!(
                "discount computation produced a non-finite unit price for line item `{}`",
                line.id
            )));
        }

        quote_lines.push(
            SObject::new(QUOTE_LINE_OBJECT)
                .field("QuoteId", quote_id.as_str())
                .field("PricebookEntryId", line.pricebook_entry_id.as_str())
                .field("Quantity", line.quantity)
                .field("UnitPrice", unit_price),
        );
    }

    // A failed line batch leaves the quote record behind: there is no
    // compensating delete.
    let line_results = crm.create(quote_lines).await?;
    for result in &line_results {
        if !result.success {
            return Err(QuoteGenerationError::UpstreamWrite {
                object: QUOTE_LINE_OBJECT,
                message: result.first_error_message(),
            });
        }
    }

    Ok(QuoteGenerationResponse { quote_id })
}

fn line_item_query(opportunity_id: &str, include_override: bool) -> String {
    let fields = OpportunityLineItem::query_fields(include_override).join(", ");
    format!("SELECT {fields} FROM OpportunityLineItem WHERE OpportunityId = '{opportunity_id}'")
}
