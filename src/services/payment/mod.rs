pub mod wave;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{RequestStatus, ServiceRequest, Transaction, TransactionStatus, User};
use crate::services::lifecycle::{self, RequestAction};
use crate::services::notify::notify;
use crate::state::AppState;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a checkout for `amount` and returns the gateway reference.
    async fn create_checkout(&self, amount: i64, request_id: &str) -> anyhow::Result<String>;

    /// Whether the payment behind `reference` went through.
    async fn confirm(&self, reference: &str) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub request_id: String,
    pub reference: String,
    pub amount: i64,
    pub transaction_status: TransactionStatus,
    pub request_status: RequestStatus,
}

/// Marks a request as having a payment in progress until dropped.
struct InFlight {
    state: Arc<AppState>,
    request_id: String,
}

impl InFlight {
    fn acquire(state: &Arc<AppState>, request_id: &str) -> Result<Self, AppError> {
        let mut ids = state
            .payments_in_flight
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("payment registry poisoned")))?;
        if !ids.insert(request_id.to_string()) {
            return Err(AppError::Conflict(
                "a payment for this request is already in progress".to_string(),
            ));
        }
        Ok(Self {
            state: state.clone(),
            request_id: request_id.to_string(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut ids) = self.state.payments_in_flight.lock() {
            ids.remove(&self.request_id);
        }
    }
}

/// Pays for a completed request on behalf of its client.
///
/// Once the checks pass, the checkout, confirmation and settlement run on
/// their own task: a caller that goes away does not stop them, and every
/// recorded transaction ends as `success` or `failed`.
pub async fn pay_request(
    state: &Arc<AppState>,
    client: &User,
    request_id: &str,
) -> Result<PaymentReceipt, AppError> {
    let request = {
        let db = state.lock_db()?;
        queries::get_request(&db, request_id)?
            .ok_or_else(|| AppError::NotFound(format!("request {request_id}")))?
    };

    lifecycle::authorize(RequestAction::Pay, client, &request)?;
    lifecycle::next_status(request.status, RequestAction::Pay)?;

    let in_flight = InFlight::acquire(state, request_id)?;

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        let _in_flight = in_flight;
        run_payment(&task_state, &request).await
    });

    handle
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("payment task failed: {e}")))?
}

/// Checkout, pending record, confirmation and settlement of one payment.
///
/// The transaction is recorded as `pending` once the checkout is opened. On
/// confirmation the transaction success and the `completed -> paid` move are
/// written in one SQLite transaction, so a request is never paid without a
/// successful transaction behind it.
async fn run_payment(
    state: &AppState,
    request: &ServiceRequest,
) -> Result<PaymentReceipt, AppError> {
    let request_id = request.id.as_str();
    let amount = state.config.payment_amount;
    let reference = state
        .payments
        .create_checkout(amount, request_id)
        .await
        .map_err(|e| AppError::Payment(format!("checkout failed: {e}")))?;

    {
        let db = state.lock_db()?;
        queries::create_transaction(
            &db,
            &Transaction {
                id: uuid::Uuid::new_v4().to_string(),
                request_id: request_id.to_string(),
                amount,
                status: TransactionStatus::Pending,
                reference: reference.clone(),
                created_at: Utc::now().naive_utc(),
            },
        )?;
    }
    tracing::info!(request_id = %request_id, reference = %reference, amount, "checkout opened");

    let confirmed = match state.payments.confirm(&reference).await {
        Ok(confirmed) => confirmed,
        Err(e) => {
            tracing::error!(error = %e, reference = %reference, "payment confirmation failed");
            fail_transaction(state, &reference)?;
            return Err(AppError::Payment(format!("confirmation failed: {e}")));
        }
    };

    if !confirmed {
        tracing::warn!(reference = %reference, "payment was not confirmed");
        fail_transaction(state, &reference)?;
        return Err(AppError::Payment("payment was not confirmed".to_string()));
    }

    {
        let mut db = state.lock_db()?;
        if !settle(&mut db, &reference, request_id, amount)? {
            tracing::warn!(request_id = %request_id, reference = %reference, "request left completed state during payment");
            return Err(AppError::Conflict(
                "request is no longer awaiting payment".to_string(),
            ));
        }
        notify(
            state,
            &db,
            &request.provider_id,
            &format!(
                "Paiement de {amount} FCFA reçu pour \"{}\"",
                request.description
            ),
        );
    }
    tracing::info!(request_id = %request_id, reference = %reference, "request paid");

    Ok(PaymentReceipt {
        request_id: request_id.to_string(),
        reference,
        amount,
        transaction_status: TransactionStatus::Success,
        request_status: RequestStatus::Paid,
    })
}

fn fail_transaction(state: &AppState, reference: &str) -> Result<(), AppError> {
    let db = state.lock_db()?;
    queries::set_transaction_status(&db, reference, TransactionStatus::Failed)?;
    Ok(())
}

/// Writes a confirmed payment. Returns false, with the transaction marked
/// failed and the request untouched, when the request is no longer completed.
fn settle(
    conn: &mut Connection,
    reference: &str,
    request_id: &str,
    amount: i64,
) -> anyhow::Result<bool> {
    let tx = conn.transaction()?;
    queries::set_transaction_status(&tx, reference, TransactionStatus::Success)?;
    if !queries::mark_request_paid(&tx, request_id, amount)? {
        tx.rollback()?;
        queries::set_transaction_status(conn, reference, TransactionStatus::Failed)?;
        return Ok(false);
    }
    tx.commit()?;
    Ok(true)
}
