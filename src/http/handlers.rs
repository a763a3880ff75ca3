use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::app::bills::BillService;
use crate::app::debts::DebtService;
use crate::app::goals::GoalService;
use crate::app::notifications::{LifecycleOutcome, ListFilter, NotificationService};
use crate::app::reconcile::ReconcileService;
use crate::domain::entity::Recurrence;
use crate::http::{AppError, AuthUser};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = state.db.ping().await.is_ok();
    let status = if db { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct NotificationQuery {
    pub filter: Option<String>,
}

#[derive(Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<crate::domain::notification::Notification>,
}

fn lifecycle_status(outcome: LifecycleOutcome) -> Result<StatusCode, AppError> {
    match outcome {
        LifecycleOutcome::Applied => Ok(StatusCode::NO_CONTENT),
        LifecycleOutcome::NotFound => Err(AppError::not_found("notification not found")),
        LifecycleOutcome::Forbidden => {
            Err(AppError::forbidden("notification belongs to another user"))
        }
    }
}

/// Reconciles the caller's due entities into the store, then returns the
/// active notifications. Reads are the only trigger for generation.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let filter = match query.filter.as_deref() {
        None | Some("all") => ListFilter::All,
        Some("unread") => ListFilter::Unread,
        Some(other) => {
            return Err(AppError::bad_request(format!("unknown filter: {}", other)));
        }
    };

    let reconciler = ReconcileService::new(state.db.clone());
    reconciler.run(auth.user_id, OffsetDateTime::now_utc()).await;

    let service = NotificationService::new(state.db.clone());
    let notifications = service.list(auth.user_id, filter).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list notifications");
        AppError::internal("failed to list notifications")
    })?;

    Ok(Json(NotificationListResponse { notifications }))
}

pub async fn mark_notification_read(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = NotificationService::new(state.db.clone());
    let outcome = service.mark_read(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, notification_id = %id, user_id = %auth.user_id, "failed to mark notification read");
        AppError::internal("failed to mark notification read")
    })?;

    lifecycle_status(outcome)
}

pub async fn mark_all_notifications_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = NotificationService::new(state.db.clone());
    service.mark_all_read(auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to mark notifications read");
        AppError::internal("failed to mark notifications read")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_notification(
    auth: AuthUser,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = NotificationService::new(state.db.clone());
    let outcome = service
        .delete(id, auth.user_id, OffsetDateTime::now_utc())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, notification_id = %id, user_id = %auth.user_id, "failed to delete notification");
            AppError::internal("failed to delete notification")
        })?;

    lifecycle_status(outcome)
}

pub async fn clear_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = NotificationService::new(state.db.clone());
    service.clear_all(auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to clear notifications");
        AppError::internal("failed to clear notifications")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateBillRequest {
    pub label: String,
    pub amount_cents: i64,
    pub due_date: Date,
    pub recurrence: Option<Recurrence>,
}

pub async fn create_bill(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBillRequest>,
) -> Result<Json<crate::domain::bill::Bill>, AppError> {
    if payload.label.trim().is_empty() {
        return Err(AppError::bad_request("label cannot be empty"));
    }
    if payload.amount_cents <= 0 {
        return Err(AppError::bad_request("amount_cents must be positive"));
    }

    let service = BillService::new(state.db.clone());
    let bill = service
        .create(
            auth.user_id,
            payload.label,
            payload.amount_cents,
            payload.due_date,
            payload.recurrence,
            OffsetDateTime::now_utc(),
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create bill");
            AppError::internal("failed to create bill")
        })?;

    Ok(Json(bill))
}

#[derive(Serialize)]
pub struct BillListResponse {
    pub bills: Vec<crate::domain::bill::Bill>,
}

pub async fn list_bills(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BillListResponse>, AppError> {
    let service = BillService::new(state.db.clone());
    let bills = service.list(auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list bills");
        AppError::internal("failed to list bills")
    })?;

    Ok(Json(BillListResponse { bills }))
}

#[derive(Deserialize)]
pub struct UpdateBillRequest {
    pub label: Option<String>,
    pub amount_cents: Option<i64>,
    pub due_date: Option<Date>,
}

pub async fn update_bill(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateBillRequest>,
) -> Result<Json<crate::domain::bill::Bill>, AppError> {
    if let Some(label) = &payload.label {
        if label.trim().is_empty() {
            return Err(AppError::bad_request("label cannot be empty"));
        }
    }
    if let Some(amount) = payload.amount_cents {
        if amount <= 0 {
            return Err(AppError::bad_request("amount_cents must be positive"));
        }
    }

    let service = BillService::new(state.db.clone());
    let bill = service
        .update(
            id,
            auth.user_id,
            payload.label,
            payload.amount_cents,
            payload.due_date,
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, bill_id = %id, "failed to update bill");
            AppError::internal("failed to update bill")
        })?;

    match bill {
        Some(bill) => Ok(Json(bill)),
        None => Err(AppError::not_found("bill not found")),
    }
}

/// Settles a one-off bill; advances a recurring bill into its next cycle.
pub async fn pay_bill(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<crate::domain::bill::Bill>, AppError> {
    let service = BillService::new(state.db.clone());
    let bill = service.pay(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, bill_id = %id, "failed to pay bill");
        AppError::internal("failed to pay bill")
    })?;

    match bill {
        Some(bill) => Ok(Json(bill)),
        None => Err(AppError::not_found("bill not found")),
    }
}

pub async fn delete_bill(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = BillService::new(state.db.clone());
    let deleted = service.delete(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, bill_id = %id, "failed to delete bill");
        AppError::internal("failed to delete bill")
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("bill not found"))
    }
}

// ---------------------------------------------------------------------------
// Debts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateDebtRequest {
    pub label: String,
    pub amount_cents: i64,
    pub balance_cents: i64,
    pub due_date: Date,
    pub recurrence: Option<Recurrence>,
}

pub async fn create_debt(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateDebtRequest>,
) -> Result<Json<crate::domain::debt::Debt>, AppError> {
    if payload.label.trim().is_empty() {
        return Err(AppError::bad_request("label cannot be empty"));
    }
    if payload.amount_cents <= 0 {
        return Err(AppError::bad_request("amount_cents must be positive"));
    }
    if payload.balance_cents <= 0 {
        return Err(AppError::bad_request("balance_cents must be positive"));
    }

    let service = DebtService::new(state.db.clone());
    let debt = service
        .create(
            auth.user_id,
            payload.label,
            payload.amount_cents,
            payload.balance_cents,
            payload.due_date,
            payload.recurrence,
            OffsetDateTime::now_utc(),
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create debt");
            AppError::internal("failed to create debt")
        })?;

    Ok(Json(debt))
}

#[derive(Serialize)]
pub struct DebtListResponse {
    pub debts: Vec<crate::domain::debt::Debt>,
}

pub async fn list_debts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DebtListResponse>, AppError> {
    let service = DebtService::new(state.db.clone());
    let debts = service.list(auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list debts");
        AppError::internal("failed to list debts")
    })?;

    Ok(Json(DebtListResponse { debts }))
}

#[derive(Deserialize)]
pub struct UpdateDebtRequest {
    pub label: Option<String>,
    pub amount_cents: Option<i64>,
    pub due_date: Option<Date>,
}

pub async fn update_debt(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateDebtRequest>,
) -> Result<Json<crate::domain::debt::Debt>, AppError> {
    if let Some(label) = &payload.label {
        if label.trim().is_empty() {
            return Err(AppError::bad_request("label cannot be empty"));
        }
    }
    if let Some(amount) = payload.amount_cents {
        if amount <= 0 {
            return Err(AppError::bad_request("amount_cents must be positive"));
        }
    }

    let service = DebtService::new(state.db.clone());
    let debt = service
        .update(
            id,
            auth.user_id,
            payload.label,
            payload.amount_cents,
            payload.due_date,
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, debt_id = %id, "failed to update debt");
            AppError::internal("failed to update debt")
        })?;

    match debt {
        Some(debt) => Ok(Json(debt)),
        None => Err(AppError::not_found("debt not found")),
    }
}

#[derive(Deserialize)]
pub struct PayDebtRequest {
    pub amount_cents: Option<i64>,
}

/// Records a payment (defaulting to the scheduled amount), settles the debt
/// when the balance reaches zero, and advances a recurring due date.
pub async fn pay_debt(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Option<Json<PayDebtRequest>>,
) -> Result<Json<crate::domain::debt::Debt>, AppError> {
    let amount_cents = payload.and_then(|Json(payload)| payload.amount_cents);
    if let Some(amount) = amount_cents {
        if amount <= 0 {
            return Err(AppError::bad_request("amount_cents must be positive"));
        }
    }

    let service = DebtService::new(state.db.clone());
    let debt = service
        .pay(id, auth.user_id, amount_cents)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, debt_id = %id, "failed to pay debt");
            AppError::internal("failed to pay debt")
        })?;

    match debt {
        Some(debt) => Ok(Json(debt)),
        None => Err(AppError::not_found("debt not found")),
    }
}

pub async fn delete_debt(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = DebtService::new(state.db.clone());
    let deleted = service.delete(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, debt_id = %id, "failed to delete debt");
        AppError::internal("failed to delete debt")
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("debt not found"))
    }
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateGoalRequest {
    pub label: String,
    pub target_cents: i64,
    pub target_date: Date,
}

pub async fn create_goal(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateGoalRequest>,
) -> Result<Json<crate::domain::goal::Goal>, AppError> {
    if payload.label.trim().is_empty() {
        return Err(AppError::bad_request("label cannot be empty"));
    }
    if payload.target_cents <= 0 {
        return Err(AppError::bad_request("target_cents must be positive"));
    }

    let service = GoalService::new(state.db.clone());
    let goal = service
        .create(
            auth.user_id,
            payload.label,
            payload.target_cents,
            payload.target_date,
            OffsetDateTime::now_utc(),
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %auth.user_id, "failed to create goal");
            AppError::internal("failed to create goal")
        })?;

    Ok(Json(goal))
}

#[derive(Serialize)]
pub struct GoalListResponse {
    pub goals: Vec<crate::domain::goal::Goal>,
}

pub async fn list_goals(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<GoalListResponse>, AppError> {
    let service = GoalService::new(state.db.clone());
    let goals = service.list(auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %auth.user_id, "failed to list goals");
        AppError::internal("failed to list goals")
    })?;

    Ok(Json(GoalListResponse { goals }))
}

#[derive(Deserialize)]
pub struct UpdateGoalRequest {
    pub label: Option<String>,
    pub target_cents: Option<i64>,
    pub target_date: Option<Date>,
}

pub async fn update_goal(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateGoalRequest>,
) -> Result<Json<crate::domain::goal::Goal>, AppError> {
    if let Some(label) = &payload.label {
        if label.trim().is_empty() {
            return Err(AppError::bad_request("label cannot be empty"));
        }
    }
    if let Some(target) = payload.target_cents {
        if target <= 0 {
            return Err(AppError::bad_request("target_cents must be positive"));
        }
    }

    let service = GoalService::new(state.db.clone());
    let goal = service
        .update(
            id,
            auth.user_id,
            payload.label,
            payload.target_cents,
            payload.target_date,
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, goal_id = %id, "failed to update goal");
            AppError::internal("failed to update goal")
        })?;

    match goal {
        Some(goal) => Ok(Json(goal)),
        None => Err(AppError::not_found("goal not found")),
    }
}

#[derive(Deserialize)]
pub struct ContributeRequest {
    pub amount_cents: i64,
}

pub async fn contribute_goal(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ContributeRequest>,
) -> Result<Json<crate::domain::goal::Goal>, AppError> {
    if payload.amount_cents <= 0 {
        return Err(AppError::bad_request("amount_cents must be positive"));
    }

    let service = GoalService::new(state.db.clone());
    let goal = service
        .contribute(id, auth.user_id, payload.amount_cents)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, goal_id = %id, "failed to record contribution");
            AppError::internal("failed to record contribution")
        })?;

    match goal {
        Some(goal) => Ok(Json(goal)),
        None => Err(AppError::not_found("goal not found")),
    }
}

pub async fn delete_goal(
    Path(id): Path<Uuid>,
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = GoalService::new(state.db.clone());
    let deleted = service.delete(id, auth.user_id).await.map_err(|err| {
        tracing::error!(error = ?err, goal_id = %id, "failed to delete goal");
        AppError::internal("failed to delete goal")
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("goal not found"))
    }
}
