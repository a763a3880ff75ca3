#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use time::{Date, Duration, OffsetDateTime};
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

use tally::config::AppConfig;
use tally::infra::db::Db;
use tally::AppState;

// ---------------------------------------------------------------------------
// TestApp — shared, lazily initialized once per test binary
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

static TEST_APP: OnceCell<TestApp> = OnceCell::const_new();

/// Get (or lazily create) the shared TestApp instance.
pub async fn app() -> &'static TestApp {
    TEST_APP
        .get_or_init(|| async { TestApp::setup().await })
        .await
}

/// The reference day the handlers reconcile against. Fixture due dates are
/// offsets from this.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

impl TestApp {
    // ------------------------------------------------------------------
    // Setup — runs once per test binary
    // ------------------------------------------------------------------
    async fn setup() -> Self {
        // Fresh temp-file database per binary; Db::connect creates the file
        // and applies the embedded migrations.
        let db_path = std::env::temp_dir().join(format!("tally-test-{}.db", Uuid::new_v4()));
        std::env::set_var("DATABASE_URL", format!("sqlite:{}", db_path.display()));
        std::env::set_var("DB_MAX_CONNECTIONS", "5");

        let config = AppConfig::from_env().expect("failed to build AppConfig");
        let db = Db::connect(&config).await.expect("Db::connect failed");

        let state = AppState { db };
        let router = tally::http::router(state.clone());

        TestApp { router, state }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        for &(key, value) in headers {
            builder = builder.header(key, value);
        }

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers — identity goes in the x-user-id header
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str, user: Option<Uuid>) -> TestResponse {
        let mut headers = vec![];
        let id;
        if let Some(user) = user {
            id = user.to_string();
            headers.push(("x-user-id", id.as_str()));
        }
        self.request(Method::GET, path, None, &headers).await
    }

    pub async fn post(&self, path: &str, user: Option<Uuid>) -> TestResponse {
        let mut headers = vec![];
        let id;
        if let Some(user) = user {
            id = user.to_string();
            headers.push(("x-user-id", id.as_str()));
        }
        self.request(Method::POST, path, None, &headers).await
    }

    pub async fn post_json(&self, path: &str, body: Value, user: Option<Uuid>) -> TestResponse {
        let mut headers = vec![];
        let id;
        if let Some(user) = user {
            id = user.to_string();
            headers.push(("x-user-id", id.as_str()));
        }
        self.request(Method::POST, path, Some(body), &headers).await
    }

    pub async fn patch_json(&self, path: &str, body: Value, user: Option<Uuid>) -> TestResponse {
        let mut headers = vec![];
        let id;
        if let Some(user) = user {
            id = user.to_string();
            headers.push(("x-user-id", id.as_str()));
        }
        self.request(Method::PATCH, path, Some(body), &headers).await
    }

    pub async fn put(&self, path: &str, user: Option<Uuid>) -> TestResponse {
        let mut headers = vec![];
        let id;
        if let Some(user) = user {
            id = user.to_string();
            headers.push(("x-user-id", id.as_str()));
        }
        self.request(Method::PUT, path, None, &headers).await
    }

    pub async fn delete(&self, path: &str, user: Option<Uuid>) -> TestResponse {
        let mut headers = vec![];
        let id;
        if let Some(user) = user {
            id = user.to_string();
            headers.push(("x-user-id", id.as_str()));
        }
        self.request(Method::DELETE, path, None, &headers).await
    }

    // ------------------------------------------------------------------
    // Test data helpers — direct inserts, bypassing the API
    // ------------------------------------------------------------------

    /// Insert an outstanding one-off bill due `days_from_today` from now.
    pub async fn insert_bill(
        &self,
        user_id: Uuid,
        label: &str,
        amount_cents: i64,
        days_from_today: i64,
    ) -> Uuid {
        self.insert_bill_full(
            user_id,
            label,
            amount_cents,
            today() + Duration::days(days_from_today),
            None,
            "outstanding",
        )
        .await
    }

    /// Insert a bill with an explicit due date, cadence, and status. Tests
    /// that assert on the date pass one they captured themselves.
    pub async fn insert_bill_full(
        &self,
        user_id: Uuid,
        label: &str,
        amount_cents: i64,
        due_date: Date,
        recurrence: Option<&str>,
        status: &str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO bills \
             (id, user_id, label, amount_cents, due_date, is_recurring, recurrence, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(label)
        .bind(amount_cents)
        .bind(due_date)
        .bind(recurrence.is_some())
        .bind(recurrence)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .execute(self.state.db.pool())
        .await
        .expect("insert test bill failed");
        id
    }

    /// Insert an outstanding debt with the given scheduled payment and
    /// remaining balance, due `days_from_today` from now.
    pub async fn insert_debt(
        &self,
        user_id: Uuid,
        label: &str,
        amount_cents: i64,
        balance_cents: i64,
        days_from_today: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let due_date = today() + Duration::days(days_from_today);
        sqlx::query(
            "INSERT INTO debts \
             (id, user_id, label, amount_cents, balance_cents, due_date, is_recurring, recurrence, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, NULL, 'outstanding', ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(label)
        .bind(amount_cents)
        .bind(balance_cents)
        .bind(due_date)
        .bind(OffsetDateTime::now_utc())
        .execute(self.state.db.pool())
        .await
        .expect("insert test debt failed");
        id
    }

    /// Insert a goal whose deadline is `days_from_today` from now.
    pub async fn insert_goal(
        &self,
        user_id: Uuid,
        label: &str,
        target_cents: i64,
        saved_cents: i64,
        days_from_today: i64,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let target_date = today() + Duration::days(days_from_today);
        let status = if saved_cents >= target_cents {
            "settled"
        } else {
            "outstanding"
        };
        sqlx::query(
            "INSERT INTO goals \
             (id, user_id, label, target_cents, saved_cents, target_date, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(label)
        .bind(target_cents)
        .bind(saved_cents)
        .bind(target_date)
        .bind(status)
        .bind(OffsetDateTime::now_utc())
        .execute(self.state.db.pool())
        .await
        .expect("insert test goal failed");
        id
    }

    /// Flip an entity row to settled directly, as if the surrounding app
    /// resolved it outside the notification flow.
    pub async fn settle_entity(&self, table: &str, id: Uuid) {
        let sql = format!("UPDATE {} SET status = 'settled' WHERE id = ?", table);
        sqlx::query(&sql)
            .bind(id)
            .execute(self.state.db.pool())
            .await
            .expect("settle entity failed");
    }
}
