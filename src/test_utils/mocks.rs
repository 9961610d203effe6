//! Mock portal server and mock usage sources for testing.

use crate::error::{AcquisitionError, AcwdError, Stage};
use crate::model::{AcquisitionResult, UsageSource};
use crate::test_utils::fixtures::constants::{SESSION_ID, TOKEN};
use crate::test_utils::fixtures::payloads::{
    billing_body, landing_page, login_body, meters_body, usage_body,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Builder for a mockito server that answers like the portal.
pub struct MockPortalBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockPortalBuilder {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Landing page carrying the test token and session cookie.
    pub async fn mock_landing(mut self, expect: usize) -> Self {
        let mock = self
            .server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_header(
                "set-cookie",
                &format!("ASP.NET_SessionId={}; path=/; HttpOnly", SESSION_ID),
            )
            .with_body(landing_page(TOKEN))
            .expect(expect)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Landing page with an arbitrary body, for layout-change cases.
    pub async fn mock_raw_landing(mut self, body: &str) -> Self {
        let mock = self
            .server
            .mock("GET", "/")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    pub async fn mock_login(mut self, usernames: &[&str], expect: usize) -> Self {
        let mock = self
            .server
            .mock("POST", "/default.aspx/validateLogin")
            .match_header("csrftoken", TOKEN)
            .match_header("cookie", Matcher::Regex(SESSION_ID.to_string()))
            .with_status(200)
            .with_body(login_body(usernames))
            .expect(expect)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    pub async fn mock_meters(mut self, meters: &[(&str, bool)], expect: usize) -> Self {
        let mock = self
            .server
            .mock("POST", "/Usages.aspx/BindMultiMeter")
            .match_header("csrftoken", TOKEN)
            .with_status(200)
            .with_body(meters_body(meters))
            .expect(expect)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Hourly rows for the day whose request carries `label`.
    pub async fn mock_usage(mut self, label: &str, rows: &[(&str, f64)]) -> Self {
        let mock = self
            .server
            .mock("POST", "/Usages.aspx/LoadWaterUsage")
            .match_header("csrftoken", TOKEN)
            .match_body(Matcher::PartialJson(json!({ "strDate": label })))
            .with_status(200)
            .with_body(usage_body(label, rows))
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Arbitrary body for the day whose request carries `label`.
    pub async fn mock_usage_body(mut self, label: &str, body: String) -> Self {
        let mock = self
            .server
            .mock("POST", "/Usages.aspx/LoadWaterUsage")
            .match_body(Matcher::PartialJson(json!({ "strDate": label })))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    pub async fn mock_billing(mut self, due: &str, amount: Value) -> Self {
        let mock = self
            .server
            .mock("POST", "/BillDashboard.aspx/LoadBilling")
            .match_header("csrftoken", TOKEN)
            .with_status(200)
            .with_body(billing_body(due, amount))
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    pub async fn mock_logout(mut self, expect: usize) -> Self {
        let mock = self
            .server
            .mock("GET", "/signout.aspx")
            .with_status(200)
            .expect(expect)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    /// Asserts every registered mock was hit the expected number of times.
    pub async fn assert_all(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}

enum Behavior {
    Succeed(AcquisitionResult),
    Fail(Stage),
    Hang(Duration),
}

/// A usage source with a canned outcome that counts its calls.
pub struct MockUsageSource {
    behavior: Behavior,
    call_count: Arc<AtomicUsize>,
}

impl MockUsageSource {
    pub fn new_success(result: AcquisitionResult) -> Self {
        Self::with_behavior(Behavior::Succeed(result))
    }

    /// Fails at `stage` with a missing-meter error.
    pub fn new_failure(stage: Stage) -> Self {
        Self::with_behavior(Behavior::Fail(stage))
    }

    /// Never finishes within `delay`.
    pub fn new_slow(delay: Duration) -> Self {
        Self::with_behavior(Behavior::Hang(delay))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UsageSource for MockUsageSource {
    async fn acquire(&self, _today: NaiveDate) -> Result<AcquisitionResult, AcquisitionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(result) => Ok(result.clone()),
            Behavior::Fail(stage) => Err(AcquisitionError::new(*stage, AcwdError::NoMeter)),
            Behavior::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Err(AcquisitionError::new(
                    Stage::Meter,
                    AcwdError::protocol_shape("mock source woke up"),
                ))
            }
        }
    }
}
