use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

use crate::clients::soap_client::SoapClient;
use crate::error::ApiError;
use crate::models::activity::{
    self, ActivityRecord, DateRange, GroupRecord, MONTH_WINDOW_DAYS, WEEK_WINDOW_DAYS,
};

/// Capability over the remote activity service, one method per remote
/// operation. Each method returns the raw JSON payload string carried in the
/// operation's result field; decoding happens in [`EventServiceClient`].
///
/// Date parameters cross this seam already formatted as `YYYY-MM-DD`.
#[async_trait]
pub trait ActivityTransport: Send + Sync {
    async fn get_activity_information(&self, activity_id: i64) -> Result<String, ApiError>;

    async fn get_activities_by_view_group(&self, view_group_id: i64) -> Result<String, ApiError>;

    async fn get_activity_list(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<String, ApiError>;

    async fn get_activity_list_all(&self, start_date: &str) -> Result<String, ApiError>;

    async fn get_view_group_list(&self) -> Result<String, ApiError>;
}

/// Query façade over the activity service. Holds the transport and owns
/// date defaulting and payload decoding; every call is one outbound round
/// trip with no local state.
#[derive(Clone)]
pub struct EventServiceClient {
    transport: Arc<dyn ActivityTransport>,
}

impl EventServiceClient {
    /// Connects to the fixed production endpoint. Fails fast when the
    /// service is unreachable; there is no half-built client state.
    pub async fn connect() -> Result<Self, ApiError> {
        let transport = SoapClient::connect().await?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Builds a client over any transport, real or scripted.
    pub fn with_transport(transport: Arc<dyn ActivityTransport>) -> Self {
        Self { transport }
    }

    /// Events from today through 7 days from now.
    pub async fn by_week(&self) -> Result<Vec<ActivityRecord>, ApiError> {
        let today = activity::today();
        self.by_date_range(Some(today), Some(today + Duration::days(WEEK_WINDOW_DAYS)))
            .await
    }

    /// Events from today through 31 days from now.
    pub async fn by_month(&self) -> Result<Vec<ActivityRecord>, ApiError> {
        let today = activity::today();
        self.by_date_range(Some(today), Some(today + Duration::days(MONTH_WINDOW_DAYS)))
            .await
    }

    /// A single event by id. The service answers with an array; the first
    /// record is the event, and an empty array means the id is unknown.
    pub async fn by_id(&self, id: i64) -> Result<ActivityRecord, ApiError> {
        let payload = self.transport.get_activity_information(id).await?;
        let mut records = decode_records(&payload)?;
        if records.is_empty() {
            return Err(ApiError::NotFound(id));
        }
        Ok(records.remove(0))
    }

    /// Events belonging to a view group / category id.
    pub async fn by_group_id(&self, id: i64) -> Result<Vec<ActivityRecord>, ApiError> {
        let payload = self.transport.get_activities_by_view_group(id).await?;
        decode_records(&payload)
    }

    /// Events in a date window, for calendar / list views. Start defaults to
    /// today, end to 5 days out.
    pub async fn by_date_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ActivityRecord>, ApiError> {
        let (start, end) = DateRange { start, end }.resolve(activity::today());
        let payload = self
            .transport
            .get_activity_list(&activity::format_date(start), &activity::format_date(end))
            .await?;
        decode_records(&payload)
    }

    /// Every event from the start date onward. Defaults to today.
    pub async fn all_events(&self, start: Option<NaiveDate>) -> Result<Vec<ActivityRecord>, ApiError> {
        let start = start.unwrap_or_else(activity::today);
        let payload = self
            .transport
            .get_activity_list_all(&activity::format_date(start))
            .await?;
        decode_records(&payload)
    }

    /// All view group records, shape untouched.
    pub async fn event_groups(&self) -> Result<Vec<GroupRecord>, ApiError> {
        let payload = self.transport.get_view_group_list().await?;
        decode_records(&payload)
    }
}

fn decode_records(payload: &str) -> Result<Vec<ActivityRecord>, ApiError> {
    Ok(serde_json::from_str(payload)?)
}
