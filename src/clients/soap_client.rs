use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ApiError;
use crate::service::event_service::ActivityTransport;

/// Production endpoint of the activity service.
pub const SERVICE_URL: &str = "https://omnc.outboundsoftware.com/api45/Service1.asmx";

// ASMX services publish operations under this namespace unless configured
// otherwise; the SOAPAction header is the namespace plus the operation name.
const TARGET_NS: &str = "http://tempuri.org/";

/// SOAP 1.1 transport over HTTP. One POST per operation, request envelopes
/// built here, response envelopes reduced to the JSON payload string carried
/// in the operation's result element.
#[derive(Debug, Clone)]
pub struct SoapClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SoapClient {
    /// Connects to the production endpoint.
    pub async fn connect() -> Result<Self, ApiError> {
        Self::connect_to(SERVICE_URL).await
    }

    /// Connects to an alternate endpoint. The WSDL document is fetched once
    /// up front so an unreachable or misconfigured service fails construction
    /// instead of surfacing on the first query.
    pub async fn connect_to(endpoint: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::new();
        let wsdl_url = format!("{}?WSDL", endpoint);
        let response = http
            .get(&wsdl_url)
            .send()
            .await
            .map_err(|e| ApiError::Connect(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ApiError::Connect(format!(
                "WSDL fetch from {} returned status {}",
                wsdl_url,
                response.status()
            )));
        }
        tracing::debug!("connected to activity service at {}", endpoint);
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    async fn invoke(&self, operation: &str, params: &[(&str, String)]) -> Result<String, ApiError> {
        tracing::debug!("invoking {} on {}", operation, self.endpoint);
        let envelope = build_envelope(operation, params);
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}{}\"", TARGET_NS, operation))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            if let Some(fault) = extract_fault(&body) {
                tracing::warn!("{} returned SOAP fault: {}", operation, fault);
                return Err(ApiError::Fault(fault));
            }
            tracing::warn!("{} returned status {}", operation, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        extract_result(&body, operation)
    }
}

#[async_trait]
impl ActivityTransport for SoapClient {
    async fn get_activity_information(&self, activity_id: i64) -> Result<String, ApiError> {
        self.invoke(
            "GetActivityInformationJSON",
            &[("ActivityID", activity_id.to_string())],
        )
        .await
    }

    async fn get_activities_by_view_group(&self, view_group_id: i64) -> Result<String, ApiError> {
        self.invoke(
            "GetAllActivitiesByViewGroupJSON",
            &[("ViewGroupID", view_group_id.to_string())],
        )
        .await
    }

    async fn get_activity_list(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<String, ApiError> {
        self.invoke(
            "GetActivityListJSON",
            &[
                ("StartDate", start_date.to_string()),
                ("EndDate", end_date.to_string()),
            ],
        )
        .await
    }

    async fn get_activity_list_all(&self, start_date: &str) -> Result<String, ApiError> {
        self.invoke(
            "GetActivityListAllJSON",
            &[("StartDate", start_date.to_string())],
        )
        .await
    }

    async fn get_view_group_list(&self) -> Result<String, ApiError> {
        self.invoke("GetViewGroupListJSON", &[]).await
    }
}

fn build_envelope(operation: &str, params: &[(&str, String)]) -> String {
    let mut body = String::new();
    for (name, value) in params {
        body.push_str(&format!(
            "<{name}>{value}</{name}>",
            name = name,
            value = quick_xml::escape::escape(value)
        ));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<soap:Body>"#,
            r#"<{operation} xmlns="{ns}">{body}</{operation}>"#,
            r#"</soap:Body>"#,
            r#"</soap:Envelope>"#
        ),
        operation = operation,
        ns = TARGET_NS,
        body = body
    )
}

/// Pulls the text of the `<{operation}Result>` element out of a response
/// envelope. Matches on local name, so namespace prefixes don't matter.
fn extract_result(body: &str, operation: &str) -> Result<String, ApiError> {
    let result_tag = format!("{}Result", operation);
    element_text(body, &result_tag)
        .map_err(|e| ApiError::Envelope(e.to_string()))?
        .ok_or_else(|| ApiError::Envelope(format!("missing {} element", result_tag)))
}

fn extract_fault(body: &str) -> Option<String> {
    element_text(body, "faultstring").ok().flatten()
}

fn element_text(xml: &str, local: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    let mut text: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == local.as_bytes() => {
                inside = true;
                text.get_or_insert_with(String::new);
            }
            Event::Empty(e) if e.local_name().as_ref() == local.as_bytes() => {
                // Self-closing element carries an empty value.
                text.get_or_insert_with(String::new);
                break;
            }
            Event::Text(t) if inside => {
                let chunk = t.unescape()?;
                text.get_or_insert_with(String::new).push_str(&chunk);
            }
            Event::CData(t) if inside => {
                text.get_or_insert_with(String::new)
                    .push_str(&String::from_utf8_lossy(&t));
            }
            Event::End(e) if e.local_name().as_ref() == local.as_bytes() => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}
