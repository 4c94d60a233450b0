use std::sync::Arc;

use outboundApi::clients::soap_client::SoapClient;
use outboundApi::error::ApiError;
use outboundApi::service::event_service::{ActivityTransport, EventServiceClient};
use serde_json::json;
use warp::http::StatusCode;
use warp::Filter;

const NS: &str = "http://tempuri.org/";

fn soap_body(operation: &str, payload: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soap:Body>",
            r#"<{op}Response xmlns="http://tempuri.org/">"#,
            "<{op}Result>{payload}</{op}Result>",
            "</{op}Response>",
            "</soap:Body>",
            "</soap:Envelope>"
        ),
        op = operation,
        payload = quick_xml::escape::escape(payload),
    )
}

fn operation_from_action(action: &str) -> String {
    action
        .trim_matches('"')
        .strip_prefix(NS)
        .unwrap_or(action)
        .to_string()
}

/// Stub ASMX endpoint: GET serves a WSDL placeholder for the connection
/// probe, POST dispatches on the SOAPAction header and answers with a canned
/// envelope per operation.
async fn spawn_stub() -> String {
    let soap = warp::post()
        .and(warp::header::<String>("soapaction"))
        .map(|action: String| {
            let op = operation_from_action(&action);
            let payload = match op.as_str() {
                "GetActivityInformationJSON" => {
                    r#"[{"ActivityID":7,"Name":"Lap Swim"},{"ActivityID":8,"Name":"Lap Swim Overflow"}]"#
                }
                "GetAllActivitiesByViewGroupJSON" => r#"[{"ActivityID":9,"ViewGroupID":3}]"#,
                "GetActivityListJSON" => r#"[{"Name":"Trips & Tours <Fall>"}]"#,
                "GetActivityListAllJSON" => "[]",
                "GetViewGroupListJSON" => r#"[{"ViewGroupID":1,"Name":"Aquatics"}]"#,
                _ => "[]",
            };
            warp::reply::with_header(
                soap_body(&op, payload),
                "Content-Type",
                "text/xml; charset=utf-8",
            )
        });
    let wsdl = warp::get().map(|| "<definitions/>");

    let (addr, server) = warp::serve(soap.or(wsdl)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{}/Service1.asmx", addr)
}

async fn spawn_faulting_stub() -> String {
    let soap = warp::post().map(|| {
        let body = concat!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soap:Body><soap:Fault>",
            "<faultcode>soap:Server</faultcode>",
            "<faultstring>Invalid ActivityID</faultstring>",
            "</soap:Fault></soap:Body>",
            "</soap:Envelope>"
        );
        warp::reply::with_status(
            warp::reply::with_header(body, "Content-Type", "text/xml; charset=utf-8"),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    });
    let wsdl = warp::get().map(|| "<definitions/>");

    let (addr, server) = warp::serve(soap.or(wsdl)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{}/Service1.asmx", addr)
}

#[tokio::test]
async fn activity_list_round_trips_escaped_payload() {
    let endpoint = spawn_stub().await;
    let soap = SoapClient::connect_to(&endpoint).await.unwrap();

    // Raw transport view: the result element is reduced to its JSON text.
    let raw = soap
        .get_activity_list("2026-02-10", "2026-02-15")
        .await
        .unwrap();
    assert_eq!(raw, r#"[{"Name":"Trips & Tours <Fall>"}]"#);

    let client = EventServiceClient::with_transport(Arc::new(soap));
    let records = client.by_date_range(None, None).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Name"], json!("Trips & Tours <Fall>"));
}

#[tokio::test]
async fn by_id_over_the_wire_returns_first_record() {
    let endpoint = spawn_stub().await;
    let soap = SoapClient::connect_to(&endpoint).await.unwrap();
    let client = EventServiceClient::with_transport(Arc::new(soap));

    let record = client.by_id(7).await.unwrap();

    assert_eq!(record["ActivityID"], json!(7));
    assert_eq!(record["Name"], json!("Lap Swim"));
}

#[tokio::test]
async fn event_groups_over_the_wire() {
    let endpoint = spawn_stub().await;
    let soap = SoapClient::connect_to(&endpoint).await.unwrap();
    let client = EventServiceClient::with_transport(Arc::new(soap));

    let groups = client.event_groups().await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["Name"], json!("Aquatics"));
}

#[tokio::test]
async fn soap_fault_surfaces_as_fault_error() {
    let endpoint = spawn_faulting_stub().await;
    let soap = SoapClient::connect_to(&endpoint).await.unwrap();
    let client = EventServiceClient::with_transport(Arc::new(soap));

    let err = client.by_id(999).await.unwrap_err();

    match err {
        ApiError::Fault(message) => assert_eq!(message, "Invalid ActivityID"),
        other => panic!("expected SOAP fault, got {:?}", other),
    }
}

#[tokio::test]
async fn connect_fails_fast_when_nothing_listens() {
    let err = SoapClient::connect_to("http://127.0.0.1:1/Service1.asmx")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Connect(_)));
}

#[tokio::test]
async fn connect_fails_fast_on_error_status() {
    let down = warp::any().map(|| {
        warp::reply::with_status("maintenance", StatusCode::SERVICE_UNAVAILABLE)
    });
    let (addr, server) = warp::serve(down).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);

    let err = SoapClient::connect_to(&format!("http://{}/Service1.asmx", addr))
        .await
        .unwrap_err();

    match err {
        ApiError::Connect(message) => assert!(message.contains("503")),
        other => panic!("expected connect failure, got {:?}", other),
    }
}
