//! Client behaviour against a scripted in-memory transport.

use reporter_cli::decode::{Account, TokenInfo, VendorRegions};
use reporter_cli::transport::SERVICE_REQUEST_ID;
use reporter_cli::{
    CredentialStore, Credentials, Error, RawResponse, Reply, ReportingClient, Result, Service,
    Transport,
};
use reqwest::StatusCode;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;

/// A request as the transport saw it.
#[derive(Debug, Clone)]
struct Sent {
    endpoint: String,
    form: Vec<(String, String)>,
}

impl Sent {
    fn json(&self) -> Value {
        let (_, json) = self
            .form
            .iter()
            .find(|(k, _)| k == "jsonRequest")
            .expect("jsonRequest field");
        serde_json::from_str(json).expect("valid json")
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

enum Scripted {
    Respond(RawResponse),
    Fail(&'static str),
}

#[derive(Default)]
struct MockTransport {
    script: RefCell<VecDeque<Scripted>>,
    sent: RefCell<Vec<Sent>>,
}

impl MockTransport {
    fn respond(self, res: RawResponse) -> Self {
        self.script.borrow_mut().push_back(Scripted::Respond(res));
        self
    }

    fn ok(self, body: &str) -> Self {
        self.respond(RawResponse::ok(body))
    }

    fn fail(self, message: &'static str) -> Self {
        self.script.borrow_mut().push_back(Scripted::Fail(message));
        self
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<RawResponse> {
        self.sent.borrow_mut().push(Sent {
            endpoint: endpoint.to_string(),
            form: form.to_vec(),
        });
        match self.script.borrow_mut().pop_front() {
            Some(Scripted::Respond(res)) => Ok(res),
            Some(Scripted::Fail(message)) => Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message,
            ))),
            None => panic!("unexpected request to {endpoint}"),
        }
    }
}

const TRANSPORT_FAILURE: &str = "IO error: connection refused";

fn credentials() -> Credentials {
    let mut creds = Credentials::new("me@example.com", "app-password").with_token("tok-1");
    creds.sales_endpoint = Some("http://mock/sales".into());
    creds.finance_endpoint = Some("http://mock/finance".into());
    creds
}

fn client(transport: &MockTransport) -> ReportingClient<&MockTransport> {
    ReportingClient::new(transport, CredentialStore::in_memory(credentials()))
}

fn error_body(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Error><Code>{code}</Code><Message>{message}</Message></Error>"#
    )
}

#[test]
fn test_non_200_becomes_api_error() {
    let transport = MockTransport::default().respond(RawResponse::new(
        StatusCode::UNAUTHORIZED,
        error_body("117", "Invalid Access Token"),
    ));
    let err = client(&transport).try_get_status(Service::Sales).unwrap_err();

    match &err {
        Error::Api { code, message } => {
            assert_eq!(code, "117");
            assert_eq!(message, "Invalid Access Token");
        }
        other => panic!("unexpected error: {other}"),
    }
    let text = err.to_string();
    assert!(text.contains("117"));
    assert!(text.contains("Invalid Access Token"));
}

#[test]
fn test_malformed_error_body_propagates_parse_failure() {
    let transport = MockTransport::default().respond(RawResponse::new(
        StatusCode::BAD_GATEWAY,
        "<html><body>Bad Gateway",
    ));
    let err = client(&transport).try_get_status(Service::Sales).unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
}

#[test]
fn test_generate_token_two_step_handshake() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "email: me@example.com\npassword: app-password\nmode: Robot.XML\ntoken: old-token\nsales_endpoint: http://mock/sales\n",
    )
    .unwrap();

    let transport = MockTransport::default()
        .respond(
            RawResponse::ok("<ViewToken><Message>Request accepted</Message></ViewToken>")
                .with_header(SERVICE_REQUEST_ID, "req-42"),
        )
        .ok("<ViewToken><AccessToken>new-token</AccessToken><ExpirationDate>2027-04-16</ExpirationDate></ViewToken>");

    let store = CredentialStore::load(&path).unwrap();
    let mut client = ReportingClient::new(&transport, store);
    let reply = client.generate_token();

    assert_eq!(
        reply,
        Reply::Data(TokenInfo {
            access_token: "new-token".into(),
            expiration_date: "2027-04-16".into(),
        })
    );
    let rendered: Value = serde_json::to_value(&reply).unwrap();
    assert_eq!(rendered["access_token"], "new-token");
    assert_eq!(rendered["expiration_date"], "2027-04-16");

    assert_eq!(client.store().token(), Some("new-token"));
    let reloaded = CredentialStore::load(&path).unwrap();
    assert_eq!(reloaded.token(), Some("new-token"));
    assert_eq!(reloaded.credentials().password, "app-password");

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].endpoint, "http://mock/sales");
    assert_eq!(sent[0].field("requestId"), None);
    assert_eq!(sent[0].json()["password"], "app-password");
    assert_eq!(sent[1].field("isExistingToken"), Some("Y"));
    assert_eq!(sent[1].field("requestId"), Some("req-42"));
    assert_eq!(
        sent[1].json()["queryInput"],
        "[p=Reporter.properties, Sales.generateToken]"
    );
}

#[test]
fn test_generate_token_without_request_id_header() {
    let transport = MockTransport::default().ok("<ViewToken/>");
    let mut client = client(&transport);
    let reply = client.generate_token();
    assert_eq!(
        reply.text(),
        Some("Missing response header 'service_request_id'")
    );
    assert_eq!(client.store().token(), Some("tok-1"));
}

#[test]
fn test_get_accounts_preserves_order() {
    let transport = MockTransport::default().ok(
        "<Accounts>\
         <Account><Name>Alpha Ltd</Name><Number>1001</Number></Account>\
         <Account><Name>Beta Inc</Name><Number>1002</Number></Account>\
         </Accounts>",
    );
    let reply = client(&transport).get_accounts(Service::Sales);

    assert_eq!(
        reply,
        Reply::Data(vec![
            Account {
                name: "Alpha Ltd".into(),
                number: "1001".into()
            },
            Account {
                name: "Beta Inc".into(),
                number: "1002".into()
            },
        ])
    );
    let sent = transport.sent();
    assert_eq!(sent[0].endpoint, "http://mock/sales");
    assert_eq!(sent[0].json()["accesstoken"], "tok-1");
    assert_eq!(
        sent[0].json()["queryInput"],
        "[p=Reporter.properties, Sales.getAccounts]"
    );
}

#[test]
fn test_finance_service_uses_finance_endpoint() {
    let transport = MockTransport::default().ok("<Status><Code>0</Code><Message>OK</Message></Status>");
    let client = client(&transport);
    assert_eq!(client.endpoints().finance, "http://mock/finance");
    assert_eq!(client.endpoints().sales, "http://mock/sales");
    let status = client.get_status(Service::Finance).data().unwrap();
    assert_eq!(status.code, "0");
    assert_eq!(transport.sent()[0].endpoint, "http://mock/finance");
    assert_eq!(
        transport.sent()[0].json()["queryInput"],
        "[p=Reporter.properties, Finance.getStatus]"
    );
}

#[test]
fn test_get_vendors() {
    let transport =
        MockTransport::default().ok("<Vendors><Vendor>85000001</Vendor><Vendor>85000002</Vendor></Vendors>");
    let vendors = client(&transport).get_vendors("1001").data().unwrap();
    assert_eq!(vendors, ["85000001", "85000002"]);
    assert_eq!(transport.sent()[0].json()["account"], "1001");
}

#[test]
fn test_get_vendor_and_regions() {
    let transport = MockTransport::default().ok(
        "<VendorsAndRegions><Vendor><Number>80012345</Number>\
         <Region><Code>US</Code></Region>\
         <Region><Code>EU</Code></Region>\
         <Region><Code>AU</Code></Region>\
         </Vendor></VendorsAndRegions>",
    );
    let reply = client(&transport).get_vendor_and_regions("1001", "80012345");
    assert_eq!(
        reply,
        Reply::Data(VendorRegions {
            number: "80012345".into(),
            regions: vec!["US".into(), "EU".into(), "AU".into()],
        })
    );

    let sent = &transport.sent()[0];
    assert_eq!(sent.endpoint, "http://mock/finance");
    let json = sent.json();
    assert_eq!(
        json["queryInput"],
        "[p=Reporter.properties, Finance.getVendorsAndRegions]"
    );
    assert_eq!(json["account"], "1001");
    assert_eq!(json["vendor"], "80012345");
}

#[test]
fn test_report_version_command() {
    let transport = MockTransport::default()
        .ok("<Status><Code>0</Code><Message>The latest version is 1_2</Message></Status>");
    let reply = client(&transport).get_report_version("Sales", "Summary");
    assert_eq!(reply.data().unwrap().message, "The latest version is 1_2");
    assert_eq!(
        transport.sent()[0].json()["queryInput"],
        "[p=Reporter.properties, Sales.getReportVersion, Sales,Summary]"
    );
}

#[test]
fn test_lenient_operations_return_error_text() {
    let transport = MockTransport::default()
        .fail("connection refused")
        .fail("connection refused")
        .fail("connection refused")
        .fail("connection refused")
        .fail("connection refused")
        .fail("connection refused")
        .fail("connection refused")
        .fail("connection refused");
    let mut client = client(&transport);

    assert_eq!(client.generate_token(), Reply::Text(TRANSPORT_FAILURE.into()));
    assert_eq!(client.view_token(), Reply::Text(TRANSPORT_FAILURE.into()));
    assert_eq!(client.delete_token(), Reply::Text(TRANSPORT_FAILURE.into()));
    assert_eq!(
        client.get_accounts(Service::Finance),
        Reply::Text(TRANSPORT_FAILURE.into())
    );
    assert_eq!(client.get_vendors("1001"), Reply::Text(TRANSPORT_FAILURE.into()));
    assert_eq!(
        client.get_status(Service::Sales),
        Reply::Text(TRANSPORT_FAILURE.into())
    );
    assert_eq!(
        client.get_vendor_and_regions("1001", "80012345"),
        Reply::Text(TRANSPORT_FAILURE.into())
    );
    assert_eq!(
        client.get_report_version("Sales", "Summary"),
        Reply::Text(TRANSPORT_FAILURE.into())
    );
}

#[test]
fn test_lenient_operation_returns_api_error_text() {
    let transport = MockTransport::default().respond(RawResponse::new(
        StatusCode::BAD_REQUEST,
        error_body("213", "Invalid vendor number"),
    ));
    let reply = client(&transport).get_vendors("1001");
    assert_eq!(
        reply.text(),
        Some("Got error from reporter: 213, Invalid vendor number")
    );
}

#[test]
fn test_sales_report_returns_raw_response() {
    let transport = MockTransport::default().respond(
        RawResponse::ok(b"\x1f\x8bcompressed".to_vec())
            .with_header("filename", "S_D_85000001_20261017.txt.gz"),
    );
    let res = client(&transport)
        .get_sales_report("1001", "85000001", "Daily", "20261017")
        .unwrap();
    assert_eq!(res.filename().unwrap(), "S_D_85000001_20261017.txt.gz");
    assert_eq!(res.body, b"\x1f\x8bcompressed");

    let json = transport.sent()[0].json();
    assert_eq!(
        json["queryInput"],
        "[p=Reporter.properties, Sales.getReport, 85000001,Sales,Summary,Daily,20261017]"
    );
    assert_eq!(json["account"], "1001");
}

#[test]
fn test_sales_report_propagates_failures() {
    let transport = MockTransport::default().fail("connection refused");
    let err = client(&transport)
        .get_sales_report("1001", "85000001", "Daily", "20261017")
        .unwrap_err();
    assert_eq!(err.to_string(), TRANSPORT_FAILURE);

    let transport = MockTransport::default().respond(RawResponse::new(
        StatusCode::NOT_FOUND,
        error_body("210", "There are no reports available to download for this selection."),
    ));
    let err = client(&transport)
        .get_sales_report("1001", "85000001", "Daily", "20261017")
        .unwrap_err();
    assert!(err.is_api_error());
}

#[test]
fn test_comma_in_vendor_is_rejected_before_sending() {
    let transport = MockTransport::default();
    let err = client(&transport)
        .get_sales_report("1001", "8500,0001", "Daily", "20261017")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_report_downloads_return_body_text() {
    let transport = MockTransport::default()
        .ok("Provider\tSKU\nAPPLE\tcom.example.app\n")
        .ok("subscription rows")
        .ok("event rows")
        .ok("subscriber rows")
        .ok("newsstand rows")
        .ok("opt-in rows")
        .ok("pre-order rows");
    let client = client(&transport);

    assert_eq!(
        client.get_financial_report("1001", "80012345", "US", "2026", "6"),
        Reply::Data("Provider\tSKU\nAPPLE\tcom.example.app\n".to_string())
    );
    assert_eq!(
        client.get_subscription_report("85000001", "20261017", "1_3"),
        Reply::Data("subscription rows".to_string())
    );
    assert_eq!(
        client.get_subscription_event_report("85000001", "20261017", "1_3"),
        Reply::Data("event rows".to_string())
    );
    assert_eq!(
        client.get_subscriber_report("85000001", "20261017", "1_3"),
        Reply::Data("subscriber rows".to_string())
    );
    assert_eq!(
        client.get_newsstand_report("85000001", "Weekly", "20261011"),
        Reply::Data("newsstand rows".to_string())
    );
    assert_eq!(
        client.get_opt_in_report("85000001", "20261011"),
        Reply::Data("opt-in rows".to_string())
    );
    assert_eq!(
        client.get_pre_order_report("85000001", "Daily", "20261017"),
        Reply::Data("pre-order rows".to_string())
    );

    let commands: Vec<String> = transport
        .sent()
        .iter()
        .map(|s| s.json()["queryInput"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        commands,
        [
            "[p=Reporter.properties, Finance.getReport, 80012345,US,Financial,2026,6]",
            "[p=Reporter.properties, Sales.getReport, 85000001,Subscription,Summary,Daily,20261017,1_3]",
            "[p=Reporter.properties, Sales.getReport, 85000001,SubscriptionEvent,Summary,Daily,20261017,1_3]",
            "[p=Reporter.properties, Sales.getReport, 85000001,Subscriber,Detailed,Daily,20261017,1_3]",
            "[p=Reporter.properties, Sales.getReport, 85000001,Newsstand,Detailed,Weekly,20261011]",
            "[p=Reporter.properties, Sales.getReport, 85000001,Sales,Opt-In,Weekly,20261011]",
            "[p=Reporter.properties, Sales.getReport, 85000001,Pre-Order,Summary,Daily,20261017]",
        ]
    );
    assert_eq!(transport.sent()[0].endpoint, "http://mock/finance");
}

#[test]
fn test_report_download_failure_is_text() {
    let transport = MockTransport::default()
        .fail("connection refused")
        .fail("connection refused");
    let client = client(&transport);
    assert_eq!(
        client.get_opt_in_report("85000001", "20261011"),
        Reply::Text(TRANSPORT_FAILURE.into())
    );
    assert!(client
        .try_get_financial_report("1001", "80012345", "US", "2026", "6")
        .is_err());
}
