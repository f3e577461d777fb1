mod common;

use chrono::{TimeZone, Utc};
use common::{capture_logs, credentials};
use hmac::{Hmac, Mac};
use rust_decimal_macros::dec;
use sha2::Sha512;
use tracing::Level;
use tradeledger::exchanges::bitbay::{BitbayBuilder, BitbayConnector};
use tradeledger::{ExchangeApi, ExchangeError, ExchangeId, HistoryQuery, Side, Symbol};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/rest/trading/history/transactions";

const THREE_ITEMS: &str = r#"{
    "status": "Ok",
    "totalRows": "3",
    "items": [
        {"id": "a1", "market": "BTC-PLN", "time": "1529154000000", "amount": "0.5", "rate": "25000",
         "initializedBy": "Sell", "wasTaker": true, "userAction": "Buy", "offerId": "o1", "commissionValue": "12.5"},
        {"id": "a2", "market": "ETH-PLN", "time": "1529154060000", "amount": "2", "rate": "1800.25",
         "initializedBy": "Buy", "wasTaker": false, "userAction": "Sell", "offerId": "o2", "commissionValue": "0"},
        {"id": "a3", "market": "LSK-BTC", "time": "1529154120000", "amount": "10", "rate": "0.0012",
         "initializedBy": "Buy", "wasTaker": true, "userAction": "Buy", "offerId": "o3"}
    ],
    "query": {"markets": [], "limit": ["300"]},
    "nextPageCursor": "start"
}"#;

fn connector(server: &MockServer) -> BitbayConnector {
    connector_with_keys(server, "public-key", "private-key")
}

fn connector_with_keys(server: &MockServer, public_key: &str, private_key: &str) -> BitbayConnector {
    BitbayBuilder::new(credentials(public_key, private_key))
        .with_base_url(server.uri())
        .with_rest_max_retries(0)
        .build()
        .unwrap()
}

async fn respond_with(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_success_maps_every_item_in_order() {
    let server = MockServer::start().await;
    respond_with(&server, 200, THREE_ITEMS).await;
    let (logs, _guard) = capture_logs();

    let transactions = connector(&server).transactions().await;

    let ids: Vec<&str> = transactions.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec!["a1", "a2", "a3"]);

    let first = &transactions[0];
    assert_eq!(first.exchange(), ExchangeId::Bitbay);
    assert_eq!(first.market(), &Symbol::new("BTC", "PLN").unwrap());
    assert_eq!(first.side(), Side::Buy);
    assert_eq!(first.amount().value(), dec!(0.5));
    assert_eq!(first.rate().value(), dec!(25000));
    assert_eq!(first.fee().map(|f| f.amount), Some(dec!(12.5)));
    assert_eq!(
        first.timestamp(),
        Utc.timestamp_millis_opt(1_529_154_000_000).unwrap()
    );
    assert_eq!(transactions[1].side(), Side::Sell);
    assert!(transactions[2].fee().is_none());
    assert!(logs.errors().is_empty());
}

#[tokio::test]
async fn test_unparseable_body_logs_raw_body_once() {
    let server = MockServer::start().await;
    respond_with(&server, 200, "<html>maintenance</html>").await;
    let (logs, _guard) = capture_logs();

    let transactions = connector(&server).transactions().await;

    assert!(transactions.is_empty());
    let errors = logs.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("<html>maintenance</html>"));
}

#[tokio::test]
async fn test_failure_envelope_logs_known_description() {
    let server = MockServer::start().await;
    respond_with(&server, 200, r#"{"status":"Fail","errors":["INVALID_HASH_SIGNATURE"]}"#).await;
    let (logs, _guard) = capture_logs();

    let transactions = connector(&server).transactions().await;

    assert!(transactions.is_empty());
    let errors = logs.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("INVALID_HASH_SIGNATURE"));
    assert!(errors[0].contains("API-Hash signature does not match the request"));
}

#[tokio::test]
async fn test_failure_envelope_with_unknown_code() {
    let server = MockServer::start().await;
    respond_with(&server, 200, r#"{"status":"Fail","errors":["SOME_NEW_CODE"]}"#).await;
    let (logs, _guard) = capture_logs();

    let connector = connector(&server);
    match connector.fetch_transactions().await {
        Err(ExchangeError::Business { exchange, errors }) => {
            assert_eq!(exchange, ExchangeId::Bitbay);
            assert_eq!(errors[0].code, "SOME_NEW_CODE");
            assert_eq!(errors[0].description, None);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(connector.transactions().await.is_empty());
    let errors = logs.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("SOME_NEW_CODE (unrecognized error code)"));
}

#[tokio::test]
async fn test_http_error_reports_status_and_body() {
    let server = MockServer::start().await;
    // Would decode as a failure envelope if it were parsed
    respond_with(&server, 401, r#"{"status":"Fail","errors":["INVALID_PUBLIC_KEY"]}"#).await;
    let (logs, _guard) = capture_logs();

    let connector = connector(&server);
    match connector.fetch_transactions().await {
        Err(ExchangeError::Transport { status, body, .. }) => {
            assert_eq!(status, Some(401));
            assert_eq!(
                body.as_deref(),
                Some(r#"{"status":"Fail","errors":["INVALID_PUBLIC_KEY"]}"#)
            );
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(connector.transactions().await.is_empty());
    let errors = logs.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("401"));
    assert!(errors[0].contains("INVALID_PUBLIC_KEY"));
}

#[tokio::test]
async fn test_empty_history_is_not_an_error() {
    let server = MockServer::start().await;
    respond_with(&server, 200, r#"{"status":"Ok","totalRows":"0","items":[]}"#).await;
    let (logs, _guard) = capture_logs();

    assert!(connector(&server).transactions().await.is_empty());
    assert!(logs.errors().is_empty());
}

#[tokio::test]
async fn test_missing_items_is_empty_history() {
    let server = MockServer::start().await;
    respond_with(&server, 200, r#"{"status":"Ok"}"#).await;

    let result = connector(&server).fetch_transactions().await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_request_carries_query_and_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("query", r#"{"markets":[],"limit":"300"}"#))
        .and(header("API-Key", "public-key"))
        .and(header("Content-Type", "application/json"))
        .and(header_exists("API-Hash"))
        .and(header_exists("operation-id"))
        .and(header_exists("Request-Timestamp"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"Ok","items":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let connector = connector(&server);
    assert!(!connector.is_transport_initialized());
    connector.fetch_transactions().await.unwrap();
    assert!(connector.is_transport_initialized());
}

#[tokio::test]
async fn test_history_query_is_sent_as_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param(
            "query",
            r#"{"markets":["BTC-PLN"],"fromTime":"1600000000000","limit":"50"}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"Ok","items":[]}"#))
        .expect(1)
        .mount(&server)
        .await;

    let query = HistoryQuery::default()
        .since(Utc.timestamp_millis_opt(1_600_000_000_000).unwrap())
        .with_market(Symbol::new("BTC", "PLN").unwrap())
        .with_limit(50);
    let connector = BitbayBuilder::new(credentials("public-key", "private-key"))
        .with_base_url(server.uri())
        .with_history_query(query)
        .build()
        .unwrap();

    connector.fetch_transactions().await.unwrap();
}

#[tokio::test]
async fn test_adapters_sign_with_their_own_keys() {
    let server = MockServer::start().await;
    respond_with(&server, 200, r#"{"status":"Ok","items":[]}"#).await;

    let alice = connector_with_keys(&server, "alice-public", "alice-private");
    let bob = connector_with_keys(&server, "bob-public", "bob-private");
    alice.fetch_transactions().await.unwrap();
    bob.fetch_transactions().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let mut hashes = Vec::new();
    for request in &requests {
        let header_value = |name: &str| {
            request
                .headers
                .get(name)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string()
        };
        let public_key = header_value("API-Key");
        let timestamp = header_value("Request-Timestamp");
        let private_key = match public_key.as_str() {
            "alice-public" => "alice-private",
            "bob-public" => "bob-private",
            other => panic!("unexpected key {}", other),
        };

        let mut mac = Hmac::<Sha512>::new_from_slice(private_key.as_bytes()).unwrap();
        mac.update(public_key.as_bytes());
        mac.update(timestamp.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        let hash = header_value("API-Hash");
        assert_eq!(hash, expected);
        hashes.push(hash);
    }
    assert_ne!(hashes[0], hashes[1]);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(3)
        .mount(&server)
        .await;

    let connector = BitbayBuilder::new(credentials("public-key", "private-key"))
        .with_base_url(server.uri())
        .with_rest_max_retries(2)
        .with_retry_base_delay(2)
        .build()
        .unwrap();

    let err = connector.fetch_transactions().await.unwrap_err();
    assert!(matches!(err, ExchangeError::Transport { status: Some(503), .. }));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let connector = BitbayBuilder::new(credentials("public-key", "private-key"))
        .with_base_url(server.uri())
        .with_rest_max_retries(3)
        .with_retry_base_delay(2)
        .build()
        .unwrap();

    let err = connector.fetch_transactions().await.unwrap_err();
    assert!(matches!(err, ExchangeError::Transport { status: Some(400), .. }));
}

#[tokio::test]
async fn test_unknown_side_is_decode_error() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        200,
        r#"{"status":"Ok","items":[{"id":"x","market":"BTC-PLN","time":"1529154000000",
            "amount":"1","rate":"1","userAction":"Hold"}]}"#,
    )
    .await;

    let err = connector(&server).fetch_transactions().await.unwrap_err();
    match err {
        ExchangeError::Decode { diagnostic, .. } => assert!(diagnostic.contains("Hold")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_partial_history_is_reported_as_warning() {
    let server = MockServer::start().await;
    let body = THREE_ITEMS.replace(r#""totalRows": "3""#, r#""totalRows": "750""#);
    respond_with(&server, 200, &body).await;
    let (logs, _guard) = capture_logs();

    let transactions = connector(&server).transactions().await;

    assert_eq!(transactions.len(), 3);
    let warnings = logs.at(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("partial history"));
    assert!(warnings[0].contains("total=750"));
    assert!(logs.errors().is_empty());
}

#[tokio::test]
async fn test_complete_history_has_no_warning() {
    let server = MockServer::start().await;
    respond_with(&server, 200, THREE_ITEMS).await;
    let (logs, _guard) = capture_logs();

    connector(&server).fetch_transactions().await.unwrap();
    assert!(logs.at(Level::WARN).is_empty());
}
