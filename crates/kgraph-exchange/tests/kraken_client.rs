//! Kraken 커넥터 HTTP 통합 테스트 (mockito 서버 사용).

use chrono::{TimeZone, Utc};
use kgraph_core::Pair;
use kgraph_exchange::{ExchangeError, KrakenClient, KrakenClientConfig, OhlcSource};
use mockito::Matcher;

fn client_for(server: &mockito::ServerGuard) -> KrakenClient {
    let config = KrakenClientConfig::default().with_base_url(server.url());
    KrakenClient::new(config).expect("client")
}

#[tokio::test]
async fn test_fetch_ohlc_sends_pair_interval_and_since() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/0/public/OHLC")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("pair".into(), "XETHZUSD".into()),
            Matcher::UrlEncoded("interval".into(), "60".into()),
            Matcher::UrlEncoded("since".into(), "1688671200".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"error":[],"result":{"XETHZUSD":[
                [1688671200,"1863.15","1864.00","1862.50","1863.99","1863.48","12.3",45],
                [1688674800,"1863.99","1870.00","1860.00","1869.10","1865.00","8.1",30]
            ],"last":1688674800}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let pair = Pair::new("XETHZUSD").unwrap();
    let since = Utc.timestamp_opt(1688671200, 0).unwrap();

    let batch = client.fetch_ohlc(&pair, 60, Some(since)).await.unwrap();

    mock.assert_async().await;
    assert_eq!(batch.rows.len(), 2);
    assert_eq!(batch.last, Some(1688674800));
    assert_eq!(
        batch.rows[1].field("close").and_then(|v| v.as_str()),
        Some("1869.10")
    );
}

#[tokio::test]
async fn test_error_payload_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/0/public/OHLC")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"error":["EQuery:Unknown asset pair"]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_ohlc(&Pair::new("NOPE").unwrap(), 5, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::UnknownPair(_)));
}

#[tokio::test]
async fn test_http_failure_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/0/public/OHLC")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("service unavailable")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_ohlc(&Pair::default(), 5, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::HttpStatus { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_asset_pairs_sorted() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/0/public/AssetPairs")
        .with_status(200)
        .with_body(r#"{"error":[],"result":{"XXBTZUSD":{},"XETHZUSD":{},"ADAEUR":{}}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let pairs = client.asset_pairs().await.unwrap();
    assert_eq!(pairs, vec!["ADAEUR", "XETHZUSD", "XXBTZUSD"]);
}

#[tokio::test]
async fn test_result_key_differs_from_requested_pair() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/OHLC")
        .match_query(Matcher::UrlEncoded("pair".into(), "ETHUSD".into()))
        .with_status(200)
        .with_body(
            r#"{"error":[],"result":{"last":1688671200,"XETHZUSD":[
                [1688671200,"1863.15","1864.00","1862.50","1863.99","1863.48","12.3",45]
            ]}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let pair = Pair::new("ETHUSD").unwrap();

    let batch = client.fetch_ohlc(&pair, 60, None).await.unwrap();

    assert_eq!(batch.pair_key, "XETHZUSD");
    assert_eq!(batch.rows.len(), 1);
}
