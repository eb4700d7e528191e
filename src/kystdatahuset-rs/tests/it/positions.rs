use chrono::Duration;
use futures::StreamExt;
use kystdata_core::{BoundingBox, DateRange, Mmsi};
use kystdatahuset_rs::{EmptyResultPolicy, Error, FetchOptions};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{header, method, path},
};

use crate::helper::*;

fn range() -> DateRange {
    DateRange::new(utc(2019, 1, 1), utc(2019, 1, 15)).unwrap()
}

fn mmsi() -> Mmsi {
    Mmsi::test_new(258500000)
}

#[tokio::test]
async fn test_long_range_is_fetched_in_ordered_windows() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;

    Mock::given(method("POST"))
        .and(path(POSITIONS_PATH))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "msg": "", "data": [] })),
        )
        .expect(3)
        .mount(&helper.mock_server)
        .await;

    let batches = client
        .positions(mmsi(), range(), FetchOptions::default())
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.as_ref().unwrap().positions.is_empty()));

    let bodies = helper.request_bodies(POSITIONS_PATH).await;
    let bounds = bodies
        .iter()
        .map(|b| {
            assert_eq!(b["MmsiIds"], json!([258500000]));
            assert!(b.get("MinSpeed").is_none());
            (
                b["Start"].as_str().unwrap().to_string(),
                b["End"].as_str().unwrap().to_string(),
            )
        })
        .collect::<Vec<_>>();

    assert_eq!(
        bounds,
        vec![
            ("201901010000".to_string(), "201901070000".to_string()),
            ("201901070000".to_string(), "201901130000".to_string()),
            ("201901130000".to_string(), "201901150000".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_malformed_rows_are_skipped_and_counted() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(
            POSITIONS_PATH,
            json!({
                "success": true,
                "msg": "",
                "data": [
                    position_row(258500000, "2019-01-02T00:00:02", 15.1),
                    [258500000, "2019-01-02T00:00:04", 21.7],
                    position_row(258500000, "2019-01-02T00:00:06", 1.2),
                ]
            }),
        )
        .await;

    let range = DateRange::new(utc(2019, 1, 1), utc(2019, 1, 3)).unwrap();
    let batches = client
        .positions(mmsi(), range, FetchOptions::default())
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    assert_eq!(batches.len(), 1);
    let batch = batches.into_iter().next().unwrap().unwrap();
    assert_eq!(batch.positions.len(), 2);
    assert_eq!(batch.skipped, 1);
    assert!(!batch.empty);
    assert!(batch.positions[0].timestamp < batch.positions[1].timestamp);
}

#[tokio::test]
async fn test_provider_failure_ends_stream_with_window_error() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(POSITIONS_PATH, json!({ "success": false, "msg": "bad token" }))
        .await;

    let batches = client
        .positions(mmsi(), range(), FetchOptions::default())
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    assert_eq!(batches.len(), 1);
    let err = batches.into_iter().next().unwrap().unwrap_err();
    assert_eq!(err.window().start, utc(2019, 1, 1));
    assert_eq!(err.window().end, utc(2019, 1, 7));
    assert!(matches!(err.error(), Error::Provider { msg, .. } if msg == "bad token"));

    assert_eq!(helper.request_bodies(POSITIONS_PATH).await.len(), 1);
}

#[tokio::test]
async fn test_provider_timeout_is_retryable() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(
            POSITIONS_PATH,
            json!({ "success": false, "msg": "The operation has timed out.", "data": null }),
        )
        .await;

    let batches = client
        .positions(mmsi(), range(), FetchOptions::default())
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    let err = batches.into_iter().next().unwrap().unwrap_err();
    assert!(matches!(err.error(), Error::ProviderTimeout { .. }));
    assert!(err.error().is_retryable());
}

#[tokio::test]
async fn test_null_data_is_skipped_by_default() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(POSITIONS_PATH, json!({ "success": true, "msg": "", "data": null }))
        .await;

    let batches = client
        .positions(mmsi(), range(), FetchOptions::default())
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    assert_eq!(batches.len(), 3);
    for batch in batches {
        let batch = batch.unwrap();
        assert!(batch.empty);
        assert!(batch.positions.is_empty());
    }
}

#[tokio::test]
async fn test_null_data_aborts_when_configured() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(POSITIONS_PATH, json!({ "success": true, "msg": "", "data": null }))
        .await;

    let options = FetchOptions {
        empty_result_policy: EmptyResultPolicy::Abort,
        ..Default::default()
    };
    let batches = client
        .positions(mmsi(), range(), options)
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    assert_eq!(batches.len(), 1);
    let err = batches.into_iter().next().unwrap().unwrap_err();
    assert!(err.error().is_empty_result());
}

#[tokio::test]
async fn test_cancelled_fetch_sends_no_requests() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(POSITIONS_PATH, json!({ "success": true, "msg": "", "data": [] }))
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let options = FetchOptions {
        cancellation: Some(token),
        ..Default::default()
    };
    let batches = client
        .positions(mmsi(), range(), options)
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    assert!(batches.is_empty());
    assert!(helper.request_bodies(POSITIONS_PATH).await.is_empty());
}

#[tokio::test]
async fn test_cancellation_between_windows_stops_the_fetch() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(POSITIONS_PATH, json!({ "success": true, "msg": "", "data": [] }))
        .await;

    let token = CancellationToken::new();
    let options = FetchOptions {
        cancellation: Some(token.clone()),
        ..Default::default()
    };
    let mut stream = Box::pin(client.positions(mmsi(), range(), options).unwrap());

    assert!(stream.next().await.unwrap().is_ok());
    token.cancel();
    assert!(stream.next().await.is_none());

    assert_eq!(helper.request_bodies(POSITIONS_PATH).await.len(), 1);
}

#[tokio::test]
async fn test_cancellation_discards_in_flight_window() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;

    let delay = std::time::Duration::from_secs(3);
    Mock::given(method("POST"))
        .and(path(POSITIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "msg": "",
                    "data": [position_row(258500000, "2019-01-02T00:00:02", 15.1)]
                }))
                .set_delay(delay),
        )
        .mount(&helper.mock_server)
        .await;

    let token = CancellationToken::new();
    let options = FetchOptions {
        cancellation: Some(token.clone()),
        ..Default::default()
    };

    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let batches: Vec<_> = client
        .positions(mmsi(), range(), options)
        .unwrap()
        .collect()
        .await;

    assert!(batches.is_empty());
    assert!(started.elapsed() < delay);
    assert_eq!(helper.request_bodies(POSITIONS_PATH).await.len(), 1);
}

#[tokio::test]
async fn test_positions_require_session() {
    let helper = TestHelper::new().await;
    let client = helper.client();

    let err = client
        .positions(mmsi(), range(), FetchOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, Error::NotAuthenticated { .. }));
}

#[tokio::test]
async fn test_non_positive_window_is_rejected() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;

    let options = FetchOptions {
        max_window: Duration::zero(),
        ..Default::default()
    };
    let err = client.positions(mmsi(), range(), options).err().unwrap();
    assert!(matches!(err, Error::InvalidWindow { .. }));
}

#[tokio::test]
async fn test_area_query_sends_bbox_and_min_speed() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(
            BBOX_PATH,
            json!({
                "success": true,
                "msg": "",
                "data": [
                    position_row(258500000, "2019-01-02T00:00:02", 15.1),
                    position_row(257000000, "2019-01-02T00:00:03", 8.0),
                ]
            }),
        )
        .await;

    let bbox = BoundingBox::new(5.0, 59.0, 6.5, 60.5).unwrap();
    let range = DateRange::new(utc(2019, 1, 1), utc(2019, 1, 2)).unwrap();
    let options = FetchOptions {
        min_speed: Some(2.0),
        ..Default::default()
    };

    let batches = client
        .positions_in_area(bbox, range, options)
        .unwrap()
        .collect::<Vec<_>>()
        .await;

    let batch = batches.into_iter().next().unwrap().unwrap();
    assert_eq!(batch.positions.len(), 2);

    let bodies = helper.request_bodies(BBOX_PATH).await;
    assert_eq!(
        bodies,
        vec![json!({
            "Bbox": "5,59,6.5,60.5",
            "Start": "201901010000",
            "End": "201901020000",
            "MinSpeed": 2.0
        })]
    );
}
