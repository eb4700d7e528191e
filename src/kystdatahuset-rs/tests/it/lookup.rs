use kystdata_core::Mmsi;
use kystdatahuset_rs::Error;
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

use crate::helper::*;

#[tokio::test]
async fn test_lookup_returns_first_match() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;

    Mock::given(method("POST"))
        .and(path(SHIP_PATH))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(body_json(json!({ "MmsiIds": [258500000] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "msg": "",
            "data": [
                {
                    "shipname": "KONG HARALD",
                    "flagcode": "NOR",
                    "imono": 9039119,
                    "callsign": "LGBG",
                    "shiptypegroupnor": "Passasjerskip"
                },
                { "shipname": "SECOND MATCH" }
            ]
        })))
        .expect(1)
        .mount(&helper.mock_server)
        .await;

    let ship = client
        .lookup(Mmsi::test_new(258500000))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(ship.name().as_deref(), Some("KONG HARALD"));
    assert_eq!(ship.flag_code().as_deref(), Some("NOR"));
    assert_eq!(ship.imo().as_deref(), Some("9039119"));
    assert_eq!(ship.call_sign().as_deref(), Some("LGBG"));
}

#[tokio::test]
async fn test_lookup_of_unknown_vessel_is_none() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(SHIP_PATH, json!({ "success": true, "msg": "", "data": [] }))
        .await;

    let ship = client.lookup(Mmsi::test_new(258500000)).await.unwrap();
    assert!(ship.is_none());
}

#[tokio::test]
async fn test_lookup_provider_failure_is_error() {
    let helper = TestHelper::new().await;
    let client = helper.logged_in_client().await;
    helper
        .mock_envelope(SHIP_PATH, json!({ "success": false, "msg": "bad token" }))
        .await;

    let err = client.lookup(Mmsi::test_new(258500000)).await.unwrap_err();
    assert_eq!(err.provider_message(), Some("bad token"));
}

#[tokio::test]
async fn test_lookup_requires_session() {
    let helper = TestHelper::new().await;
    let client = helper.client();

    let err = client.lookup(Mmsi::test_new(258500000)).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated { .. }));
}
