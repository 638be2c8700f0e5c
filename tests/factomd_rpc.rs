//! factomd client tests
//!
//! Every call goes through the real HTTP client against a local responder
//! that plays factomd.

mod common;

use common::{client, rpc_error, FakeNode};
use factom_client::core::chain_exists;
use factom_client::network::factomd;
use factom_client::FactomError;
use serde_json::{json, Value};

#[test]
fn test_admin_block_fixture_decodes_in_order() {
    let fixture: Value =
        serde_json::from_str(include_str!("fixtures/ablock.json")).unwrap();
    let node = FakeNode::start(move |method, _| {
        assert_eq!(method, "ablock-by-height");
        (200, fixture.clone())
    });
    let client = client(&node.server(), "127.0.0.1:1", None);

    let ablock = factomd::ablock_by_height(&client, 10).unwrap();
    let types: Vec<u8> = ablock.entries.iter().map(|e| e.admin_id_type()).collect();
    assert_eq!(types, vec![1, 0, 2, 3, 4, 5, 6, 7, 8, 9, 13, 14]);
    assert_eq!(ablock.header.db_height, 10);
    assert_eq!(ablock.header.message_count, 12);
}

#[test]
fn test_unknown_admin_id_reaches_caller() {
    let node = FakeNode::start(|_, _| {
        (
            200,
            json!({"ablock": {
                "header": {"prevbackrefhash": "00", "dbheight": 1, "messagecount": 1, "bodysize": 2},
                "abentries": [{"adminidtype": 15}]
            }}),
        )
    });
    let client = client(&node.server(), "127.0.0.1:1", None);
    assert_eq!(
        factomd::admin_block(&client, "ab").unwrap_err(),
        FactomError::UnknownAdminId(15)
    );
}

#[test]
fn test_chain_exists_states() {
    let node = FakeNode::start(|_, params| match params["chainid"].as_str() {
        Some("aa") => (200, json!({"chainhead": "ff", "chaininprocesslist": false})),
        Some("bb") => (200, json!({"chainhead": "", "chaininprocesslist": true})),
        _ => (
            400,
            rpc_error(-32009, "Missing Chain Head", None),
        ),
    });
    let client = client(&node.server(), "127.0.0.1:1", None);

    assert_eq!(chain_exists(&client, "aa"), Ok(true));
    assert_eq!(chain_exists(&client, "bb"), Err(FactomError::ChainPending));
    assert_eq!(chain_exists(&client, "cc"), Ok(false));
}

#[test]
fn test_rpc_error_propagates_unchanged() {
    let node = FakeNode::start(|_, _| {
        (
            400,
            rpc_error(-32602, "Invalid params", Some("Receipt creation error")),
        )
    });
    let client = client(&node.server(), "127.0.0.1:1", None);

    let err = factomd::receipt(&client, "00").unwrap_err();
    assert_eq!(
        err,
        FactomError::Rpc {
            code: -32602,
            message: "Invalid params".to_string(),
            data: Some("Receipt creation error".to_string()),
        }
    );
    assert_eq!(err.to_string(), "Invalid params: Receipt creation error");
}

#[test]
fn test_non_envelope_failure_is_transport() {
    let node = FakeNode::start(|_, _| (500, json!("boom")));
    let client = client(&node.server(), "127.0.0.1:1", None);
    assert!(matches!(
        factomd::heights(&client).unwrap_err(),
        FactomError::Transport(_)
    ));
}

#[test]
fn test_walletd_unauthorized_is_relabelled() {
    let node = FakeNode::start(|_, _| (401, json!({})));
    let client = client("127.0.0.1:1", &node.server(), None);
    assert_eq!(
        factom_client::network::walletd::properties(&client).unwrap_err(),
        FactomError::WalletCredentials
    );
}

#[test]
fn test_anchors_accept_false() {
    let node = FakeNode::start(|_, _| {
        (
            200,
            json!({
                "directoryblockheight": 200000,
                "directoryblockkeymr": "ab",
                "bitcoin": false,
                "ethereum": false
            }),
        )
    });
    let client = client(&node.server(), "127.0.0.1:1", None);
    let anchors = factomd::anchors_by_height(&client, 200000).unwrap();
    assert!(anchors.bitcoin.is_none());
    assert!(anchors.ethereum.is_none());
}

#[test]
fn test_request_ids_increase_across_calls() {
    let node = FakeNode::start(|_, _| (200, json!({"rate": 1000})));
    let client = client(&node.server(), "127.0.0.1:1", None);
    for _ in 0..3 {
        assert_eq!(factomd::entry_credit_rate(&client).unwrap(), 1000);
    }
    let ids: Vec<u64> = node
        .seen
        .lock()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|w| w[1] > w[0]));
}
