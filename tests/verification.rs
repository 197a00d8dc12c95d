//! Verification dispatcher against a local mock of every explorer API.
//!
//! The mock serves each explorer under its own path prefix and answers by
//! transaction id:
//! - `confirmed`: a confirmed transaction
//! - `pending`: a known but unconfirmed transaction
//! - `garbage`: a non-JSON body
//! - `slow`: a confirmed transaction after two seconds
//! - `bsc-only`: confirmed on the BNB chain explorer only

use std::{collections::HashMap, net::SocketAddr, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use deposit_ledger_bot::{
    models::account::{Currency, UsdtNetwork},
    services::verification::{ExplorerEndpoints, ExplorerKeys, VerificationDispatcher},
};

const API_KEY: &str = "test-key";

type Params = Query<HashMap<String, String>>;

async fn answer(txid: &str, confirmed: Value, unconfirmed: Value) -> Response {
    match txid {
        "confirmed" => Json(confirmed).into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(confirmed).into_response()
        }
        "garbage" => "<html>rate limited</html>".into_response(),
        _ => Json(unconfirmed).into_response(),
    }
}

async fn blockcypher(Path(txid): Path<String>, Query(params): Params) -> Response {
    if params.get("token").map(String::as_str) != Some(API_KEY) {
        return Json(json!({"error": "invalid token"})).into_response();
    }
    answer(&txid, json!({"confirmations": 6}), json!({"confirmations": 0})).await
}

async fn etherscan_style(params: HashMap<String, String>, chain_only: &str) -> Response {
    if params.get("apikey").map(String::as_str) != Some(API_KEY)
        || params.get("action").map(String::as_str) != Some("gettxreceiptstatus")
    {
        return Json(json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}))
            .into_response();
    }
    let txid = params.get("txhash").cloned().unwrap_or_default();
    let confirmed = json!({"status": "1", "message": "OK", "result": {"status": "1"}});
    let failed = json!({"status": "1", "message": "OK", "result": {"status": "0"}});

    if txid == chain_only {
        return Json(confirmed).into_response();
    }
    answer(&txid, confirmed, failed).await
}

async fn etherscan(Query(params): Params) -> Response {
    etherscan_style(params, "").await
}

async fn bscscan(Query(params): Params) -> Response {
    etherscan_style(params, "bsc-only").await
}

async fn solana(Json(body): Json<Value>) -> Response {
    let txid = body["params"][0].as_str().unwrap_or_default().to_string();
    answer(
        &txid,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"slot": 1}}),
        json!({"jsonrpc": "2.0", "id": 1, "result": null}),
    )
    .await
}

async fn ripple(Path(txid): Path<String>) -> Response {
    answer(&txid, json!({"result": "success"}), json!({"result": "error"})).await
}

async fn tronscan(Query(params): Params) -> Response {
    let txid = params.get("hash").cloned().unwrap_or_default();
    answer(
        &txid,
        json!({"ret": [{"contractRet": "SUCCESS"}]}),
        json!({"ret": [{"contractRet": "REVERT"}]}),
    )
    .await
}

async fn toncenter(Query(params): Params) -> Response {
    if params.get("api_key").map(String::as_str) != Some(API_KEY) {
        return Json(json!({"ok": false, "result": null})).into_response();
    }
    let txid = params.get("hash").cloned().unwrap_or_default();
    answer(
        &txid,
        json!({"ok": true, "result": {"utime": 1}}),
        json!({"ok": true, "result": null}),
    )
    .await
}

async fn spawn_explorers() -> SocketAddr {
    let app = Router::new()
        .route("/blockcypher/v1/btc/main/txs/{txid}", get(blockcypher))
        .route("/eth/api", get(etherscan))
        .route("/bsc/api", get(bscscan))
        .route("/solana", post(solana))
        .route("/ripple/v2/transactions/{txid}", get(ripple))
        .route("/tron/api/transaction-info", get(tronscan))
        .route("/ton/api/v2/getTransaction", get(toncenter));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn endpoints(base: &str) -> ExplorerEndpoints {
    ExplorerEndpoints {
        blockcypher: format!("{base}/blockcypher"),
        etherscan: format!("{base}/eth"),
        bscscan: format!("{base}/bsc"),
        solana_rpc: format!("{base}/solana"),
        ripple_data: format!("{base}/ripple"),
        tronscan: format!("{base}/tron"),
        toncenter: format!("{base}/ton"),
    }
}

fn keys() -> ExplorerKeys {
    ExplorerKeys {
        etherscan: Some(API_KEY.into()),
        bscscan: Some(API_KEY.into()),
        blockcypher: Some(API_KEY.into()),
        toncenter: Some(API_KEY.into()),
    }
}

async fn dispatcher(timeout: Duration) -> VerificationDispatcher {
    let addr = spawn_explorers().await;
    VerificationDispatcher::new(keys(), endpoints(&format!("http://{addr}")), timeout).unwrap()
}

const ALL_ROUTES: [(Currency, Option<UsdtNetwork>); 10] = [
    (Currency::Btc, None),
    (Currency::Eth, None),
    (Currency::Bnb, None),
    (Currency::Sol, None),
    (Currency::Xrp, None),
    (Currency::Trx, None),
    (Currency::Ton, None),
    (Currency::Usdt, Some(UsdtNetwork::Bep20)),
    (Currency::Usdt, Some(UsdtNetwork::Trc20)),
    (Currency::Usdt, Some(UsdtNetwork::Ton)),
];

#[tokio::test]
async fn confirmed_transactions_verify_on_every_chain() {
    let dispatcher = dispatcher(Duration::from_secs(5)).await;

    for (currency, network) in ALL_ROUTES {
        assert!(
            dispatcher.verify("confirmed", currency, network).await,
            "{currency} {network:?} should verify"
        );
    }
}

#[tokio::test]
async fn unconfirmed_transactions_do_not_verify() {
    let dispatcher = dispatcher(Duration::from_secs(5)).await;

    for (currency, network) in ALL_ROUTES {
        assert!(
            !dispatcher.verify("pending", currency, network).await,
            "{currency} {network:?} should not verify"
        );
    }
}

#[tokio::test]
async fn malformed_responses_do_not_verify() {
    let dispatcher = dispatcher(Duration::from_secs(5)).await;

    for (currency, network) in ALL_ROUTES {
        assert!(!dispatcher.verify("garbage", currency, network).await);
    }
}

#[tokio::test]
async fn unreachable_explorers_do_not_verify() {
    // Nothing listens on the discard port
    let dispatcher = VerificationDispatcher::new(
        keys(),
        endpoints("http://127.0.0.1:9"),
        Duration::from_secs(2),
    )
    .unwrap();

    for (currency, network) in ALL_ROUTES {
        assert!(!dispatcher.verify("confirmed", currency, network).await);
    }
}

#[tokio::test]
async fn slow_explorers_time_out() {
    let dispatcher = dispatcher(Duration::from_millis(200)).await;

    assert!(!dispatcher.verify("slow", Currency::Xrp, None).await);
    assert!(dispatcher.verify("confirmed", Currency::Xrp, None).await);
}

#[tokio::test]
async fn missing_keys_do_not_verify_even_when_the_explorer_would() {
    let addr = spawn_explorers().await;
    let dispatcher = VerificationDispatcher::new(
        ExplorerKeys::default(),
        endpoints(&format!("http://{addr}")),
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(!dispatcher.verify("confirmed", Currency::Eth, None).await);
    assert!(!dispatcher.verify("confirmed", Currency::Btc, None).await);
    assert!(!dispatcher.verify("confirmed", Currency::Ton, None).await);
    // Keyless explorers still work
    assert!(dispatcher.verify("confirmed", Currency::Sol, None).await);
}

#[tokio::test]
async fn usdt_on_trc20_matches_a_direct_tron_check() {
    let dispatcher = dispatcher(Duration::from_secs(5)).await;

    for txid in ["confirmed", "pending", "garbage"] {
        assert_eq!(
            dispatcher.verify(txid, Currency::Usdt, Some(UsdtNetwork::Trc20)).await,
            dispatcher.verify(txid, Currency::Trx, None).await,
            "{txid}"
        );
    }
}

#[tokio::test]
async fn usdt_without_network_is_checked_on_ethereum() {
    let dispatcher = dispatcher(Duration::from_secs(5)).await;

    assert!(dispatcher.verify("bsc-only", Currency::Usdt, Some(UsdtNetwork::Bep20)).await);
    assert!(!dispatcher.verify("bsc-only", Currency::Usdt, None).await);
    assert!(!dispatcher.verify("bsc-only", Currency::Eth, None).await);
}
