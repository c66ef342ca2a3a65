use std::sync::Arc;
use std::time::Duration;

use jm_wallet_client::http::{
    ClientError, CreateWalletRequest, DirectSendRequest, Envelope, GetInfoResponse, ReqwestTransport, RequestLogger,
    UnlockWalletRequest, WalletRpcClient, WalletType, operations,
};
use reqwest::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> WalletRpcClient {
    let base_url = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
    WalletRpcClient::new(base_url).unwrap()
}

fn resolved_message(err: &ClientError) -> &str {
    match err {
        ClientError::Resolved(resolved) => resolved.message(),
        other => panic!("expected a resolved error, got {other:?}"),
    }
}

fn direct_send_body() -> serde_json::Value {
    json!({
        "txinfo": {
            "hex": "02000000000101",
            "txid": "d1f2",
            "inputs": [],
            "outputs": [{ "value_sats": 50000, "scriptPubKey": "0014ab", "address": "bcrt1qtest" }],
            "nLockTime": 0,
            "nVersion": 2
        }
    })
}

#[tokio::test]
async fn test_get_info_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/getinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.9.11" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let info = client.get_info(None).await.unwrap();

    assert_eq!(info.version, "0.9.11");
    assert!(client.is_online().await);
}

#[tokio::test]
async fn test_server_error_is_resolved_with_json_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/wallet/all"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "wallet service crashed" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.list_wallets(None).await.unwrap_err();

    assert_eq!(resolved_message(&err), "Failed to load wallets: wallet service crashed");
    assert_eq!(err.response().unwrap().status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!err.is_cancelled());
}

#[tokio::test]
async fn test_html_error_page_title_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/session"))
        .respond_with(
            ResponseTemplate::new(502)
                .insert_header("Content-Type", "text/html")
                .set_body_string("<html><head><title>Bad Gateway</title></head><body>nginx</body></html>"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.session(None).await.unwrap_err();

    assert_eq!(
        resolved_message(&err),
        "Failed to load the session: The server reported a problem: Bad Gateway"
    );
}

#[tokio::test]
async fn test_unparsable_error_body_falls_back_to_status_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/getinfo"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Traceback (most recent call last): ..."))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_info(None).await.unwrap_err();

    assert_eq!(resolved_message(&err), "Failed to load the server info: Internal Server Error");
    assert!(!client.is_online().await);
}

#[tokio::test]
async fn test_success_without_body_is_a_contract_violation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/wallet/all"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.list_wallets(None).await.unwrap_err();

    assert!(matches!(err, ClientError::ContractViolation { operation: "listwallets" }));
}

#[tokio::test]
async fn test_create_wallet_normalizes_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wallet/create"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "walletname": "alice.jmdat",
            "password": "hunter2",
            "wallettype": "sw-fb"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "walletname": "alice.jmdat",
            "token": "tok-1",
            "seedphrase": "abandon abandon about"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created = client
        .create_wallet(
            CreateWalletRequest {
                walletname: "alice".to_string(),
                password: "hunter2".to_string(),
                wallettype: WalletType::SegWitFidelityBonds,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(created.walletname, "alice.jmdat");
    assert_eq!(created.token, "tok-1");
}

#[tokio::test]
async fn test_create_wallet_conflict_uses_status_specific_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wallet/create"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "Wallet file cannot be overwritten." })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .create_wallet(
            CreateWalletRequest {
                walletname: "alice.jmdat".to_string(),
                password: "pw".to_string(),
                wallettype: WalletType::SegWit,
            },
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(
        resolved_message(&err),
        "Wallet alice already exists: Wallet file cannot be overwritten."
    );
    assert_eq!(err.response().unwrap().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_direct_send_with_token_and_ejected_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wallet/bob.jmdat/taker/direct-send"))
        .and(header("Authorization", "Bearer tok-2"))
        .and(body_json(json!({ "mixdepth": 1, "amount_sats": 50000, "destination": "bcrt1qtest" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(direct_send_body()))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wallet/bob.jmdat/taker/direct-send"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials." })))
        .with_priority(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = DirectSendRequest {
        mixdepth: 1,
        amount_sats: 50_000,
        destination: "bcrt1qtest".to_string(),
    };

    let auth = client.authenticate("tok-2");
    let sent = client.direct_send("bob", request.clone(), None).await.unwrap();
    assert_eq!(sent.txinfo.txid, "d1f2");

    assert!(client.remove_middleware(auth));
    assert!(!client.remove_middleware(auth));

    let err = client.direct_send("bob.jmdat", request, None).await.unwrap_err();
    assert_eq!(
        resolved_message(&err),
        "Failed to send from wallet bob: Invalid credentials."
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].headers.get("Authorization").is_none());
}

#[tokio::test]
async fn test_direct_send_while_maker_running() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wallet/bob.jmdat/taker/direct-send"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "message": "Service cannot start." })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .direct_send(
            "bob",
            DirectSendRequest {
                mixdepth: 0,
                amount_sats: 1,
                destination: "bcrt1qtest".to_string(),
            },
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(
        resolved_message(&err),
        "Cannot send from wallet bob while a maker or coinjoin is running: Service cannot start."
    );
}

#[tokio::test]
async fn test_unlock_and_lock_use_wallet_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/wallet/carol.jmdat/unlock"))
        .and(body_json(json!({ "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "walletname": "carol.jmdat", "token": "tok-3" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/wallet/carol.jmdat/lock"))
        .and(header("Authorization", "Bearer tok-3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "walletname": "carol.jmdat", "already_locked": false })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let unlocked = client
        .unlock_wallet("carol", UnlockWalletRequest { password: "pw".to_string() }, None)
        .await
        .unwrap();

    let auth = client.authenticate(&unlocked.token);
    let locked = client.lock_wallet("carol", None).await.unwrap();
    client.remove_middleware(auth);

    assert_eq!(locked.walletname, "carol.jmdat");
    assert!(!locked.already_locked);
}

#[tokio::test]
async fn test_display_wallet() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/wallet/dave.jmdat/display"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "walletname": "dave.jmdat",
            "walletinfo": {
                "wallet_name": "JM wallet",
                "total_balance": "0.00050000",
                "accounts": [{ "account": "0", "account_balance": "0.00050000", "branches": [] }]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let display = client.display_wallet("dave", None).await.unwrap();

    assert_eq!(display.walletinfo.total_balance, "0.00050000");
    assert_eq!(display.walletinfo.accounts.len(), 1);
}

#[tokio::test]
async fn test_request_logger_does_not_change_outcomes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/getinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.9.11" })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/wallet/all"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&mock_server)
        .await;

    let plain = client_for(&mock_server);
    let logged = client_for(&mock_server).with_middleware(RequestLogger::new());

    assert_eq!(plain.get_info(None).await.unwrap(), logged.get_info(None).await.unwrap());

    let plain_err = plain.list_wallets(None).await.unwrap_err();
    let logged_err = logged.list_wallets(None).await.unwrap_err();
    assert_eq!(resolved_message(&plain_err), resolved_message(&logged_err));
    let (plain_res, logged_res) = (plain_err.response().unwrap(), logged_err.response().unwrap());
    assert_eq!(plain_res.status(), logged_res.status());
    assert_eq!(plain_res.body(), logged_res.body());
}

#[tokio::test]
async fn test_envelope_level_send() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/getinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.9.11" })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/getinfo"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let ok: Envelope<GetInfoResponse> = client.send(&operations::GET_INFO, &[], None, None).await.unwrap();
    assert_eq!(ok.data().unwrap().version, "0.9.11");
    assert!(ok.error().is_none());

    let failed: Envelope<GetInfoResponse> = client.send(&operations::GET_INFO, &[], None, None).await.unwrap();
    assert!(!failed.is_success());
    assert_eq!(failed.error().unwrap().message, "boom");
    assert_eq!(failed.response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cancellation_is_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/getinfo"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": false,
            "maker_running": false,
            "coinjoin_in_process": false,
            "wallet_name": "None"
        })))
        .mount(&mock_server)
        .await;

    let client = Arc::new(client_for(&mock_server));
    let token = CancellationToken::new();

    let slow = {
        let client = Arc::clone(&client);
        let token = token.clone();
        tokio::spawn(async move { client.get_info(Some(&token)).await })
    };

    let other_token = CancellationToken::new();
    let session = client.session(Some(&other_token)).await.unwrap();
    assert!(!session.session);

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let err = slow.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(err.response().is_none());
    assert!(!other_token.is_cancelled());
}

#[tokio::test]
async fn test_transport_failure_is_not_resolved() {
    let base_url = Url::parse("http://127.0.0.1:9/api/v1/").unwrap();
    let transport = ReqwestTransport::with_config(0, Duration::from_secs(2)).unwrap();
    let client = WalletRpcClient::with_transport(base_url, Arc::new(transport));

    let err = client.get_info(None).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
}
