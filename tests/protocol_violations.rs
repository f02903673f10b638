//! Integration tests for rejected logins and chat before login.

mod common;

use common::TestServer;
use relayd::config::LimitsConfig;

#[tokio::test]
async fn test_second_login_closes_connection() {
    let server = TestServer::spawn().await.unwrap();
    let mut bob = server.login("bob").await.unwrap();
    let mut alice = server.login("alice").await.unwrap();
    bob.expect("alice has logged on.").await.unwrap();

    alice.send_raw("#login mallory").await.unwrap();
    alice
        .expect("SERVER MSG> Error: Already logged in as alice.")
        .await
        .unwrap();
    alice.expect_closed().await.unwrap();

    assert!(
        server
            .wait_for_display("Client attempted to re-login. Closing connection.")
            .await
    );
    assert!(server.wait_for_display("Client alice has disconnected.").await);
    assert!(!server.transcript().contains("mallory has logged on."));
    bob.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_chat_before_login_closes_connection() {
    let server = TestServer::spawn().await.unwrap();
    let mut bob = server.login("bob").await.unwrap();
    let mut anon = server.connect().await.unwrap();

    anon.send_raw("let me in").await.unwrap();
    anon.expect("SERVER MSG> Error: Please log in before sending messages.")
        .await
        .unwrap();
    anon.expect_closed().await.unwrap();

    assert!(
        server
            .wait_for_display(
                "Unauthorized message attempt from a client without login ID. Closing connection."
            )
            .await
    );
    bob.expect_silence().await.unwrap();
    assert!(
        !server
            .transcript()
            .lines()
            .iter()
            .any(|line| line.contains("let me in"))
    );
}

#[tokio::test]
async fn test_empty_login_closes_connection() {
    let server = TestServer::spawn().await.unwrap();
    let mut anon = server.connect().await.unwrap();

    anon.send_raw("#login").await.unwrap();
    anon.expect("SERVER MSG> Error: No login ID specified.")
        .await
        .unwrap();
    anon.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_login_keyword_is_case_sensitive() {
    let server = TestServer::spawn().await.unwrap();
    let mut anon = server.connect().await.unwrap();

    // Not a handshake, so it is chat before login
    anon.send_raw("#LOGIN alice").await.unwrap();
    anon.expect("SERVER MSG> Error: Please log in before sending messages.")
        .await
        .unwrap();
    anon.expect_closed().await.unwrap();
}

#[tokio::test]
async fn test_unique_logins_rejects_held_id() {
    let server = TestServer::spawn_with(true, LimitsConfig::default())
        .await
        .unwrap();
    let alice = server.login("alice").await.unwrap();

    let mut imposter = server.connect().await.unwrap();
    imposter.send_raw("#login alice").await.unwrap();
    imposter
        .expect("SERVER MSG> Error: Login ID alice is already in use.")
        .await
        .unwrap();
    imposter.expect_closed().await.unwrap();

    // Released once the holder leaves
    drop(alice);
    assert!(server.wait_for_display("Client alice has disconnected.").await);
    let _alice_again = server.login("alice").await.unwrap();
}

#[tokio::test]
async fn test_overlong_line_closes_connection() {
    let limits = LimitsConfig {
        max_line_len: 128,
        ..LimitsConfig::default()
    };
    let server = TestServer::spawn_with(false, limits).await.unwrap();
    let mut alice = server.login("alice").await.unwrap();

    alice.send_raw(&"x".repeat(1024)).await.unwrap();
    alice.expect_closed().await.unwrap();
    assert!(server.wait_for_display("Client alice has disconnected.").await);
}
