//! Integration tests for the server operator console.

mod common;

use common::{TestClient, TestServer};
use relayd::handlers::Flow;

#[tokio::test]
async fn test_stop_keeps_existing_connections() {
    let server = TestServer::spawn().await.unwrap();
    let addr = server.addr();
    let mut alice = server.login("alice").await.unwrap();

    server.command("#stop").await;
    assert!(server.transcript().contains("Server has stopped listening for connections."));
    assert!(!server.relay().runtime().is_listening());
    assert!(TestClient::connect(addr).await.is_err());

    // Established sessions keep relaying
    alice.send_raw("still here").await.unwrap();
    alice.expect("alice> still here").await.unwrap();

    server.command("#start").await;
    assert!(server.relay().runtime().is_listening());
    let _bob = server.login("bob").await.unwrap();
    alice.expect("bob has logged on.").await.unwrap();
}

#[tokio::test]
async fn test_setport_requires_stopped_server() {
    let server = TestServer::spawn().await.unwrap();

    server.command("#setport 9999").await;
    assert!(
        server
            .transcript()
            .contains("Error: Cannot set a new port while the server is listening.")
    );
    assert_eq!(server.relay().runtime().port(), 0);

    server.command("#stop").await;
    server.command("#setport 9999").await;
    assert!(server.transcript().contains("Port is now: 9999"));
    server.command("#getport").await;
    assert!(server.transcript().contains("Current port: 9999"));
}

#[tokio::test]
async fn test_close_disconnects_everyone() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.login("alice").await.unwrap();
    let mut lurker = server.connect().await.unwrap();
    assert!(server.wait_for_display("A new client has connected to the server.").await);

    server.command("#close").await;

    alice.expect_closed().await.unwrap();
    lurker.expect_closed().await.unwrap();
    assert!(server.relay().registry().is_empty());
    assert!(!server.relay().runtime().is_listening());
    assert!(
        server
            .transcript()
            .contains("Server closed and all clients disconnected.")
    );
    assert_eq!(server.control().gateway().active_connections(), 0);
}

#[tokio::test]
async fn test_quit_shuts_down() {
    let server = TestServer::spawn().await.unwrap();
    let mut alice = server.login("alice").await.unwrap();

    assert_eq!(server.command("#quit").await, Flow::Quit);
    alice.expect_closed().await.unwrap();
    assert!(server.shutdown().is_cancelled());
    assert!(server.transcript().contains("Server quit gracefully"));
}

#[tokio::test]
async fn test_command_errors_do_not_change_state() {
    let server = TestServer::spawn().await.unwrap();

    server.command("#start").await;
    server.command("#setport").await;
    server.command("#stop now").await;
    server.command("#Quit").await;

    let transcript = server.transcript();
    assert!(transcript.contains("Error: Server is already listening."));
    assert!(transcript.contains("Error: No port specified."));
    assert!(transcript.contains("Error: Command not recognized: #stop now"));
    assert!(transcript.contains("Error: Command not recognized: #Quit"));
    assert!(server.relay().runtime().is_listening());
    assert!(!server.shutdown().is_cancelled());
}
