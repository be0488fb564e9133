//! End-to-end tests against a loopback WebSocket service

use kiwi::{ClientConfig, KiwiError, Point, ScreenClient, Status};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::Message;

/// How the loopback service answers one request
enum Reply {
    /// Send these messages back, in order
    Send(Vec<Message>),
    /// Keep the connection open and never answer
    Silent,
    /// Drop the connection without answering
    Hangup,
}

/// Accept `connections` clients in turn and answer each request with
/// `handler(connection_index, request)`.
fn serve<F>(connections: usize, mut handler: F) -> (ClientConfig, JoinHandle<Vec<Value>>)
where
    F: FnMut(usize, &Value) -> Reply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();

    let handle = thread::spawn(move || {
        let mut received = Vec::new();
        for index in 0..connections {
            let (stream, _) = listener.accept().expect("accept");
            let mut socket = match tungstenite::accept(stream) {
                Ok(socket) => socket,
                Err(_) => panic!("server handshake failed"),
            };

            loop {
                let text = match socket.read() {
                    Ok(Message::Text(text)) => text.to_string(),
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };
                let request: Value = serde_json::from_str(&text).expect("request is JSON");
                let reply = handler(index, &request);
                received.push(request);
                match reply {
                    Reply::Send(messages) => {
                        if messages.into_iter().any(|message| socket.send(message).is_err()) {
                            break;
                        }
                    }
                    Reply::Silent => {}
                    Reply::Hangup => break,
                }
            }
        }
        received
    });

    let config = ClientConfig::default()
        .with_port(port)
        .with_connect_timeout(Duration::from_secs(5))
        .with_read_timeout(Duration::from_secs(5));
    (config, handle)
}

fn envelope(data: Value) -> String {
    json!({"status": "success", "message": "operation successful", "data": data}).to_string()
}

fn ok(data: Value) -> Reply {
    Reply::Send(vec![Message::text(envelope(data))])
}

#[test]
fn test_mouse_location_over_websocket() {
    let (config, server) = serve(1, |_, request| match request["method"].as_str() {
        Some("get_mouse_location") => ok(json!({"x": 10, "y": 20})),
        _ => ok(Value::Null),
    });

    let mut client = ScreenClient::new(config).expect("connect");
    let response = client
        .get_mouse_location()
        .expect("exchange")
        .expect("envelope");
    client.click_left().expect("exchange");
    client.close();

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.data, Some(Point::new(10, 20)));

    let received = server.join().expect("server thread");
    assert_eq!(
        received,
        vec![
            json!({"method": "get_mouse_location", "args": {}}),
            json!({"method": "click_left", "args": {}}),
        ]
    );
}

#[test]
fn test_dropped_connection_is_retried_once() {
    let (config, server) = serve(2, |index, _| {
        if index == 0 {
            Reply::Hangup
        } else {
            ok(Value::Null)
        }
    });

    let mut client = ScreenClient::connect_with(config);
    let response = client.move_absolute(Point::new(3, 4)).expect("retried exchange");
    client.close();

    assert!(response.is_some());
    let received = server.join().expect("server thread");
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], received[1]);
    assert_eq!(received[0]["args"], json!({"absolute_point": {"x": 3, "y": 4}}));
}

#[test]
fn test_invalid_reply_keeps_connection() {
    let (config, server) = serve(1, |_, request| match request["method"].as_str() {
        Some("health_check") => ok(json!({"health": "ok"})),
        _ => Reply::Send(vec![Message::text("unsupported message type")]),
    });

    let mut client = ScreenClient::new(config).expect("connect");
    assert!(client.input_text("abc").expect("exchange").is_none());
    assert!(client.health_check().expect("exchange"));
    client.close();

    assert_eq!(server.join().expect("server thread").len(), 2);
}

#[test]
fn test_refused_connection_is_an_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.local_addr().expect("local addr").port()
    };

    let result = ScreenClient::new(ClientConfig::default().with_port(port));
    assert!(matches!(result, Err(KiwiError::ConnectionError(_))));
}

#[test]
fn test_binary_reply_is_accepted() {
    let (config, server) = serve(1, |_, _| {
        Reply::Send(vec![Message::binary(envelope(json!({"x": 1, "y": 2})).into_bytes())])
    });

    let mut client = ScreenClient::new(config).expect("connect");
    let response = client
        .get_mouse_location()
        .expect("exchange")
        .expect("envelope");
    client.close();

    assert_eq!(response.data, Some(Point::new(1, 2)));
    assert_eq!(server.join().expect("server thread").len(), 1);
}

#[test]
fn test_ping_and_pong_before_reply_are_skipped() {
    let (config, server) = serve(1, |_, _| {
        Reply::Send(vec![
            Message::Ping(b"keepalive".to_vec()),
            Message::Pong(Vec::new()),
            Message::text(envelope(json!("hello"))),
        ])
    });

    let mut client = ScreenClient::new(config).expect("connect");
    let response = client
        .recognize_text(Point::new(0, 0), Point::new(10, 10))
        .expect("exchange")
        .expect("envelope");
    client.close();

    assert_eq!(response.data.as_deref(), Some("hello"));
    assert_eq!(server.join().expect("server thread").len(), 1);
}

#[test]
fn test_close_frame_is_retried_then_reported() {
    let (config, server) = serve(2, |_, _| Reply::Send(vec![Message::Close(None)]));

    let mut client = ScreenClient::connect_with(config);
    let err = client.click_right().unwrap_err();
    client.close();

    assert!(
        matches!(&err, KiwiError::TransportError(msg) if msg == "Connection closed by server")
    );
    assert!(!client.is_connected());
    let received = server.join().expect("server thread");
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], received[1]);
}

#[test]
fn test_silent_service_times_out_after_one_retry() {
    let (config, server) = serve(2, |_, _| Reply::Silent);
    let config = config.with_read_timeout(Duration::from_millis(200));

    let mut client = ScreenClient::connect_with(config);
    let err = client.press_left().unwrap_err();
    client.close();

    assert!(
        matches!(&err, KiwiError::TransportError(msg) if msg == "Timed out waiting for reply")
    );
    let received = server.join().expect("server thread");
    assert_eq!(received.len(), 2);
    assert_eq!(received[0], json!({"method": "press_left", "args": {}}));
}
