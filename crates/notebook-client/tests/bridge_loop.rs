//! Integration test: boots an in-process WebSocket server that plays the
//! notebook side of the protocol, connects a real [`NotebookClient`] and
//! drives it through the blocking API.
//!
//! The server runs on a runtime owned by the test; the client brings its
//! own, exactly as a synchronous caller would use it.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio_tungstenite::tungstenite::Message as Frame;
use ze_notebook_client::results::{note_paragraph_result, paragraph_result};
use ze_notebook_client::{
    Bridge, BridgeOptions, ClientError, NotebookClient, NotebookClientBuilder, Op,
};

// ── Mini notebook server ────────────────────────────────────────────────

type Responder = fn(&Value) -> Vec<Value>;

struct MiniServer {
    addr: SocketAddr,
    _runtime: Runtime,
}

impl MiniServer {
    fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// Serve every connection: push `greeting` as raw text frames, then
/// either close or answer each inbound message with `respond`.
fn start_server(greeting: Vec<String>, respond: Responder, close_after_greeting: bool) -> MiniServer {
    let runtime = Runtime::new().unwrap();
    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();

    runtime.spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            let greeting = greeting.clone();
            tokio::spawn(async move {
                let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                let (mut sink, mut stream) = ws.split();

                for text in greeting {
                    if sink.send(Frame::Text(text)).await.is_err() {
                        return;
                    }
                }
                if close_after_greeting {
                    let _ = sink.close().await;
                    while stream.next().await.is_some() {}
                    return;
                }

                while let Some(Ok(frame)) = stream.next().await {
                    let Frame::Text(text) = frame else { continue };
                    let Ok(request) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    for reply in respond(&request) {
                        if sink.send(Frame::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    MiniServer {
        addr,
        _runtime: runtime,
    }
}

fn silent(_request: &Value) -> Vec<Value> {
    Vec::new()
}

fn notebook(request: &Value) -> Vec<Value> {
    if Op::GetNote.matches(request) {
        return vec![json!({
            "op": "NOTE",
            "data": {"note": {"id": request["data"]["id"], "paragraphs": [
                {"id": "p0", "result": {"code": "SUCCESS", "type": "TEXT", "msg": "ok"}}
            ]}}
        })];
    }
    if Op::RunParagraph.matches(request) {
        let id = request["data"]["id"].clone();
        let paragraph = |status: &str| {
            json!({"op": "PARAGRAPH", "data": {"paragraph": {"id": id, "status": status,
                "result": {"code": "SUCCESS", "type": "TEXT", "msg": "11\n"}}}})
        };
        return vec![
            json!({"op": "PROGRESS", "data": {"id": id, "progress": 0}}),
            paragraph("RUNNING"),
            paragraph("FINISHED"),
        ];
    }
    Vec::new()
}

fn connect(server: &MiniServer, queue_capacity: usize) -> NotebookClient<Bridge> {
    NotebookClientBuilder::new()
        .endpoint(server.url())
        .queue_capacity(queue_capacity)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn wait_until(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

// ── Request/response ────────────────────────────────────────────────────

#[test]
fn get_note_roundtrip() {
    let server = start_server(Vec::new(), notebook, false);
    let client = connect(&server, 10);

    let note = client.get_note("2C78F5XN6").unwrap();
    assert!(Op::Note.matches(&note));
    assert_eq!(note["data"]["note"]["id"], "2C78F5XN6");
    assert_eq!(note_paragraph_result(&note, 0).unwrap(), "ok");
}

#[test]
fn run_paragraph_waits_for_finished() {
    let server = start_server(Vec::new(), notebook, false);
    let client = connect(&server, 10);

    let frame = client
        .run_paragraph("2C78F5XN6", "20170202-032801_1404276097", "%sh\necho 11")
        .unwrap();
    assert_eq!(frame["data"]["paragraph"]["status"], "FINISHED");
    assert_eq!(paragraph_result(&frame).unwrap(), "11\n");
}

#[test]
fn run_paragraph_with_deadline_times_out_on_silent_server() {
    let server = start_server(Vec::new(), silent, false);
    let client = connect(&server, 10);

    let err = client
        .run_paragraph_with_deadline("n", "p", "code", Duration::from_millis(100))
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)));
}

#[test]
fn receive_timeout_returns_none_when_idle() {
    let server = start_server(Vec::new(), silent, false);
    let client = connect(&server, 10);

    let got = client.receive_timeout(Duration::from_millis(100)).unwrap();
    assert!(got.is_none());
}

#[test]
fn non_json_frames_are_skipped() {
    let server = start_server(
        vec!["not json".into(), r#"{"op":"NOTES_INFO","data":{}}"#.into()],
        silent,
        false,
    );
    let client = connect(&server, 10);

    let frame = client.receive().unwrap();
    assert!(Op::NotesInfo.matches(&frame));
}

// ── Backpressure ────────────────────────────────────────────────────────

#[test]
fn full_queue_holds_frames_in_order() {
    let greeting = (0..3).map(|n| json!({"op": "PROGRESS", "n": n}).to_string()).collect();
    let server = start_server(greeting, silent, false);
    let client = connect(&server, 1);

    assert!(wait_until(Duration::from_secs(5), || client.transport().pending() == 1));
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(client.transport().pending(), 1);

    for n in 0..3 {
        let frame = client.receive_timeout(Duration::from_secs(5)).unwrap().unwrap();
        assert_eq!(frame["n"], n);
    }
}

// ── Close ───────────────────────────────────────────────────────────────

#[test]
fn close_completes_handshake() {
    let server = start_server(Vec::new(), silent, false);
    let client = connect(&server, 10);

    assert!(!client.await_closed(Some(Duration::ZERO)));
    client.close();
    assert!(client.await_closed(Some(Duration::from_secs(5))));
    assert!(client.transport().is_closed());

    // Second close is a no-op; sending afterwards fails.
    client.close();
    let msg = client.list_notes_request();
    assert!(matches!(client.send(&msg), Err(ClientError::Closed)));
}

#[test]
fn close_releases_blocked_receiver() {
    let server = start_server(Vec::new(), silent, false);
    let client = std::sync::Arc::new(connect(&server, 10));

    let reader = std::thread::spawn({
        let client = std::sync::Arc::clone(&client);
        move || client.receive()
    });
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(client.transport().pending(), 0);

    let closer = std::thread::spawn({
        let client = std::sync::Arc::clone(&client);
        move || client.close()
    });
    assert!(wait_until(Duration::from_secs(3), || closer.is_finished()));
    assert!(wait_until(Duration::from_secs(3), || reader.is_finished()));
    assert!(matches!(reader.join().unwrap(), Err(ClientError::Closed)));
    assert!(client.await_closed(Some(Duration::from_secs(5))));
}

#[test]
fn close_interrupts_unbounded_run_paragraph() {
    let server = start_server(Vec::new(), silent, false);
    let client = std::sync::Arc::new(connect(&server, 10));

    let runner = std::thread::spawn({
        let client = std::sync::Arc::clone(&client);
        move || client.run_paragraph("n", "p", "%sh\nsleep 1000")
    });
    std::thread::sleep(Duration::from_millis(100));
    client.close();

    assert!(wait_until(Duration::from_secs(3), || runner.is_finished()));
    assert!(matches!(runner.join().unwrap(), Err(ClientError::Closed)));
    assert!(client.await_closed(Some(Duration::from_secs(5))));
}

#[test]
fn close_discards_buffered_frames() {
    let greeting = (0..3).map(|n| json!({"n": n}).to_string()).collect();
    let server = start_server(greeting, silent, false);
    let client = connect(&server, 10);

    assert!(wait_until(Duration::from_secs(5), || client.transport().pending() == 3));
    client.close();
    assert_eq!(client.transport().pending(), 0);
    assert!(client.await_closed(Some(Duration::from_secs(5))));
    assert!(matches!(client.receive(), Err(ClientError::Closed)));
}

#[test]
fn server_close_fires_signal() {
    let server = start_server(Vec::new(), silent, true);
    let client = connect(&server, 10);

    assert!(client.await_closed(Some(Duration::from_secs(5))));
}

#[test]
fn buffered_frames_survive_server_close() {
    let server = start_server(vec![r#"{"op":"NOTE"}"#.into()], silent, true);
    let client = connect(&server, 10);

    assert!(client.await_closed(Some(Duration::from_secs(5))));
    assert!(Op::Note.matches(&client.receive().unwrap()));
    assert!(matches!(client.receive(), Err(ClientError::Closed)));
}

// ── Connection failures ─────────────────────────────────────────────────

#[test]
fn connect_refused_is_connection_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = Bridge::connect(
        &format!("ws://{addr}/ws"),
        BridgeOptions {
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, ClientError::Connection(_)));
}

#[test]
fn open_uses_given_limits() {
    let server = start_server(vec![r#"{"op":"NOTE"}"#.into()], silent, false);
    let bridge = Bridge::open(&server.url(), 99_999, 10).unwrap();
    assert_eq!(bridge.endpoint(), server.url());
    assert!(Op::Note.matches(&bridge.receive().unwrap()));
}
