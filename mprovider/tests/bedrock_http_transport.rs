#![cfg(feature = "provider-bedrock")]

use std::sync::Arc;
use std::time::Duration;

use mprovider::adapters::bedrock::{BedrockHttpTransport, BedrockProvider};
use mprovider::{
    Message, ModelProvider, ModelRequest, ProviderErrorKind, RetryPolicy, SecureCredentialManager,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

struct Canned {
    status: u16,
    body: &'static str,
}

async fn serve(responses: Vec<Canned>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("listener should have address");

    let handle = tokio::spawn(async move {
        let mut request_lines = Vec::new();
        for canned in responses {
            let (mut stream, _) = listener.accept().await.expect("connection should arrive");
            request_lines.push(read_request_line(&mut stream).await);
            write_response(&mut stream, canned).await;
        }
        request_lines
    });

    (format!("http://{address}"), handle)
}

async fn read_request_line(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("read should succeed");
        assert!(read > 0, "connection closed before headers completed");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let length = head
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + length {
        let read = stream.read(&mut chunk).await.expect("read should succeed");
        assert!(read > 0, "connection closed before body completed");
        buffer.extend_from_slice(&chunk[..read]);
    }

    head.lines().next().unwrap_or_default().to_string()
}

async fn write_response(stream: &mut TcpStream, canned: Canned) {
    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        canned.status,
        canned.body.len(),
        canned.body
    );
    stream
        .write_all(response.as_bytes())
        .await
        .expect("write should succeed");
    stream.shutdown().await.expect("shutdown should succeed");
}

fn provider(endpoint: String) -> BedrockProvider {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client should build");
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_bedrock_api_key("bedrock-key")
        .expect("key should store");

    let transport = BedrockHttpTransport::new(client, "us-east-1").with_endpoint(endpoint);
    BedrockProvider::new(credentials, Arc::new(transport)).with_retry_policy(
        RetryPolicy::new(3).with_backoff(Duration::from_millis(1), Duration::from_millis(1)),
    )
}

#[tokio::test]
async fn undecodable_success_body_fails_without_resending() {
    let (endpoint, server) = serve(vec![Canned {
        status: 200,
        body: "{\"output\": not json",
    }])
    .await;

    let transcript = vec![Message::user_text("hello")];
    let error = provider(endpoint)
        .converse(ModelRequest::new("model-x", &transcript))
        .await
        .expect_err("malformed body should fail");

    assert_eq!(error.kind, ProviderErrorKind::InvalidResponse);
    assert!(!error.retryable);

    let request_lines = server.await.expect("server task should finish");
    assert_eq!(request_lines, vec!["POST /model/model-x/converse HTTP/1.1"]);
}

#[tokio::test]
async fn throttled_status_is_retried_until_success() {
    let (endpoint, server) = serve(vec![
        Canned {
            status: 429,
            body: "{\"message\":\"Too many requests, please wait before trying again.\"}",
        },
        Canned {
            status: 200,
            body: "{\"output\":{\"message\":{\"role\":\"assistant\",\"content\":[{\"text\":\"hi\"}]}},\"stopReason\":\"end_turn\",\"usage\":{\"inputTokens\":1,\"outputTokens\":1,\"totalTokens\":2}}",
        },
    ])
    .await;

    let transcript = vec![Message::user_text("hello")];
    let response = provider(endpoint)
        .converse(ModelRequest::new("model-x", &transcript))
        .await
        .expect("second attempt should succeed");
    assert_eq!(response.message.first_text(), Some("hi"));

    let request_lines = server.await.expect("server task should finish");
    assert_eq!(request_lines.len(), 2);
}
