//! Tests for the InfluxDB HTTP sink against a local listener

use super::*;
use crate::app::services::influx_writer::InfluxDbSink;
use crate::config::InfluxDbConfig;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn create_test_config(server_url: String) -> InfluxDbConfig {
    InfluxDbConfig {
        server_url,
        token: "secret-token".to_string(),
        bucket: "fuel".to_string(),
        org: "home".to_string(),
        measurement: "fuel_prices".to_string(),
    }
}

fn response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// Read one request (headers and body) from the connection
async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8(data).unwrap()
}

/// Serve a single canned response and return the server URL and the request
async fn serve_once(canned: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(canned.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (url, handle)
}

async fn write_with_response(canned: String) -> (Result<()>, String) {
    let (url, server) = serve_once(canned).await;
    let sink = InfluxDbSink::new(&create_test_config(url), Duration::from_secs(10)).unwrap();
    let point = create_test_point(&[(FuelType::E5, price(1769))], 1643958907);

    let result = sink.write(&[point]).await;
    let request = server.await.unwrap();
    (result, request)
}

#[tokio::test]
async fn test_write_request_shape() {
    let (result, request) = write_with_response(response("204 No Content", "")).await;
    result.unwrap();

    let (head, body) = request.split_once("\r\n\r\n").unwrap();
    let mut lines = head.lines();
    assert_eq!(
        lines.next().unwrap(),
        "POST /api/v2/write?org=home&bucket=fuel&precision=s HTTP/1.1"
    );

    let headers: Vec<String> = lines.map(str::to_ascii_lowercase).collect();
    assert!(headers.contains(&"authorization: token secret-token".to_string()));
    assert!(headers.contains(&"content-type: text/plain; charset=utf-8".to_string()));

    assert_eq!(
        body,
        r"fuel_prices,Brand=Esso,City=Berlin,Street=Hauptstr.\ 1 E5=1.769 1643958907"
    );
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let body = r#"{"code":"unavailable","message":"service unavailable"}"#;
    let (result, _) = write_with_response(response("503 Service Unavailable", body)).await;

    let err = result.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("service unavailable"));
}

#[tokio::test]
async fn test_rate_limit_is_transient() {
    let (result, _) = write_with_response(response("429 Too Many Requests", "")).await;

    assert!(result.unwrap_err().is_transient());
}

#[tokio::test]
async fn test_bad_request_is_permanent_with_server_message() {
    let body = r#"{"code":"invalid","message":"unable to parse 'fuel_prices E5=': missing field value"}"#;
    let (result, _) = write_with_response(response("400 Bad Request", body)).await;

    let err = result.unwrap_err();
    assert!(!err.is_transient());
    assert!(matches!(err, Error::Sink { transient: false, .. }));
    let message = err.to_string();
    assert!(message.contains("400"));
    assert!(message.contains("unable to parse"));
    assert!(message.contains("(invalid)"));
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Bind and drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let sink = InfluxDbSink::new(&create_test_config(url), Duration::from_secs(5)).unwrap();
    let point = create_test_point(&[(FuelType::E5, price(1769))], 1643958907);

    assert!(sink.write(&[point]).await.unwrap_err().is_transient());
}

#[test]
fn test_write_url_trims_trailing_slash() {
    let config = create_test_config("http://localhost:8086/".to_string());
    let sink = InfluxDbSink::new(&config, Duration::from_secs(1)).unwrap();

    assert_eq!(sink.write_url(), "http://localhost:8086/api/v2/write");
}
