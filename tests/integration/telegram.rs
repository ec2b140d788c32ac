//! Integration tests for Telegram delivery against a mocked Bot API.

use std::sync::Arc;

use pocket_signals::error::TransportError;
use pocket_signals::models::{IndicatorReading, Settings, Signal, SignalDirection, Trend};
use pocket_signals::services::{
    MessageTransport, NotificationDispatcher, NotifyOutcome, TelegramTransport,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:TEST";

async fn mock_api(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ResponseTemplate::new(status).set_body_string("{\"ok\":false}"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn send_posts_html_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_string_contains("chat_id=-100123"))
        .and(body_string_contains("parse_mode=HTML"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = TelegramTransport::with_base_url(server.uri(), Some(TOKEN.to_string()));
    transport
        .send("-100123", "<b>hello</b>")
        .await
        .expect("delivery succeeds");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = mock_api(500).await;
    let transport = TelegramTransport::with_base_url(server.uri(), Some(TOKEN.to_string()));

    let err = transport.send("-100123", "hi").await.unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("ok"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_token_never_calls_api() {
    let server = MockServer::start().await;
    let transport = TelegramTransport::with_base_url(server.uri(), None);

    let err = transport.send("-100123", "hi").await.unwrap_err();
    assert!(matches!(err, TransportError::MissingCredentials));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_trimmed() {
    let server = mock_api(200).await;
    let transport =
        TelegramTransport::with_base_url(format!("{}/", server.uri()), Some(TOKEN.to_string()));
    assert!(transport.send("-1", "hi").await.is_ok());
}

#[tokio::test]
async fn dispatcher_reports_sent_and_failed() {
    let signal = Signal::new(
        IndicatorReading::new("EURUSD-OTC", 25.0, 12.0, 15.0).with_emas(1.15, 1.14),
        SignalDirection::Call,
        Trend::Bullish,
        82,
        chrono::Duration::seconds(30),
    );
    let settings = Settings::default().with_notification_target("-100123");

    let ok_server = mock_api(200).await;
    let dispatcher = NotificationDispatcher::new(Arc::new(TelegramTransport::with_base_url(
        ok_server.uri(),
        Some(TOKEN.to_string()),
    )));
    assert_eq!(
        dispatcher.notify(&signal, &settings, 80.0).await,
        NotifyOutcome::Sent
    );

    let requests = ok_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("EURUSD-OTC"));

    let failing_server = mock_api(403).await;
    let dispatcher = NotificationDispatcher::new(Arc::new(TelegramTransport::with_base_url(
        failing_server.uri(),
        Some(TOKEN.to_string()),
    )));
    assert_eq!(
        dispatcher.notify(&signal, &settings, 80.0).await,
        NotifyOutcome::Failed
    );
}

#[tokio::test]
async fn network_errors_do_not_expose_token() {
    // Nothing listens on the discard port.
    let transport = TelegramTransport::with_base_url(
        "http://127.0.0.1:9",
        Some("SECRET123:TOKEN".to_string()),
    );

    let err = transport.send("-100123", "hi").await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
    let text = err.to_string();
    assert!(!text.contains("SECRET123"), "token leaked: {text}");
}
