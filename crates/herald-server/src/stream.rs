//! `GET /events`: the server-sent event stream.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use futures::StreamExt;
use herald_hub::Notification;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::connection::ConnectionHandler;
use crate::errors::ApiError;
use crate::server::AppState;

/// Tells reverse proxies not to buffer the stream.
pub const X_ACCEL_BUFFERING: &str = "x-accel-buffering";

/// Encode a notification as one event. Each line of the message becomes its
/// own `data:` field.
pub fn frame(notification: &Notification) -> Event {
    let text = notification.message();
    if text.contains('\r') {
        Event::default().data(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Event::default().data(text)
    }
}

/// Register a client and stream its notifications until either side leaves.
pub async fn events_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let handler = ConnectionHandler::accept(&state.hub)
        .await
        .map_err(|_| ApiError::HubUnavailable)?;
    let client_id = handler.id().clone();
    info!(%client_id, "event stream opened");

    let (transport, body) = mpsc::channel::<Notification>(1);
    let _task = tokio::spawn(async move {
        match handler.run(transport).await {
            Ok(outcome) => debug!(%client_id, ?outcome, "event stream ended"),
            Err(error) => warn!(%client_id, %error, "event stream ended"),
        }
    });

    let stream = ReceiverStream::new(body).map(|notification| Ok::<_, Infallible>(frame(&notification)));
    Ok((
        [(
            HeaderName::from_static(X_ACCEL_BUFFERING),
            HeaderValue::from_static("no"),
        )],
        Sse::new(stream),
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, BodyDataStream};
    use axum::http::{Request, StatusCode, header};
    use herald_hub::{Hub, HubConfig, HubHandle};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tokio::time::timeout;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;
    use crate::server::HeraldServer;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn make_server() -> (HeraldServer, HubHandle) {
        let (hub, handle) = Hub::new(HubConfig::default());
        let metrics = PrometheusBuilder::new().build_recorder().handle();
        let server = HeraldServer::new(ServerConfig::default(), handle.clone(), metrics);
        let _task = tokio::spawn(hub.run(server.shutdown().token()));
        (server, handle)
    }

    async fn wait_for_clients(hub: &HubHandle, n: usize) {
        let mut watch = hub.watch_clients();
        let _ = timeout(TIMEOUT, watch.wait_for(|c| *c == n))
            .await
            .unwrap()
            .unwrap();
    }

    async fn next_frame(body: &mut BodyDataStream, buf: &mut String) -> String {
        loop {
            if let Some(end) = buf.find("\n\n") {
                let frame = buf[..end + 2].to_owned();
                buf.replace_range(..end + 2, "");
                return frame;
            }
            let chunk = timeout(TIMEOUT, body.next()).await.unwrap().unwrap().unwrap();
            buf.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }

    fn events_request() -> Request<Body> {
        Request::builder().uri("/events").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn stream_headers() {
        let (server, hub) = make_server();
        let resp = server.router().oneshot(events_request()).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(resp.headers()[X_ACCEL_BUFFERING], "no");
        wait_for_clients(&hub, 1).await;
    }

    #[tokio::test]
    async fn broadcast_arrives_as_data_frame() {
        let (server, hub) = make_server();
        let resp = server.router().oneshot(events_request()).await.unwrap();
        wait_for_clients(&hub, 1).await;

        let mut body = resp.into_body().into_data_stream();
        let mut buf = String::new();
        hub.broadcast("hello".into()).await.unwrap();
        assert_eq!(next_frame(&mut body, &mut buf).await, "data: hello\n\n");
        hub.broadcast("world".into()).await.unwrap();
        assert_eq!(next_frame(&mut body, &mut buf).await, "data: world\n\n");
    }

    #[tokio::test]
    async fn multiline_message_uses_one_field_per_line() {
        let (server, hub) = make_server();
        let resp = server.router().oneshot(events_request()).await.unwrap();
        wait_for_clients(&hub, 1).await;

        let mut body = resp.into_body().into_data_stream();
        let mut buf = String::new();
        hub.broadcast("line one\r\nline two".into()).await.unwrap();
        assert_eq!(
            next_frame(&mut body, &mut buf).await,
            "data: line one\ndata: line two\n\n"
        );
    }

    #[tokio::test]
    async fn dropping_response_deregisters_client() {
        let (server, hub) = make_server();
        let resp = server.router().oneshot(events_request()).await.unwrap();
        wait_for_clients(&hub, 1).await;
        drop(resp);
        wait_for_clients(&hub, 0).await;
    }

    #[tokio::test]
    async fn shutdown_ends_stream() {
        let (server, hub) = make_server();
        let resp = server.router().oneshot(events_request()).await.unwrap();
        wait_for_clients(&hub, 1).await;

        server.shutdown().shutdown();
        let mut body = resp.into_body().into_data_stream();
        assert!(timeout(TIMEOUT, body.next()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hub_stopped_is_503() {
        let (hub, handle) = Hub::new(HubConfig::default());
        drop(hub);
        let metrics = PrometheusBuilder::new().build_recorder().handle();
        let server = HeraldServer::new(ServerConfig::default(), handle, metrics);
        let resp = server.router().oneshot(events_request()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
