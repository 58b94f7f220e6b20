use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::Duration;

/// Maximum request body the gateway will buffer for forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Proxy forwarding guarded requests to the dashboard application.
#[derive(Clone)]
pub struct UpstreamProxy {
    /// Base URL of the dashboard application
    base_url: String,
    /// HTTP client for making requests
    client: reqwest::Client,
}

impl UpstreamProxy {
    /// Create a new upstream proxy.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the dashboard app (e.g., "http://127.0.0.1:3000")
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { base_url, client }
    }

    /// Forward a request to the dashboard application.
    ///
    /// Builds the target URL from the incoming path and query, copies
    /// everything except hop-by-hop headers, forwards the body where the
    /// method carries one, and relays the upstream response.
    pub async fn forward(&self, request: Request<Body>) -> Response {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let headers = request.headers().clone();

        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let target_url = format!("{}{}", self.base_url, path_and_query);

        tracing::debug!(
            method = %method,
            target_url = %target_url,
            "forwarding request upstream"
        );

        // The axum and reqwest http types differ in version, so the
        // method is mapped by hand and headers converted byte-wise.
        let mut req_builder = match method {
            Method::GET => self.client.get(&target_url),
            Method::POST => self.client.post(&target_url),
            Method::PUT => self.client.put(&target_url),
            Method::DELETE => self.client.delete(&target_url),
            Method::PATCH => self.client.patch(&target_url),
            Method::HEAD => self.client.head(&target_url),
            Method::OPTIONS => self.client.request(reqwest::Method::OPTIONS, &target_url),
            _ => {
                tracing::warn!(method = %method, "unsupported HTTP method");
                return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
            }
        };

        req_builder = Self::copy_headers(req_builder, &headers);

        if matches!(method, Method::POST | Method::PUT | Method::PATCH) {
            let body_bytes = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read request body");
                    return (StatusCode::BAD_REQUEST, "Failed to read request body")
                        .into_response();
                }
            };
            req_builder = req_builder.body(body_bytes);
        }

        match req_builder.send().await {
            Ok(resp) => Self::convert_response(resp).await,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    target_url = %target_url,
                    "failed to forward request upstream"
                );

                if e.is_timeout() {
                    (StatusCode::GATEWAY_TIMEOUT, "Upstream timeout").into_response()
                } else if e.is_connect() {
                    (StatusCode::BAD_GATEWAY, "Failed to connect to upstream").into_response()
                } else {
                    (StatusCode::BAD_GATEWAY, "Bad gateway").into_response()
                }
            }
        }
    }

    /// Copy request headers, excluding hop-by-hop headers.
    fn copy_headers(
        mut builder: reqwest::RequestBuilder,
        headers: &HeaderMap<HeaderValue>,
    ) -> reqwest::RequestBuilder {
        const HOP_BY_HOP: &[&str] = &[
            "connection",
            "keep-alive",
            "proxy-authenticate",
            "proxy-authorization",
            "te",
            "trailer",
            "transfer-encoding",
            "upgrade",
            "host", // replaced with the upstream host
        ];

        for (name, value) in headers.iter() {
            let name_str = name.as_str().to_lowercase();
            if !HOP_BY_HOP.contains(&name_str.as_str()) {
                if let (Ok(header_name), Ok(header_value)) = (
                    reqwest::header::HeaderName::from_bytes(name.as_ref()),
                    reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
                ) {
                    builder = builder.header(header_name, header_value);
                }
            }
        }

        builder
    }

    /// Convert a reqwest response into an axum response.
    async fn convert_response(resp: reqwest::Response) -> Response {
        let status = resp.status();
        let headers = resp.headers().clone();

        let body = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to read upstream response body");
                return (StatusCode::BAD_GATEWAY, "Failed to read upstream response")
                    .into_response();
            }
        };

        let mut response = Response::builder()
            .status(StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK));

        for (name, value) in headers.iter() {
            let name_str = name.as_str().to_lowercase();
            if !["connection", "keep-alive", "transfer-encoding"].contains(&name_str.as_str()) {
                if let (Ok(header_name), Ok(header_value)) = (
                    header::HeaderName::from_bytes(name.as_ref()),
                    header::HeaderValue::from_bytes(value.as_bytes()),
                ) {
                    response = response.header(header_name, header_value);
                }
            }
        }

        response.body(Body::from(body)).unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        })
    }
}

/// Fallback handler forwarding the request to the dashboard application.
pub async fn forward_request(
    State(proxy): State<UpstreamProxy>,
    request: Request<Body>,
) -> Response {
    proxy.forward(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_creation() {
        let proxy = UpstreamProxy::new("http://127.0.0.1:3000".to_string());
        assert_eq!(proxy.base_url, "http://127.0.0.1:3000");
    }
}
