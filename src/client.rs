use crate::error::{EchConnectError, EchConnectResult};
use crate::factory::TlsSocketFactory;
use bytes::Bytes;
use dashmap::DashMap;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::{self, SendRequest};
use hyper::{header, HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

/// Default timeout for a whole request (30 seconds)
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent
const DEFAULT_USER_AGENT: &str = concat!("ech-connect/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpClient`].
///
/// [`install`](Self::install) attaches the socket factory; the
/// factory's provider carries the derived trust anchors, so every
/// connection from the built client validates against the platform
/// store.
pub struct HttpClientBuilder {
    factory: Option<Arc<TlsSocketFactory>>,
    request_timeout: Duration,
    user_agent: String,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            factory: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Attach the socket factory every connection goes through.
    pub fn install(mut self, factory: Arc<TlsSocketFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> EchConnectResult<HttpClient> {
        let factory = self.factory.ok_or_else(|| {
            EchConnectError::Config("No socket factory installed on the client builder".to_string())
        })?;
        Ok(HttpClient {
            factory,
            senders: Arc::new(DashMap::new()),
            request_timeout: self.request_timeout,
            user_agent: self.user_agent,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

type PooledSender = Arc<Mutex<SendRequest<Full<Bytes>>>>;

/// Collected response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTPS client where every connection is produced by the socket
/// factory.
///
/// The client resolves the target itself and opens the plain TCP
/// connection, then hands it to the factory's upgrade entry point, so
/// pinned hosts get their substituted handshake name. One pooled
/// HTTP/1.1 connection is kept per host; a dead pooled connection is
/// dropped and re-dialed once.
pub struct HttpClient {
    factory: Arc<TlsSocketFactory>,
    senders: Arc<DashMap<String, PooledSender>>,
    request_timeout: Duration,
    user_agent: String,
}

impl HttpClient {
    pub async fn get(&self, url: &str) -> EchConnectResult<HttpResponse> {
        self.request(Method::GET, url, Bytes::new()).await
    }

    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Bytes,
    ) -> EchConnectResult<HttpResponse> {
        let uri: Uri = url
            .parse()
            .map_err(|e| EchConnectError::InvalidInput(format!("Invalid URL {}: {}", url, e)))?;
        if uri.scheme_str() != Some("https") {
            return Err(EchConnectError::InvalidInput(format!(
                "Unsupported scheme in {} (only https is supported)",
                url
            )));
        }
        let host = uri
            .host()
            .ok_or_else(|| EchConnectError::InvalidInput(format!("Missing host in {}", url)))?
            .to_string();
        let port = uri.port_u16().unwrap_or(443);

        let fut = self.request_inner(&method, &uri, &host, port, body);
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(EchConnectError::Timeout(format!(
                "{} {} after {:?}",
                method, url, self.request_timeout
            ))),
        }
    }

    async fn request_inner(
        &self,
        method: &Method,
        uri: &Uri,
        host: &str,
        port: u16,
        body: Bytes,
    ) -> EchConnectResult<HttpResponse> {
        let key = format!("{}:{}", host, port);
        let sender = self.pooled_sender(&key, host, port).await?;
        let req = self.build_request(method, uri, host, port, body.clone())?;

        let response = {
            let mut guard = sender.lock().await;
            match guard.send_request(req).await {
                Ok(response) => response,
                Err(e) => {
                    drop(guard);
                    debug!("Pooled connection to {} failed ({}), re-dialing", key, e);
                    self.senders.remove(&key);
                    let sender = self.dial(&key, host, port).await?;
                    let req = self.build_request(method, uri, host, port, body)?;
                    let mut guard = sender.lock().await;
                    guard.send_request(req).await?
                }
            }
        };

        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        debug!(
            "{} {} -> {} ({} bytes)",
            method,
            uri,
            parts.status,
            body.len()
        );

        Ok(HttpResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    async fn pooled_sender(&self, key: &str, host: &str, port: u16) -> EchConnectResult<PooledSender> {
        if let Some(entry) = self.senders.get(key) {
            let sender = Arc::clone(entry.value());
            drop(entry);
            if !sender.lock().await.is_closed() {
                self.factory.metrics().record_pool_reuse();
                debug!("Reusing pooled connection for {}", key);
                return Ok(sender);
            }
            self.senders.remove(key);
        }
        self.dial(key, host, port).await
    }

    async fn dial(&self, key: &str, host: &str, port: u16) -> EchConnectResult<PooledSender> {
        debug!("Dialing {}:{}", host, port);
        let stream = TcpStream::connect((host, port)).await?;
        let socket = self.factory.upgrade(stream, host, port).await?;

        let (sender, conn) = http1::handshake(TokioIo::new(socket)).await?;
        let connection_key = key.to_string();
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!("Connection task for {} ended: {}", connection_key, e);
            }
        });

        let sender = Arc::new(Mutex::new(sender));
        self.senders.insert(key.to_string(), Arc::clone(&sender));
        Ok(sender)
    }

    fn build_request(
        &self,
        method: &Method,
        uri: &Uri,
        host: &str,
        port: u16,
        body: Bytes,
    ) -> EchConnectResult<Request<Full<Bytes>>> {
        let path = uri
            .path_and_query()
            .map(|p| p.as_str())
            .unwrap_or("/");
        let host_value = if port == 443 {
            host.to_string()
        } else {
            format!("{}:{}", host, port)
        };

        Request::builder()
            .method(method.clone())
            .uri(path)
            .header(header::HOST, host_value)
            .header(header::USER_AGENT, self.user_agent.as_str())
            .body(Full::new(body))
            .map_err(|e| EchConnectError::Protocol(format!("Failed to build request: {}", e)))
    }
}
