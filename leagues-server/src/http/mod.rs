mod auth;
mod games;
mod leagues;
mod matches;
mod players;
mod teams;

use crate::config::BindAddr;
use crate::{Error, State, StatusCodeError};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::Future;
use hyper::header::{
    HeaderValue, IntoHeaderName, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN,
    AUTHORIZATION, CONTENT_TYPE,
};
use hyper::http::request::Parts;
use hyper::server::conn::Http;
use hyper::service::Service;
use hyper::{Body, HeaderMap, Method, StatusCode, Uri};
use leagues_api::auth::{Claims, Role};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpSocket, UnixListener};
use tokio::sync::watch;
use tokio::time::Instant;

pub type Result = std::result::Result<Response, Error>;

pub async fn bind(addr: BindAddr, state: State) -> std::result::Result<(), crate::Error> {
    match addr {
        BindAddr::Tcp(addr) => bind_tcp(addr, state).await,
        BindAddr::Unix(path) => bind_unix(path, state).await,
    }
}

async fn bind_tcp(addr: SocketAddr, state: State) -> std::result::Result<(), crate::Error> {
    let mut shutdown_rx = state.shutdown_rx.clone();

    let service = RootService { state };

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    if let Err(err) = socket.set_reuseaddr(true) {
        log::warn!("Failed to set SO_REUSEADDR flag: {}", err);
    }

    // Enable SO_REUSEPORT for all supported systems.
    #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
    if let Err(err) = socket.set_reuseport(true) {
        log::warn!("Failed to set SO_REUSEPORT flag: {}", err);
    }

    socket.bind(addr)?;
    let listener = socket.listen(1024)?;
    loop {
        tokio::select! {
            res = listener.accept() => {
                let (stream, addr) = match res {
                    Ok((stream, addr)) => (stream, addr),
                    Err(err) => {
                        log::warn!("Failed to accept connection: {:?}", err);
                        continue;
                    }
                };
                log::info!("Accepting new connection from {:?}", addr);

                tokio::task::spawn(serve_connection(
                    stream,
                    service.clone(),
                    shutdown_rx.clone(),
                ));
            }
            // Shut down the server.
            _ = shutdown_rx.changed() => {
                log::debug!("Shutting down http server");
                return Ok(());
            }
        }
    }
}

async fn bind_unix(path: PathBuf, state: State) -> std::result::Result<(), crate::Error> {
    let mut shutdown_rx = state.shutdown_rx.clone();

    let service = RootService { state };

    // Remove a socket file left behind by a previous run.
    match std::fs::remove_file(&path) {
        Ok(()) => (),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => (),
        Err(err) => return Err(err.into()),
    }

    let listener = UnixListener::bind(&path)?;
    loop {
        tokio::select! {
            res = listener.accept() => {
                let stream = match res {
                    Ok((stream, _)) => stream,
                    Err(err) => {
                        log::warn!("Failed to accept connection: {:?}", err);
                        continue;
                    }
                };

                tokio::task::spawn(serve_connection(
                    stream,
                    service.clone(),
                    shutdown_rx.clone(),
                ));
            }
            _ = shutdown_rx.changed() => {
                log::debug!("Shutting down http server");
                return Ok(());
            }
        }
    }
}

async fn serve_connection<S>(stream: S, service: RootService, mut shutdown_rx: watch::Receiver<bool>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut conn = Http::new()
        .http1_keep_alive(true)
        .serve_connection(stream, service);

    let mut conn = Pin::new(&mut conn);

    tokio::select! {
        res = &mut conn => {
            if let Err(err) = res {
                log::warn!("Http error: {:?}", err);
            }
        }
        _ = shutdown_rx.changed() => {
            log::debug!("Shutting down connection");
            conn.graceful_shutdown();
        }
    }
}

#[derive(Clone, Debug)]
struct RootService {
    state: State,
}

impl Service<hyper::Request<Body>> for RootService {
    type Response = hyper::Response<Body>;
    type Error = crate::Error;
    type Future = RootServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    #[inline]
    fn call(&mut self, req: hyper::Request<Body>) -> Self::Future {
        RootServiceFuture::new(req, self.state.clone())
    }
}

struct RootServiceFuture(
    BoxFuture<'static, std::result::Result<hyper::Response<Body>, crate::Error>>,
);

impl RootServiceFuture {
    fn new(req: hyper::Request<Body>, state: State) -> Self {
        Self(Box::pin(async move {
            Ok(service_root(req, state).await.unwrap())
        }))
    }
}

impl Future for RootServiceFuture {
    type Output = std::result::Result<hyper::Response<Body>, crate::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let future = unsafe { self.map_unchecked_mut(|this| &mut this.0) };
        future.poll(cx)
    }
}

async fn service_root(
    req: hyper::Request<Body>,
    state: State,
) -> std::result::Result<hyper::Response<Body>, Infallible> {
    log::trace!("Received Request:");
    log::trace!("Head: {} {}", req.method(), req.uri());
    log::trace!("Headers: {:?}", req.headers());

    let req = Request::new(req, state);

    // Bodies are only accepted on mutating methods and are capped.
    if req.method() == Method::POST || req.method() == Method::PUT {
        let err = match req.content_length() {
            Ok(length) if length > 16384 => Some(StatusCodeError::payload_too_large()),
            Ok(_) => None,
            Err(Error::StatusCodeError(err)) => Some(err),
            Err(_) => Some(StatusCodeError::bad_request()),
        };

        if let Some(err) = err {
            let mut resp = hyper::Response::new(Body::from(err.message));
            *resp.status_mut() = err.code;
            return Ok(resp);
        }
    }

    let uri = String::from(req.uri().path());

    let mut uri = RequestUri::new(&uri);

    log::debug!("{:?}", uri);

    let origin = req.headers().get("Origin").cloned();

    let res = match uri.take_str() {
        Some("players") => players::route(req, uri).await,
        Some("games") => games::route(req, uri).await,
        Some("teams") => teams::route(req, uri).await,
        Some("matches") => matches::route(req, uri).await,
        Some("leagues") => leagues::route(req, uri).await,
        Some("register") => auth::register(req, uri).await,
        Some("login") => auth::login(req, uri).await,
        _ => Err(Error::NotFound),
    };

    match res {
        Ok(mut resp) => {
            if let Some(origin) = origin {
                resp = resp.header(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            }

            resp = resp.header(
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type,authorization"),
            );

            Ok(resp.build())
        }
        Err(err) => {
            let mut resp = Response::ok();

            match err {
                Error::NotFound => {
                    resp = resp.status(StatusCode::NOT_FOUND).body("Not Found");
                }
                Error::BadRequest => {
                    resp = resp.status(StatusCode::BAD_REQUEST).body("Bad Request");
                }
                Error::StatusCodeError(err) => {
                    resp = resp.status(err.code).json(&ErrorResponse {
                        code: err.code.as_u16(),
                        message: err.message,
                    });
                }
                err => {
                    log::error!("{:?}", err);

                    resp = resp
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .body("Internal Server Error");
                }
            }

            Ok(resp.build())
        }
    }
}

#[derive(Debug)]
pub struct Request {
    pub parts: Parts,
    pub body: Option<Body>,
    state: State,
}

impl Request {
    #[inline]
    fn new(req: hyper::Request<Body>, state: State) -> Self {
        let (parts, body) = req.into_parts();

        Self {
            parts,
            body: Some(body),
            state,
        }
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        &self.parts.headers
    }

    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub async fn json<T>(&mut self) -> std::result::Result<T, Error>
    where
        T: DeserializeOwned,
    {
        const DUR: Duration = Duration::new(30, 0);

        let deadline = Instant::now() + DUR;

        let bytes = tokio::select! {
            res = hyper::body::to_bytes(self.body.take().unwrap()) => {
                res?
            }
            _ = tokio::time::sleep_until(deadline) => {
                log::info!("Client failed to transmit body in {}s, dropping connection", DUR.as_secs());
                return Err(StatusCodeError::request_timeout().into());
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            Err(err) => Err(StatusCodeError::new(StatusCode::BAD_REQUEST, err).into()),
        }
    }

    /// Returns the value of the "Content-Length" header. If the header is not present or has an
    /// invalid value an error is returned.
    pub fn content_length(&self) -> std::result::Result<u64, Error> {
        match self.headers().get("Content-Length") {
            Some(value) => match value.to_str() {
                Ok(value) => match value.parse() {
                    Ok(value) => Ok(value),
                    Err(err) => {
                        log::debug!("Failed to parse \"Content-Length\" header: {:?}", err);

                        Err(StatusCodeError::bad_request().into())
                    }
                },
                Err(err) => {
                    log::debug!("Failed to parse \"Content-Length\" header: {:?}", err);

                    Err(StatusCodeError::bad_request().into())
                }
            },
            None => Err(StatusCodeError::length_required().into()),
        }
    }

    /// Verifies the bearer token on the request and checks its role against
    /// `roles`.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] with status 401 if the token is missing or
    /// does not validate, and 403 if the role is not in `roles`.
    pub fn authorize(&self, roles: &[Role]) -> std::result::Result<Claims, Error> {
        let header = match self.headers().get(AUTHORIZATION) {
            Some(header) => header,
            None => {
                return Err(StatusCodeError::unauthorized()
                    .message("Missing credential")
                    .into())
            }
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "));

        let token = match token {
            Some(token) => token,
            None => {
                return Err(StatusCodeError::unauthorized()
                    .message("Invalid credential")
                    .into())
            }
        };

        let claims = match self.state.auth.validate_token(token) {
            Ok(claims) => claims,
            Err(err) => {
                log::debug!("Token validation failed: {:?}", err);

                return Err(StatusCodeError::unauthorized()
                    .message("Invalid credential")
                    .into());
            }
        };

        if !roles.contains(&claims.role) {
            return Err(StatusCodeError::forbidden().message("Forbidden").into());
        }

        Ok(claims)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RequestUri<'a> {
    path: &'a str,
}

impl<'a> RequestUri<'a> {
    pub fn new(mut path: &'a str) -> Self {
        if path.starts_with('/') {
            path = &path[1..];
        }

        Self { path }
    }

    pub fn take(&mut self) -> Option<UriPart<'a>> {
        let part = self.take_str()?;

        Some(UriPart { part })
    }

    pub fn take_str(&mut self) -> Option<&'a str> {
        if self.path.is_empty() {
            None
        } else {
            Some(match self.path.split_once('/') {
                Some((part, rem)) => {
                    self.path = rem;
                    part
                }
                None => {
                    let path = self.path;
                    self.path = "";
                    path
                }
            })
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct UriPart<'a> {
    part: &'a str,
}

impl<'a> UriPart<'a> {
    pub fn parse<T>(&self) -> std::result::Result<T, Error>
    where
        T: FromStr,
    {
        match self.part.parse() {
            Ok(v) => Ok(v),
            Err(_) => Err(Error::BadRequest),
        }
    }
}

impl<'a> AsRef<str> for UriPart<'a> {
    fn as_ref(&self) -> &str {
        self.part
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// A `{"message": ..}` body for operations that report an outcome rather
/// than an entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new<T>(message: T) -> Self
    where
        T: ToString,
    {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    /// 200 OK
    pub fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// 201 Created
    pub fn created() -> Self {
        Self {
            status: StatusCode::CREATED,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// 204 No Content
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn body<T>(mut self, body: T) -> Self
    where
        T: Into<Body>,
    {
        self.body = body.into();
        self
    }

    pub fn json<T>(mut self, body: &T) -> Self
    where
        T: Serialize,
    {
        self.body = Body::from(serde_json::to_vec(body).unwrap());
        self.header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    pub fn header<K>(mut self, key: K, value: HeaderValue) -> Self
    where
        K: IntoHeaderName,
    {
        self.headers.append(key, value);
        self
    }

    fn build(self) -> hyper::Response<Body> {
        let mut resp = hyper::Response::new(self.body);
        *resp.status_mut() = self.status;
        *resp.headers_mut() = self.headers;
        resp
    }
}

/// Checks the request method and runs the specified path. If no matching method is found
/// an method_not_allowed error is returned.
#[macro_export]
macro_rules! method {
    ($req:expr, {$($method:expr => $branch:expr),* $(,)?}) => {
        match $req.method() {
            $(
                method if method == $method => $branch,
            )*
            method if method == hyper::Method::OPTIONS => {
                use $crate::http::Response;
                use hyper::header::{HeaderValue, ALLOW, ACCESS_CONTROL_ALLOW_METHODS};

                let allow = vec![$($method.as_str()),*];
                let allow = HeaderValue::from_bytes(allow.join(",").as_bytes()).unwrap();

                Ok(Response::no_content()
                    .header(ALLOW, allow.clone())
                    .header(ACCESS_CONTROL_ALLOW_METHODS, allow))
            }
            _ => Err($crate::StatusCodeError::method_not_allowed().into()),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::RequestUri;

    #[test]
    fn test_request_uri_take() {
        let mut uri = RequestUri::new("");
        assert_eq!(uri.take_str(), None);

        let mut uri = RequestUri::new("/");
        assert_eq!(uri.take_str(), None);

        let mut uri = RequestUri::new("/players");
        assert_eq!(uri.take_str(), Some("players"));
        assert_eq!(uri.take_str(), None);

        let mut uri = RequestUri::new("/players/5");
        assert_eq!(uri.take_str(), Some("players"));
        assert_eq!(uri.take_str(), Some("5"));
        assert_eq!(uri.take_str(), None);
    }

    #[test]
    fn test_uri_part_parse() {
        let mut uri = RequestUri::new("/5/abc");

        assert_eq!(uri.take().unwrap().parse::<u64>().unwrap(), 5);
        assert!(uri.take().unwrap().parse::<u64>().is_err());
    }
}
