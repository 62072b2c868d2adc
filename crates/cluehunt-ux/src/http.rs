use crate::{HuntBackend, UxService};
use chrono::Utc;
use cluehunt_core::{PrintFilter, StoreError, parse_hint_pool};
use serde::Serialize;
use serde_json::{Value, json};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub bind: SocketAddr,
}

#[derive(Debug, Error)]
pub enum HttpServeError {
    #[error("bind failed: {0}")]
    Bind(std::io::Error),
    #[error("accept failed: {0}")]
    Accept(std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Json(Value),
    Text(String),
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpResponse {
    status: u16,
    body: Body,
}

impl HttpResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Body::Json(body),
        }
    }

    fn view(body: impl Serialize) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self::json(200, body),
            Err(err) => Self::json(500, json!({ "error": format!("serialization error: {err}") })),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Healthz,
    Home,
    SetHints(Option<u32>),
    Start,
    Print(PrintFilter),
    Clue(String),
    RevealHint(String),
    Solve(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
enum RouteError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
}

pub fn serve_hunt<B: HuntBackend>(
    config: HttpServerConfig,
    service: &UxService<B>,
) -> Result<(), HttpServeError> {
    let listener = TcpListener::bind(config.bind).map_err(HttpServeError::Bind)?;
    info!(bind = %config.bind, "serving hunt");
    serve_listener(listener, service, None)
}

/// Handle connections one at a time, so each request's state mutation and
/// save complete before the next request is read.
pub fn serve_listener<B: HuntBackend>(
    listener: TcpListener,
    service: &UxService<B>,
    max_requests: Option<usize>,
) -> Result<(), HttpServeError> {
    let mut served = 0usize;

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, service) {
                    warn!(error = %err, "request failed");
                    let _ = write_response(
                        &mut stream,
                        HttpResponse::error(500, format!("internal server error: {err}")),
                    );
                }
                served += 1;
            }
            Err(err) => return Err(HttpServeError::Accept(err)),
        }

        if let Some(limit) = max_requests
            && served >= limit
        {
            break;
        }
    }

    Ok(())
}

fn handle_connection<B: HuntBackend>(
    stream: &mut TcpStream,
    service: &UxService<B>,
) -> Result<(), String> {
    let response = match read_request_line(stream) {
        Ok((method, target)) => match parse_route(&method, &target) {
            Ok(route) => execute_route(service, route),
            Err(err) => route_error_response(err),
        },
        Err(err) => route_error_response(err),
    };
    write_response(stream, response).map_err(|e| e.to_string())
}

fn read_request_line(stream: &mut TcpStream) -> Result<(String, String), RouteError> {
    let mut buf = [0u8; 8192];
    let n = stream
        .read(&mut buf)
        .map_err(|e| RouteError::BadRequest(format!("failed to read request: {e}")))?;
    if n == 0 {
        return Err(RouteError::BadRequest("empty request".to_string()));
    }
    let req = String::from_utf8_lossy(&buf[..n]);
    let line = req
        .lines()
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing request line".to_string()))?;
    parse_request_line(line)
}

fn parse_request_line(line: &str) -> Result<(String, String), RouteError> {
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing method".to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| RouteError::BadRequest("missing target".to_string()))?;
    Ok((method.to_string(), target.to_string()))
}

fn parse_route(method: &str, target: &str) -> Result<Route, RouteError> {
    let (path, query) = split_target(target);
    let params = parse_query_params(query);
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if let Some(raw_id) = path.strip_prefix("/clue/") {
        let id = percent_decode(raw_id);
        if id.is_empty() || id.contains('/') {
            return Err(RouteError::NotFound(format!("unknown route: {path}")));
        }
        return match method {
            "GET" => Ok(Route::Clue(id)),
            "POST" => Ok(Route::RevealHint(id)),
            _ => Err(RouteError::MethodNotAllowed(
                "use GET to view or POST to reveal the hint".to_string(),
            )),
        };
    }

    let route = match path {
        "/" => Route::Home,
        "/healthz" => Route::Healthz,
        "/hints" => Route::SetHints(param("hints").as_deref().and_then(parse_hint_pool)),
        "/start" => Route::Start,
        "/print" => Route::Print(PrintFilter::from_pairs(
            params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )),
        "/solve" => Route::Solve(param("id").unwrap_or_default()),
        _ => return Err(RouteError::NotFound(format!("unknown route: {path}"))),
    };

    if method != "GET" {
        return Err(RouteError::MethodNotAllowed("use GET".to_string()));
    }
    Ok(route)
}

fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    }
}

/// Decoded query pairs in request order.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        let key = percent_decode(k);
        if key.is_empty() {
            continue;
        }
        out.push((key, percent_decode(v)));
    }
    out
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let (Some(h), Some(l)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    out.push(h * 16 + l);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn execute_route<B: HuntBackend>(service: &UxService<B>, route: Route) -> HttpResponse {
    match route {
        Route::Healthz => HttpResponse::json(200, json!({ "ok": true })),
        Route::Home => HttpResponse::view(service.home(Utc::now())),
        Route::SetHints(hints) => match service.set_hints(hints) {
            Ok(()) => HttpResponse {
                status: 200,
                body: Body::Text("DONE".to_string()),
            },
            Err(err) => store_error_response(err),
        },
        Route::Start => match service.start() {
            Ok(location) => HttpResponse {
                status: 303,
                body: Body::Redirect(location),
            },
            Err(err) => store_error_response(err),
        },
        Route::Print(filter) => HttpResponse::view(service.print(&filter)),
        Route::Clue(id) => HttpResponse::view(service.clue(&id)),
        Route::RevealHint(id) => match service.reveal_hint(&id) {
            Ok(Some(view)) => HttpResponse::view(view),
            Ok(None) => {
                HttpResponse::error(404, "The clue you were looking for could not be found")
            }
            Err(err) => store_error_response(err),
        },
        Route::Solve(code) => match service.solve(&code) {
            Ok(view) => HttpResponse::view(view),
            Err(err) => store_error_response(err),
        },
    }
}

fn route_error_response(err: RouteError) -> HttpResponse {
    match err {
        RouteError::BadRequest(msg) => HttpResponse::error(400, msg),
        RouteError::NotFound(msg) => HttpResponse::error(404, msg),
        RouteError::MethodNotAllowed(msg) => HttpResponse::error(405, msg),
    }
}

fn store_error_response(err: StoreError) -> HttpResponse {
    warn!(error = %err, "hunt store operation failed");
    HttpResponse::error(500, format!("hunt store error: {err}"))
}

fn write_response(stream: &mut TcpStream, response: HttpResponse) -> std::io::Result<()> {
    let (content_type, body, location) = match response.body {
        Body::Json(value) => ("application/json", serde_json::to_vec_pretty(&value)?, None),
        Body::Text(text) => ("text/plain; charset=utf-8", text.into_bytes(), None),
        Body::Redirect(location) => ("text/plain; charset=utf-8", Vec::new(), Some(location)),
    };
    let location_header = location
        .map(|location| format!("Location: {location}\r\n"))
        .unwrap_or_default();
    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        content_type,
        body.len(),
        location_header,
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(&body)?;
    stream.flush()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        303 => "See Other",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
