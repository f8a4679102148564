//! HTTP/1.1 response values and wire encoding.
//!
//! # Responsibilities
//! - Represent one response per write cycle of a connection
//! - Encode the status line, headers and body for the transport
//!
//! Every response carries a content type and an explicit Content-Length and
//! honors the request's keep-alive preference through the Connection header.

/// Identifies this server in the `Server` response header.
pub const SERVER_NAME: &str = concat!("routewatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub keep_alive: bool,
}

impl Response {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<String>, keep_alive: bool) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            keep_alive,
        }
    }

    /// 200 with a JSON payload.
    pub fn ok_json(body: impl Into<String>, keep_alive: bool) -> Self {
        Self::new(200, "application/json", body, keep_alive)
    }

    /// 400 with a fixed diagnostic body. Protocol-level rejections keep the
    /// connection usable unless the caller decides otherwise.
    pub fn bad_request(body: impl Into<String>, keep_alive: bool) -> Self {
        Self::new(400, "text/html", body, keep_alive)
    }

    pub fn not_found(body: impl Into<String>, keep_alive: bool) -> Self {
        Self::new(404, "text/html", body, keep_alive)
    }

    pub fn internal_error(keep_alive: bool) -> Self {
        Self::new(500, "text/html", "internal server error", keep_alive)
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// Serialize for the wire. `head_only` suppresses the body (HEAD
    /// requests) while keeping the headers, Content-Length included,
    /// identical to the GET form.
    pub fn encode(&self, head_only: bool) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nServer: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: {}\r\n\r\n",
            self.status,
            self.reason(),
            SERVER_NAME,
            self.content_type,
            self.body.len(),
            if self.keep_alive { "keep-alive" } else { "close" },
        );

        let mut wire = head.into_bytes();
        if !head_only {
            wire.extend_from_slice(self.body.as_bytes());
        }
        wire
    }
}
