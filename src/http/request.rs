//! HTTP/1.1 request parsing.
//!
//! # Responsibilities
//! - Frame a request out of the connection's accumulating read buffer
//! - Expose method, target, headers, body and the keep-alive preference
//!
//! The parser is incremental: the connection keeps feeding bytes until
//! [`try_parse`] reports a complete request or a protocol error. Bodies are
//! framed by `Content-Length` only; this surface has no use for chunked
//! uploads.

use thiserror::Error;

/// Upper bound on the request head, guarding the accumulating buffer.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Upper bound on a request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            other => Method::Other(other.to_string()),
        }
    }

    /// Only read-style methods are served; everything else is rejected
    /// before the router sees it.
    pub fn is_read(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Other(name) => name,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line")]
    BadRequestLine,
    #[error("unsupported HTTP version: {0}")]
    BadVersion(String),
    #[error("malformed header line")]
    BadHeader,
    #[error("invalid Content-Length header")]
    BadContentLength,
    #[error("request head exceeds {MAX_HEAD_BYTES} bytes")]
    HeadTooLarge,
    #[error("request body exceeds {MAX_BODY_BYTES} bytes")]
    BodyTooLarge,
}

/// One parsed request. Value type; a connection holds at most one at a time.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: String,
    /// Minor HTTP/1.x version digit (0 or 1).
    pub version_minor: u8,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl Request {
    /// Case-insensitive header lookup; first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Keep-alive preference: HTTP/1.1 defaults to keep-alive unless the
    /// client sends `Connection: close`; HTTP/1.0 defaults to close unless
    /// it sends `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        match self.header("connection") {
            Some(value) if value.eq_ignore_ascii_case("close") => false,
            Some(value) if value.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version_minor >= 1,
        }
    }
}

/// Try to frame a complete request out of `buffer`.
///
/// Returns `Ok(Some((request, consumed)))` once the head and body are fully
/// buffered, `Ok(None)` if more bytes are needed, or a [`ParseError`] for a
/// request that can never become well-formed.
pub fn try_parse(buffer: &[u8]) -> Result<Option<(Request, usize)>, ParseError> {
    let head_end = match find_head_end(buffer) {
        Some(end) => end,
        None => {
            if buffer.len() > MAX_HEAD_BYTES {
                return Err(ParseError::HeadTooLarge);
            }
            return Ok(None);
        }
    };
    if head_end > MAX_HEAD_BYTES {
        return Err(ParseError::HeadTooLarge);
    }

    let head = std::str::from_utf8(&buffer[..head_end]).map_err(|_| ParseError::BadHeader)?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(ParseError::BadRequestLine)?;
    let mut parts = request_line.split(' ');
    let method = Method::parse(parts.next().ok_or(ParseError::BadRequestLine)?);
    let target = parts.next().ok_or(ParseError::BadRequestLine)?.to_string();
    let version = parts.next().ok_or(ParseError::BadRequestLine)?;
    if parts.next().is_some() || target.is_empty() {
        return Err(ParseError::BadRequestLine);
    }
    let version_minor = match version {
        "HTTP/1.0" => 0,
        "HTTP/1.1" => 1,
        other => return Err(ParseError::BadVersion(other.to_string())),
    };

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or(ParseError::BadHeader)?;
        if name.is_empty() || name.contains(' ') {
            return Err(ParseError::BadHeader);
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }

    let content_length = match headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
    {
        Some((_, value)) => value.parse::<usize>().map_err(|_| ParseError::BadContentLength)?,
        None => 0,
    };
    if content_length > MAX_BODY_BYTES {
        return Err(ParseError::BodyTooLarge);
    }

    let body_start = head_end + 4;
    let total = body_start + content_length;
    if buffer.len() < total {
        return Ok(None);
    }

    let body = String::from_utf8_lossy(&buffer[body_start..total]).into_owned();

    Ok(Some((
        Request {
            method,
            target,
            version_minor,
            headers,
            body,
        },
        total,
    )))
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}
