//! Captured inbound HTTP request and its canonical wire dump.
//!
//! The surrounding listener hands us a request it already accepted. The
//! prompt builder needs it back as HTTP/1.x text, so `dump` re-serializes it
//! with a stable header order. `parse` is the inverse for captures stored
//! as raw text.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Headers that are written separately or dropped from the dump.
const EXCLUDED_DUMP_HEADERS: &[&str] = &["Host", "Transfer-Encoding", "Trailer"];

/// An HTTP request as received by the outer listener.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    /// Request method (e.g. `GET`).
    pub method: String,
    /// Request target: path plus optional query (e.g. `/admin?x=1`).
    pub uri: String,
    /// Protocol version from the request line.
    #[serde(default = "default_version")]
    pub version: String,
    /// Host the request was addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Header fields in arrival order. Repeated names are allowed.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    #[serde(default)]
    pub body: Vec<u8>,
}

fn default_version() -> String {
    "HTTP/1.1".to_string()
}

impl HttpRequest {
    /// Create a bodyless HTTP/1.1 request.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        HttpRequest {
            method: method.into(),
            uri: uri.into(),
            version: default_version(),
            host: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Set the host (builder pattern).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Append a header (builder pattern).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body (builder pattern).
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize the request into HTTP/1.x wire text.
    ///
    /// Layout: request line, `Host`, remaining headers sorted by canonical
    /// name, blank line, body (lossy UTF-8). Fails without producing partial
    /// output if any piece cannot be framed.
    pub fn dump(&self) -> Result<String, LlmError> {
        if !is_token(&self.method) {
            return Err(LlmError::MalformedRequest(format!(
                "invalid method {:?}",
                self.method
            )));
        }
        if self.uri.is_empty() || self.uri.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LlmError::MalformedRequest(format!(
                "invalid request target {:?}",
                self.uri
            )));
        }
        if !self.version.starts_with("HTTP/") || self.version.contains(char::is_whitespace) {
            return Err(LlmError::MalformedRequest(format!(
                "invalid protocol version {:?}",
                self.version
            )));
        }

        let mut headers: Vec<(String, &str)> = Vec::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            if !is_token(name) {
                return Err(LlmError::MalformedRequest(format!(
                    "invalid header name {name:?}"
                )));
            }
            if !is_valid_field_value(value) {
                return Err(LlmError::MalformedRequest(format!(
                    "invalid value for header {name}"
                )));
            }
            headers.push((canonical_header_key(name), value.as_str()));
        }
        // Stable: repeated headers keep their relative order.
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = format!("{} {} {}\r\n", self.method, self.uri, self.version);

        if let Some(host) = self.effective_host() {
            if !is_valid_field_value(host) {
                return Err(LlmError::MalformedRequest("invalid host".to_string()));
            }
            out.push_str(&format!("Host: {host}\r\n"));
        }

        for (name, value) in headers
            .iter()
            .filter(|(name, _)| !EXCLUDED_DUMP_HEADERS.contains(&name.as_str()))
        {
            out.push_str(&format!("{name}: {value}\r\n"));
        }

        out.push_str("\r\n");
        out.push_str(&String::from_utf8_lossy(&self.body));
        Ok(out)
    }

    /// Parse raw HTTP/1.x request text (CRLF or bare LF line endings).
    ///
    /// Everything after the blank line is taken verbatim as the body.
    pub fn parse(raw: &[u8]) -> Result<Self, LlmError> {
        let (head, body) = split_head(raw).ok_or_else(|| {
            LlmError::MalformedRequest("missing blank line after headers".to_string())
        })?;
        let head = std::str::from_utf8(head)
            .map_err(|_| LlmError::MalformedRequest("request head is not UTF-8".to_string()))?;

        let mut lines = head.lines().map(|l| l.trim_end_matches('\r'));
        let request_line = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| LlmError::MalformedRequest("empty request line".to_string()))?;

        let mut parts = request_line.split(' ');
        let (method, uri, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(m), Some(u), Some(v), None) => (m, u, v),
            _ => {
                return Err(LlmError::MalformedRequest(format!(
                    "malformed request line {request_line:?}"
                )))
            }
        };

        let mut request = HttpRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            version: version.to_string(),
            host: None,
            headers: Vec::new(),
            body: body.to_vec(),
        };

        for line in lines {
            let (name, value) = line.split_once(':').ok_or_else(|| {
                LlmError::MalformedRequest(format!("malformed header line {line:?}"))
            })?;
            let value = value.trim();
            if name.eq_ignore_ascii_case("host") && request.host.is_none() {
                request.host = Some(value.to_string());
            } else {
                request.headers.push((name.to_string(), value.to_string()));
            }
        }

        Ok(request)
    }

    /// Host from the dedicated field, falling back to a `Host` header.
    fn effective_host(&self) -> Option<&str> {
        self.host.as_deref().or_else(|| {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("host"))
                .map(|(_, v)| v.as_str())
        })
    }
}

/// Split raw request bytes at the first blank line.
fn split_head(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let crlf = find(raw, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find(raw, b"\n\n").map(|i| (i, 2));
    let (idx, sep) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some((&raw[..idx], &raw[idx + sep..]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Canonical MIME header key: `content-type` → `Content-Type`.
pub fn canonical_header_key(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// RFC 9110 `token`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

fn is_valid_field_value(s: &str) -> bool {
    !s.chars().any(|c| c == '\r' || c == '\n' || c == '\0')
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
