use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a piped quote or schedule request.
///
/// `None` when stdin is a terminal or nothing was piped, so the caller
/// falls back to building the request from flags.
pub fn read_piped_request<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;
    parse_request(&body)
}

fn parse_request<T: DeserializeOwned>(body: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    let request = serde_json::from_str(body)
        .map_err(|e| format!("Invalid request on stdin: {e}"))?;
    Ok(Some(request))
}
