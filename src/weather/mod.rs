//! Outbound weather API requests built from the device configuration.

use core::fmt::Write as _;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::error::AppError;

extern crate alloc;
use alloc::string::String;

pub mod api;

const QUERY_ENCODE_SET: &AsciiSet = &CONTROLS
    // common separators / punctuation / reserved characters:
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode a single query component.
pub fn url_encode_component(component: &str) -> Result<String, AppError> {
    let mut buf = String::new();
    write!(buf, "{}", utf8_percent_encode(component, QUERY_ENCODE_SET))
        .map_err(|_| AppError::RequestBuildFailed)?;
    Ok(buf)
}

/// Host and request target (path + query) of an HTTP API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: &'static str,
    pub target: String,
}
