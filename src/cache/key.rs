//! Cache key derivation.
//!
//! Keys are lossy on purpose: numeric parts are rounded to a fixed number of
//! decimals, so requests whose coordinates differ only past that precision
//! share one entry.

use std::fmt;

/// One component of a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyPart {
    Text(String),
    Number(f64),
    Integer(i64),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Text(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Text(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        KeyPart::Text(value.clone())
    }
}

impl From<f64> for KeyPart {
    fn from(value: f64) -> Self {
        KeyPart::Number(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Integer(value)
    }
}

impl KeyPart {
    fn render(&self, precision: u32) -> String {
        match self {
            KeyPart::Text(s) => escape(s),
            KeyPart::Integer(i) => i.to_string(),
            KeyPart::Number(n) => quantize(*n, precision),
        }
    }
}

/// Backslash-escape `\` and `:` so text parts cannot forge a separator.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Round `value` to `precision` decimals and print exactly that many.
///
/// Negative zero prints as zero so `-0.00001` and `0.00001` collide.
pub fn quantize(value: f64, precision: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scale = 10f64.powi(precision as i32);
    let mut scaled = (value * scale).round();
    if scaled == 0.0 {
        scaled = 0.0;
    }
    format!("{:.*}", precision as usize, scaled / scale)
}

/// A derived cache key, `cache:<namespace>:<part>:<part>…`.
///
/// Text parts are escaped; the namespace is used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(namespace: &str, parts: &[KeyPart], precision: u32) -> Self {
        let mut key = format!("cache:{}", namespace);
        for part in parts {
            key.push(':');
            key.push_str(&part.render(precision));
        }
        CacheKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
