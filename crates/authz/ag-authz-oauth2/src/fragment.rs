//! Redirect fragment parsing.
//!
//! Implicit-grant providers deliver the token in the URL fragment of the
//! redirect, as `#key1=val1&key2=val2`. This module turns such a string
//! into a map without touching the network or the adapter.

use percent_encoding::percent_decode;
use std::collections::HashMap;

/// Parse the fragment portion of a redirect string into key/value pairs.
///
/// Everything after the first `#` is treated as the query; a string with
/// no `#` is parsed whole. Pairs are `&`-delimited; a piece without `=` or
/// with an empty key is skipped; the value keeps any further `=` characters.
/// Keys and values are percent-decoded; `+` is left alone since fragments
/// are not form-encoded. Duplicate keys keep the last value.
pub fn parse_fragment(input: &str) -> HashMap<String, String> {
    let query = match input.find('#') {
        Some(idx) => &input[idx + 1..],
        None => input,
    };

    let mut params = HashMap::new();
    for piece in query.split('&') {
        let Some((key, value)) = piece.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        params.insert(decode(key), decode(value));
    }
    params
}

fn decode(raw: &str) -> String {
    percent_decode(raw.as_bytes())
        .decode_utf8_lossy()
        .into_owned()
}

/// The parsed redirect: every parameter the provider sent back.
///
/// A successful redirect carries `access_token` and `state`; a rejected one
/// carries `error`. Anything else the provider includes (`token_type`,
/// `expires_in`, ...) stays available through [`get`](Self::get).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResult(HashMap<String, String>);

impl AuthorizationResult {
    /// Parse a captured redirect string (full URL or bare fragment).
    pub fn parse(redirect: &str) -> Self {
        Self(parse_fragment(redirect))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.get("access_token")
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    pub fn error(&self) -> Option<&str> {
        self.get("error")
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.0
    }

    pub fn into_params(self) -> HashMap<String, String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_fragment() {
        let params = parse_fragment("http://cb#access_token=T1&state=xyz");
        assert_eq!(params.len(), 2);
        assert_eq!(params["access_token"], "T1");
        assert_eq!(params["state"], "xyz");
    }

    #[test]
    fn test_percent_decoding_round_trip() {
        // Keys and values decode exactly what encodeURIComponent produced.
        let params = parse_fragment("#a%20key=hello%20world&scope=read%3Awrite&caf%C3%A9=%26%3D");
        assert_eq!(params["a key"], "hello world");
        assert_eq!(params["scope"], "read:write");
        assert_eq!(params["café"], "&=");
    }

    #[test]
    fn test_plus_is_not_a_space() {
        // Fragments are not form-encoded; `+` must survive as-is.
        let params = parse_fragment("#scope=a+b");
        assert_eq!(params["scope"], "a+b");
    }

    #[test]
    fn test_empty_fragment() {
        assert!(parse_fragment("http://cb#").is_empty());
        assert!(parse_fragment("").is_empty());
    }

    #[test]
    fn test_no_hash_parses_whole_string() {
        let params = parse_fragment("access_token=T1&state=xyz");
        assert_eq!(params["access_token"], "T1");
        assert_eq!(params["state"], "xyz");
    }

    #[test]
    fn test_skips_malformed_pieces() {
        let params = parse_fragment("#justakey&=orphanvalue&ok=1");
        assert_eq!(params.len(), 1);
        assert_eq!(params["ok"], "1");
    }

    #[test]
    fn test_value_keeps_embedded_equals() {
        let params = parse_fragment("#sig=a=b=c&empty=");
        assert_eq!(params["sig"], "a=b=c");
        assert_eq!(params["empty"], "");
    }

    #[test]
    fn test_splits_on_first_hash_only() {
        let params = parse_fragment("http://cb?q=1#a=b#c");
        assert_eq!(params["a"], "b#c");
    }

    #[test]
    fn test_duplicate_keys_keep_last() {
        let params = parse_fragment("#k=first&k=second");
        assert_eq!(params["k"], "second");
    }

    #[test]
    fn test_authorization_result_accessors() {
        let result = AuthorizationResult::parse("http://cb#access_token=T1&state=xyz&extra=1");
        assert_eq!(result.access_token(), Some("T1"));
        assert_eq!(result.state(), Some("xyz"));
        assert_eq!(result.error(), None);
        assert_eq!(result.get("extra"), Some("1"));

        let denied = AuthorizationResult::parse("#error=access_denied&state=xyz");
        assert_eq!(denied.error(), Some("access_denied"));
        assert_eq!(denied.access_token(), None);
    }
}
