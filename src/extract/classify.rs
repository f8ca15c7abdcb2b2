// src/extract/classify.rs
// =============================================================================
// Decides whether a link stays on the same host as the page it came from.
//
// Unlike link absolutization, this uses real URL parsing: the candidate is
// resolved against the base URL and the two hosts are compared, port
// included: another port on the same machine is another server. Anything
// that fails to parse counts as external ("fail closed").
// =============================================================================

use url::Url;

/// Returns true if `candidate`, resolved against `base_url`, has the same
/// host and port as `base_url`. Default ports are normalized away, so
/// "http://example.com:80" and "http://example.com" match.
///
/// Examples:
///   ("http://example.com", "http://example.com/foo") -> true
///   ("http://example.com", "/foo")                   -> true
///   ("http://example.com", "http://other.com/foo")   -> false
///   ("::bad::", "http://example.com/foo")            -> false
pub fn is_internal_link(base_url: &str, candidate: &str) -> bool {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => return false,
    };

    let target = match base.join(candidate) {
        Ok(url) => url,
        Err(_) => return false,
    };

    match (base.host_str(), target.host_str()) {
        (Some(base_host), Some(target_host)) => {
            base_host == target_host && base.port() == target.port()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_host_is_internal() {
        assert!(is_internal_link("http://example.com", "http://example.com/foo"));
        assert!(is_internal_link("http://example.com/a/b", "../c"));
        assert!(is_internal_link("http://example.com/a/b", "/root"));
    }

    #[test]
    fn test_other_host_is_external() {
        assert!(!is_internal_link("http://example.com", "http://other.com/foo"));
        assert!(!is_internal_link("http://example.com", "//cdn.example.com/x.js"));
    }

    #[test]
    fn test_port_is_part_of_the_host() {
        assert!(!is_internal_link("http://example.com:8080/", "http://example.com:9090/x"));
        assert!(!is_internal_link("http://example.com/", "http://example.com:8080/x"));
        assert!(is_internal_link("http://example.com:8080/", "/x"));
        assert!(is_internal_link("http://example.com:80/", "http://example.com/x"));
    }

    #[test]
    fn test_malformed_urls_fail_closed() {
        assert!(!is_internal_link("not a url", "http://example.com/foo"));
        assert!(!is_internal_link("", "/foo"));
        assert!(!is_internal_link("http://example.com", "http://[::1"));
    }
}
