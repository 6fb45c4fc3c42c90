use axum::http::HeaderMap;

/// Header naming the operator performing a mutation.
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// Identity recorded in ledger notes when no header is sent.
pub const DEFAULT_ACTOR: &str = "system";

/// The acting user for a request. Ledger notes carry this name; it is not an
/// authentication mechanism.
pub fn acting_user(headers: &HeaderMap) -> String {
    headers
        .get(ACTING_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_ACTOR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn acting_user_defaults_to_system() {
        assert_eq!(acting_user(&HeaderMap::new()), "system");
    }

    #[test]
    fn acting_user_reads_and_trims_the_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTING_USER_HEADER, HeaderValue::from_static("  jdoe  "));
        assert_eq!(acting_user(&headers), "jdoe");
    }

    #[test]
    fn blank_header_falls_back_to_system() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTING_USER_HEADER, HeaderValue::from_static("   "));
        assert_eq!(acting_user(&headers), "system");
    }
}
