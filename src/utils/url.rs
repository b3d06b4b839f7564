//! URL utilities for consistent endpoint construction.
//!
//! The server base URL comes from configuration or a CLI flag, so trailing
//! slashes are normalized here to keep the constructed endpoints stable.

/// Normalize a base URL by removing trailing slashes.
///
/// # Examples
///
/// ```
/// use chatline::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://chat.example.com"), "https://chat.example.com");
/// assert_eq!(normalize_base_url("https://chat.example.com/"), "https://chat.example.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without producing double slashes.
///
/// # Examples
///
/// ```
/// use chatline::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://chat.example.com/", "api/v1/user"),
///     "https://chat.example.com/api/v1/user"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_any_number_of_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://chat.example.com///"),
            "https://chat.example.com"
        );
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn construct_handles_leading_slash_on_endpoint() {
        assert_eq!(
            construct_api_url("https://chat.example.com", "/api/v1/user/me"),
            "https://chat.example.com/api/v1/user/me"
        );
    }
}
