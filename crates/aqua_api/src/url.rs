/// Default API base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";

/// Join a base URL and a resource path into an absolute endpoint.
///
/// Joining rules:
/// 1) an empty base falls back to [`DEFAULT_API_BASE_URL`]
/// 2) exactly one `/` separates base and path
/// 3) an empty path yields the trimmed base
pub fn join_api_url(base: &str, path: &str) -> String {
    let base = if base.trim().is_empty() {
        DEFAULT_API_BASE_URL
    } else {
        base.trim()
    };

    let base = base.trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{base}/{path}")
}
