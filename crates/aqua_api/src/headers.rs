use std::collections::BTreeMap;

use crate::config::ApiConfig;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Build a deterministic header map for one API call.
///
/// Later layers win: defaults, then config extras, then per-request headers.
/// The bearer credential is applied last so request headers cannot spoof it.
/// `content-type` is only set for calls that carry a JSON body.
pub fn build_headers(
    config: &ApiConfig,
    request_headers: &BTreeMap<String, String>,
    access_token: Option<&str>,
    has_body: bool,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();

    headers.insert(HEADER_ACCEPT.to_owned(), JSON_MEDIA_TYPE.to_owned());
    if has_body {
        headers.insert(HEADER_CONTENT_TYPE.to_owned(), JSON_MEDIA_TYPE.to_owned());
    }

    let ua = config
        .user_agent
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in config.extra_headers.iter().chain(request_headers) {
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() || key == HEADER_AUTHORIZATION {
            continue;
        }
        headers.insert(key, value.trim().to_owned());
    }

    if let Some(token) = access_token.map(str::trim).filter(|token| !token.is_empty()) {
        headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {token}"));
    }

    headers
}

/// `aquadiary/<version> (<os> <release>; <arch>)`, or just the product token
/// when the kernel release cannot be read.
fn default_user_agent() -> String {
    let product = concat!("aquadiary/", env!("CARGO_PKG_VERSION"));
    match kernel_release() {
        Some(release) => format!(
            "{product} ({} {release}; {})",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
        None => product.to_owned(),
    }
}

#[cfg(unix)]
fn kernel_release() -> Option<String> {
    use std::ffi::CStr;
    use std::mem::MaybeUninit;

    let mut name = MaybeUninit::<libc::utsname>::uninit();
    // SAFETY: `uname` fully initializes the struct when it returns 0.
    if unsafe { libc::uname(name.as_mut_ptr()) } != 0 {
        return None;
    }
    // SAFETY: checked above.
    let name = unsafe { name.assume_init() };
    // SAFETY: `release` is a NUL-terminated array owned by `name`.
    let release = unsafe { CStr::from_ptr(name.release.as_ptr()) }
        .to_string_lossy()
        .trim()
        .to_owned();
    (!release.is_empty()).then_some(release)
}

#[cfg(not(unix))]
fn kernel_release() -> Option<String> {
    None
}
