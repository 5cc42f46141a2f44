//! Per-request authorization decision. No state beyond the two inputs.

use url::form_urlencoded;

pub const PROTECTED_PREFIX: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// Not signed in on a protected path; the caller sends the user to log in.
    Deny,
    Redirect(String),
}

/// Paths the gate never looks at: API routes, static assets and images.
pub fn is_guarded(path: &str) -> bool {
    let exempt = ["/api", "/static"]
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")));
    !(exempt || path.ends_with(".png"))
}

pub fn is_protected(path: &str) -> bool {
    path == PROTECTED_PREFIX || path.starts_with(&format!("{PROTECTED_PREFIX}/"))
}

pub fn authorize(is_authenticated: bool, path: &str) -> Access {
    if !is_guarded(path) {
        return Access::Allow;
    }
    match (is_protected(path), is_authenticated) {
        (true, true) => Access::Allow,
        (true, false) => Access::Deny,
        (false, true) => Access::Redirect(PROTECTED_PREFIX.to_string()),
        (false, false) => Access::Allow,
    }
}

/// Login URL that returns the user to `target` afterwards.
pub fn login_redirect(target: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", target)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

/// Accept only local absolute paths as post-login destinations. The target
/// becomes a `Location` header, so it must be visible ASCII throughout.
pub fn safe_callback(callback: Option<&str>) -> &str {
    match callback {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains('\\')
                && target.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            target
        }
        _ => PROTECTED_PREFIX,
    }
}
