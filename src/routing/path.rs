//! Full-path composition for route registrations.

/// Compose `server_base + base_url + sub_path`.
///
/// A root sub-path (`"/"`) collapses to nothing when either prefix is
/// non-empty, so `/dogs` + `/` is `/dogs` and never `/dogs/`.
pub fn compose(server_base: &str, base_url: &str, sub_path: &str) -> String {
    let sub_path = if sub_path == "/" && (!base_url.is_empty() || !server_base.is_empty()) {
        ""
    } else {
        sub_path
    };

    let mut full = String::with_capacity(server_base.len() + base_url.len() + sub_path.len());
    full.push_str(server_base);
    full.push_str(base_url);
    full.push_str(sub_path);
    full
}
