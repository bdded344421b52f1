/// Separator between a namespace and the key inside it.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Cache key for the current user's appointment list.
pub const APPOINTMENTS_KEY: &str = "appointments";

/// Cache key for the service catalog.
pub const SERVICES_KEY: &str = "services";

/// Cache key for the professional directory.
pub const PROFESSIONALS_KEY: &str = "professionals";

/// Returns the medium key for `key` inside `namespace`.
///
/// # Examples
///
/// ```
/// use glowbook_core::cache::namespaced_key;
///
/// assert_eq!(namespaced_key("glowbook.appointments", "appointments"), "glowbook.appointments:appointments");
/// ```
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}{NAMESPACE_SEPARATOR}{key}")
}

/// Returns the prefix shared by every medium key in `namespace`.
pub fn namespace_prefix(namespace: &str) -> String {
    format!("{namespace}{NAMESPACE_SEPARATOR}")
}

/// Strips `namespace` from a medium key.
///
/// Returns `None` for keys that belong to another namespace.
///
/// # Examples
///
/// ```
/// use glowbook_core::cache::strip_namespace;
///
/// assert_eq!(strip_namespace("glowbook", "glowbook:services"), Some("services"));
/// assert_eq!(strip_namespace("glowbook", "glowbook2:services"), None);
/// ```
pub fn strip_namespace<'a>(namespace: &str, full_key: &'a str) -> Option<&'a str> {
    full_key
        .strip_prefix(namespace)?
        .strip_prefix(NAMESPACE_SEPARATOR)
}

/// Returns the namespace for a feature under an application prefix.
pub fn feature_namespace(app: &str, feature: &str) -> String {
    format!("{app}.{feature}")
}
