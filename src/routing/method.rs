//! Supported HTTP methods and the per-path handler bundle.

use std::fmt;
use std::str::FromStr;

use crate::routing::table::Endpoint;

/// The six methods a route can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Head,
        Method::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    /// Map a host method; anything outside the supported six is `None`.
    pub fn from_http(method: &axum::http::Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method token is not one of the supported six.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported method {0:?}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}

/// One endpoint slot per method for a single path.
#[derive(Clone, Default)]
pub struct MethodHandlers {
    get: Option<Endpoint>,
    post: Option<Endpoint>,
    put: Option<Endpoint>,
    delete: Option<Endpoint>,
    head: Option<Endpoint>,
    options: Option<Endpoint>,
}

impl MethodHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle answering every method with the same endpoint.
    pub fn uniform(endpoint: Endpoint) -> Self {
        let mut bundle = Self::new();
        for method in Method::ALL {
            bundle.set(method, endpoint.clone());
        }
        bundle
    }

    fn slot(&self, method: Method) -> &Option<Endpoint> {
        match method {
            Method::Get => &self.get,
            Method::Post => &self.post,
            Method::Put => &self.put,
            Method::Delete => &self.delete,
            Method::Head => &self.head,
            Method::Options => &self.options,
        }
    }

    fn slot_mut(&mut self, method: Method) -> &mut Option<Endpoint> {
        match method {
            Method::Get => &mut self.get,
            Method::Post => &mut self.post,
            Method::Put => &mut self.put,
            Method::Delete => &mut self.delete,
            Method::Head => &mut self.head,
            Method::Options => &mut self.options,
        }
    }

    /// Replace the endpoint for `method`, returning the previous one.
    pub fn set(&mut self, method: Method, endpoint: Endpoint) -> Option<Endpoint> {
        self.slot_mut(method).replace(endpoint)
    }

    pub fn get(&self, method: Method) -> Option<&Endpoint> {
        self.slot(method).as_ref()
    }

    pub fn contains(&self, method: Method) -> bool {
        self.slot(method).is_some()
    }

    /// Registered methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.contains(*m))
    }

    pub fn is_empty(&self) -> bool {
        self.methods().next().is_none()
    }
}

impl fmt::Debug for MethodHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response;
    use crate::routing::table::endpoint;
    use axum::http::StatusCode;

    fn status(code: StatusCode) -> Endpoint {
        endpoint(move |_req| async move { Ok(response::empty(code)) })
    }

    #[test]
    fn test_parse_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
        assert_eq!(
            "PATCH".parse::<Method>(),
            Err(UnsupportedMethod("PATCH".into()))
        );
    }

    #[test]
    fn test_from_http() {
        assert_eq!(Method::from_http(&axum::http::Method::OPTIONS), Some(Method::Options));
        assert_eq!(Method::from_http(&axum::http::Method::PATCH), None);
        assert_eq!(Method::from_http(&axum::http::Method::TRACE), None);
    }

    #[test]
    fn test_set_keeps_siblings() {
        let mut bundle = MethodHandlers::new();
        assert!(bundle.set(Method::Get, status(StatusCode::OK)).is_none());
        bundle.set(Method::Post, status(StatusCode::CREATED));
        assert!(bundle.set(Method::Get, status(StatusCode::ACCEPTED)).is_some());

        assert_eq!(bundle.methods().collect::<Vec<_>>(), vec![Method::Get, Method::Post]);
        assert!(!bundle.contains(Method::Delete));
    }

    #[test]
    fn test_uniform_fills_every_slot() {
        let bundle = MethodHandlers::uniform(status(StatusCode::OK));
        assert_eq!(bundle.methods().count(), 6);
        assert!(!bundle.is_empty());
        assert!(MethodHandlers::new().is_empty());
    }
}
