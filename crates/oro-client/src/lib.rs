//! A small client for the login-related parts of the NPM registry API.

use url::Url;

mod api;
mod client;
mod error;
mod notify;

pub use api::login;
pub use client::OroClient;
pub use error::OroClientError;

/// Converts a registry URL into its "nerf dart" form, `//host[:port]/path`,
/// which is the prefix used for per-registry configuration keys. Default
/// ports are left out.
pub fn nerf_dart(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("//{host}:{port}{}", url.path()),
        None => format!("//{host}{}", url.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nerf_dart_drops_scheme_and_query() {
        let url = Url::parse("https://registry.npmjs.org/").unwrap();
        assert_eq!(nerf_dart(&url), "//registry.npmjs.org/");

        let url = Url::parse("http://localhost:4873/npm/private/?x=1").unwrap();
        assert_eq!(nerf_dart(&url), "//localhost:4873/npm/private/");
    }

    #[test]
    fn nerf_dart_keeps_ports_apart() {
        let a = Url::parse("http://localhost:4873/").unwrap();
        let b = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(nerf_dart(&a), "//localhost:4873/");
        assert_eq!(nerf_dart(&b), "//localhost:8080/");

        let url = Url::parse("https://registry.npmjs.org:443/").unwrap();
        assert_eq!(nerf_dart(&url), "//registry.npmjs.org/");
    }
}
