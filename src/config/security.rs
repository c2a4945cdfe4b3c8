use std::env;

use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";

/// Static security response headers for every route. HSTS is only added in
/// production, where the service sits behind HTTPS.
pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    let mut layers = vec![
        header_layer("x-content-type-options", NOSNIFF),
        header_layer("x-frame-options", DENY),
        header_layer("content-security-policy", CSP_API_VALUE),
        header_layer("referrer-policy", REFERRER_POLICY_VALUE),
    ];

    if hsts_enabled() {
        tracing::info!("Security: HSTS header enabled (production mode)");
        layers.push(header_layer("strict-transport-security", HSTS_VALUE));
    } else {
        tracing::info!("Security: HSTS header disabled (development mode)");
    }

    layers
}

fn header_layer(name: &'static str, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

fn hsts_enabled() -> bool {
    env::var("RUST_ENV")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_values_parse() {
        for value in [NOSNIFF, DENY, HSTS_VALUE, CSP_API_VALUE, REFERRER_POLICY_VALUE] {
            assert!(value.parse::<HeaderValue>().is_ok());
        }
    }

    #[test]
    fn hsts_defaults_off_outside_production() {
        std::env::remove_var("RUST_ENV");
        assert!(!hsts_enabled());
        assert_eq!(security_header_layers().len(), 4);
    }
}
