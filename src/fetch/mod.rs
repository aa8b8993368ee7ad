mod extractor;

use std::net::{IpAddr, Ipv6Addr};
use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use extractor::extract_document;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::document::Document;

const MAX_RESPONSE_BYTES: usize = 10_000_000;
/// Bound on the whole page request, connect through last body byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("blocked: internal/private host not allowed")]
    InternalHost,

    #[error("fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("fetch failed: status {0}")]
    Status(u16),

    #[error("response too large (>{} bytes)", MAX_RESPONSE_BYTES)]
    TooLarge,
}

impl FetchError {
    /// True when the URL itself was rejected and no request was attempted.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidScheme | FetchError::InvalidUrl(_) | FetchError::InternalHost
        )
    }
}

/// Which hosts the fetcher may contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostPolicy {
    /// Refuse loopback, private, and link-local targets.
    #[default]
    PublicOnly,
    AllowPrivate,
}

pub async fn fetch_document(
    client: &Client,
    url: &str,
    policy: HostPolicy,
) -> Result<Document, FetchError> {
    validate_url(url, policy)?;
    // TOCTOU gap: DNS may differ between this check and reqwest's connection.
    if policy == HostPolicy::PublicOnly {
        check_dns(url).await?;
    }

    let (final_url, html) = download(client, url).await?;

    // Re-validate after redirects to block content from internal hosts.
    validate_url(&final_url, policy)?;

    let document = extract_document(&html);
    debug!(
        url = %final_url,
        bytes = html.len(),
        body_chars = document.body.chars().count(),
        "page fetched"
    );
    Ok(document)
}

async fn download(client: &Client, url: &str) -> Result<(String, String), FetchError> {
    let response = client
        .get(url)
        .header("User-Agent", crate::USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let encoding = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_from_content_type)
        .unwrap_or(UTF_8);

    if let Some(len) = response.content_length()
        && len as usize > MAX_RESPONSE_BYTES
    {
        return Err(FetchError::TooLarge);
    }

    let mut body = Vec::new();
    let mut stream = response;
    while let Some(chunk) = stream.chunk().await? {
        body.extend_from_slice(&chunk);
        if body.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::TooLarge);
        }
    }
    let (html, _, had_errors) = encoding.decode(&body);
    if had_errors {
        debug!(url = %final_url, encoding = encoding.name(), "replaced malformed byte sequences");
    }
    Ok((final_url, html.into_owned()))
}

fn charset_from_content_type(value: &str) -> Option<&'static Encoding> {
    value.split(';').skip(1).find_map(|param| {
        let (key, label) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(label.trim().trim_matches('"').as_bytes())
        } else {
            None
        }
    })
}

fn validate_url(raw: &str, policy: HostPolicy) -> Result<(), FetchError> {
    let parsed = url::Url::parse(raw)?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(FetchError::InvalidScheme),
    }

    if policy == HostPolicy::PublicOnly && is_blocked_host(&parsed) {
        warn!(url = %raw, "blocked fetch to internal/private host");
        return Err(FetchError::InternalHost);
    }

    Ok(())
}

async fn check_dns(raw: &str) -> Result<(), FetchError> {
    let parsed = url::Url::parse(raw)?;
    let domain = match parsed.host() {
        Some(url::Host::Domain(d)) => d.to_string(),
        _ => return Ok(()),
    };

    let port = parsed.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host(format!("{domain}:{port}"))
        .await
        .map_err(|e| FetchError::DnsResolution(e.to_string()))?;

    for addr in addrs {
        if is_private_ip(addr.ip()) {
            warn!(host = %domain, ip = %addr.ip(), "DNS resolves to private IP");
            return Err(FetchError::InternalHost);
        }
    }

    Ok(())
}

fn is_blocked_host(parsed: &url::Url) -> bool {
    match parsed.host() {
        Some(url::Host::Ipv4(v4)) => is_private_ip(IpAddr::V4(v4)),
        Some(url::Host::Ipv6(v6)) => is_private_ip(IpAddr::V6(v6)),
        Some(url::Host::Domain(domain)) => {
            let lower = domain.to_ascii_lowercase();
            lower == "localhost"
                || lower.ends_with(".localhost")
                || lower.ends_with(".local")
                || lower.ends_with(".internal")
        }
        None => true,
    }
}

fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || v6.is_unspecified()
                || is_ipv6_link_local(&v6)
                || is_ipv6_unique_local(&v6)
                || v6.to_ipv4_mapped().is_some_and(|v4| is_private_ip(IpAddr::V4(v4)))
        }
    }
}

fn is_ipv6_link_local(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

fn is_ipv6_unique_local(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(url: &str) -> Result<(), FetchError> {
        validate_url(url, HostPolicy::PublicOnly)
    }

    #[test]
    fn rejects_non_http_url() {
        assert!(matches!(validate("ftp://example.com"), Err(FetchError::InvalidScheme)));
        assert!(matches!(validate("file:///tmp/test"), Err(FetchError::InvalidScheme)));
    }

    #[test]
    fn rejects_malformed_url() {
        let err = validate("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(validate("http://example.com").is_ok());
        assert!(validate("https://example.com/article?id=1").is_ok());
    }

    #[test]
    fn rejects_localhost_and_private_ips() {
        for url in [
            "http://localhost/secret",
            "http://evil.localhost/secret",
            "http://127.0.0.1/secret",
            "http://10.0.0.1/internal",
            "http://192.168.1.1/router",
            "http://172.16.0.1/internal",
            "http://169.254.169.254/latest/meta-data",
            "http://printer.local/",
        ] {
            assert!(
                matches!(validate(url), Err(FetchError::InternalHost)),
                "should block {url}"
            );
        }
    }

    #[test]
    fn rejects_internal_ipv6() {
        for url in [
            "http://[::1]/secret",
            "http://[::ffff:127.0.0.1]/secret",
            "http://[fe80::1]/secret",
            "http://[fd00::1]/secret",
        ] {
            assert!(
                matches!(validate(url), Err(FetchError::InternalHost)),
                "should block {url}"
            );
        }
    }

    #[test]
    fn accepts_public_ips() {
        assert!(validate("https://8.8.8.8/dns").is_ok());
        assert!(validate("http://[2001:db8::1]/page").is_ok());
    }

    #[test]
    fn allow_private_policy_skips_host_check() {
        assert!(validate_url("http://127.0.0.1:8080/page", HostPolicy::AllowPrivate).is_ok());
        assert!(matches!(
            validate_url("ftp://127.0.0.1/", HostPolicy::AllowPrivate),
            Err(FetchError::InvalidScheme)
        ));
    }

    #[test]
    fn network_failures_are_not_invalid_input() {
        assert!(!FetchError::Status(404).is_invalid_input());
        assert!(!FetchError::TooLarge.is_invalid_input());
    }

    #[test]
    fn parses_charset_parameter() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-2"),
            Some(encoding_rs::ISO_8859_2)
        );
        assert_eq!(
            charset_from_content_type(r#"text/html; Charset="utf-8""#),
            Some(UTF_8)
        );
        assert_eq!(charset_from_content_type("text/html"), None);
        assert_eq!(charset_from_content_type("text/html; charset=bogus"), None);
    }
}
