// src/mediator/rewrite.rs
// =============================================================================
// Turns an untrusted outbound URL into a link to the redirect page.
//
//   https://evil.com/x  ->  /go?u=aHR0cHM6Ly9ldmlsLmNvbS94
//
// The result always starts with '/', which classify() treats as Internal.
// That is what makes mediate() (and therefore sweep()) idempotent: a link that
// was already rewritten is never rewritten again.
// =============================================================================

use super::classify::{classify, LinkClass};
use super::codec;
use crate::config::{DarkMode, MediationConfig};
use crate::error::MediationError;
use url::Url;

/// Path of the interstitial redirect page
pub const REDIRECT_PATH: &str = "/go";

/// Query parameter that carries the target
pub const TARGET_PARAM: &str = "u";

// Returns the href the page should use for `url`
//
// Unchanged when mediation is off, the URL is empty, or the URL is
// Internal/Trusted. Otherwise "/go?u=<token>" (or the raw URL when base64
// encoding is turned off).
pub fn mediate(url: &str, config: &MediationConfig) -> String {
    if !config.enable || url.is_empty() {
        return url.to_string();
    }

    match classify(url, &config.trusted_domains) {
        LinkClass::Internal | LinkClass::Trusted => url.to_string(),
        LinkClass::Untrusted => {
            let target = if config.enable_base64_encode {
                codec::encode(url)
            } else {
                url.to_string()
            };
            format!("{}?{}={}", REDIRECT_PATH, TARGET_PARAM, target)
        }
    }
}

/// Link to the redirect page for a target, for hosts that build it in code
pub fn redirect_page_url(target: &str, config: &MediationConfig) -> String {
    mediate(target, config)
}

/// What the redirect page needs to render: where to go, how long to wait,
/// and which color scheme to use
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectParams {
    pub target: String,
    pub countdown_seconds: u32,
    pub dark_mode: DarkMode,
}

impl RedirectParams {
    // Rebuilds the parameters from a mediated href such as "/go?u=..."
    //
    // Returns Ok(None) when the href does not point at the redirect page.
    pub fn from_href(href: &str, config: &MediationConfig) -> Result<Option<Self>, MediationError> {
        // Relative hrefs need a base before the url crate will parse them
        let base = Url::parse("http://localhost/").map_err(|e| MediationError::MalformedUrl {
            url: href.to_string(),
            reason: e.to_string(),
        })?;
        let parsed = base.join(href).map_err(|e| MediationError::MalformedUrl {
            url: href.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.path() != REDIRECT_PATH {
            return Ok(None);
        }

        let raw = match raw_target_param(href) {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let target = if config.enable_base64_encode {
            codec::decode(raw)?
        } else {
            raw.to_string()
        };

        Ok(Some(Self {
            target,
            countdown_seconds: config.countdown_seconds,
            dark_mode: config.dark_mode,
        }))
    }
}

// The unencoded form appends the raw URL, which may itself contain '&' and
// '=', so everything after "u=" is the target. Tokens never contain either.
fn raw_target_param(href: &str) -> Option<&str> {
    let (_, query) = href.split_once('?')?;
    let prefix = format!("{}=", TARGET_PARAM);
    query.strip_prefix(prefix.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // http(s) URLs with hosts that are sometimes trusted, sometimes not
    fn web_url() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("http"), Just("https"), Just("HTTPS")],
            "([a-z0-9-]{1,12}\\.){0,2}(trusted\\.com|[a-z]{1,10}\\.(com|org|top))",
            "(/[a-zA-Z0-9._~%-]{0,12}){0,3}",
            "(\\?[a-z]{1,6}=[a-zA-Z0-9&=/+]{0,12})?",
        )
            .prop_map(|(scheme, host, path, query)| format!("{}://{}{}{}", scheme, host, path, query))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_mediate_idempotent_for_web_urls(url in web_url(), base64 in any::<bool>()) {
            let config = MediationConfig {
                enable_base64_encode: base64,
                ..config()
            };
            let once = mediate(&url, &config);
            prop_assert_eq!(mediate(&once, &config), once);
        }

        #[test]
        fn prop_mediate_idempotent_for_any_string(url in any::<String>(), base64 in any::<bool>()) {
            let config = MediationConfig {
                enable_base64_encode: base64,
                ..config()
            };
            let once = mediate(&url, &config);
            prop_assert_eq!(mediate(&once, &config), once);
        }

        #[test]
        fn prop_untrusted_web_url_round_trips_through_redirect(url in web_url()) {
            let config = config();
            let mediated = mediate(&url, &config);
            if mediated != url {
                let params = RedirectParams::from_href(&mediated, &config).unwrap().unwrap();
                prop_assert_eq!(params.target, url);
            }
        }
    }

    fn config() -> MediationConfig {
        MediationConfig::default().with_trusted_domains(["trusted.com"])
    }

    #[test]
    fn test_untrusted_is_encoded() {
        assert_eq!(
            mediate("https://evil.com/x", &config()),
            "/go?u=aHR0cHM6Ly9ldmlsLmNvbS94"
        );
    }

    #[test]
    fn test_without_base64() {
        let config = MediationConfig {
            enable_base64_encode: false,
            ..config()
        };
        assert_eq!(
            mediate("https://evil.com/x?a=1&b=2", &config),
            "/go?u=https://evil.com/x?a=1&b=2"
        );
    }

    #[test]
    fn test_trusted_internal_and_empty_pass_through() {
        let config = config();
        for url in ["https://blog.trusted.com/post", "/about", "#top", "mailto:a@b.c", ""] {
            assert_eq!(mediate(url, &config), url);
        }
    }

    #[test]
    fn test_disabled_passes_everything_through() {
        let config = MediationConfig {
            enable: false,
            ..config()
        };
        assert_eq!(mediate("https://evil.com/x", &config), "https://evil.com/x");
    }

    #[test]
    fn test_mediate_is_idempotent() {
        for base64 in [true, false] {
            let config = MediationConfig {
                enable_base64_encode: base64,
                ..config()
            };
            for url in ["https://evil.com/x", "https://a.trusted.com", "/x", "ftp://f.org"] {
                let once = mediate(url, &config);
                assert_eq!(mediate(&once, &config), once);
            }
        }
    }

    #[test]
    fn test_redirect_params_round_trip() {
        let config = MediationConfig {
            countdown_seconds: 7,
            dark_mode: DarkMode::On,
            ..config()
        };
        let href = redirect_page_url("https://evil.com/x?q=1", &config);
        let params = RedirectParams::from_href(&href, &config).unwrap().unwrap();
        assert_eq!(params.target, "https://evil.com/x?q=1");
        assert_eq!(params.countdown_seconds, 7);
        assert_eq!(params.dark_mode, DarkMode::On);
    }

    #[test]
    fn test_redirect_params_raw_target() {
        let config = MediationConfig {
            enable_base64_encode: false,
            ..config()
        };
        let href = mediate("https://evil.com/x?a=1&b=2", &config);
        let params = RedirectParams::from_href(&href, &config).unwrap().unwrap();
        assert_eq!(params.target, "https://evil.com/x?a=1&b=2");
    }

    #[test]
    fn test_redirect_params_ignores_other_pages() {
        assert_eq!(RedirectParams::from_href("/about", &config()).unwrap(), None);
        assert_eq!(RedirectParams::from_href("/go?x=1", &config()).unwrap(), None);
    }
}
