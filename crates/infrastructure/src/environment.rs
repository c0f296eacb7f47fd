use regex::{Regex, RegexBuilder};
use tracing::warn;

use domain::values::{RoutePattern, RouteValues};

/// Resolve how the visitor entered the application.
///
/// The first referrer pattern matching `referrer` wins. When none matches, or
/// the match is the default route, URL parameters are probed in order against
/// `search`. Falls back to the default route.
pub fn entry_route(referrer: &str, search: &str, routes: &RouteValues) -> String {
    let from_referrer = routes
        .referrers
        .iter()
        .find(|pattern| matches(pattern, referrer, false))
        .map(|pattern| pattern.route.as_str());

    let needs_probe = from_referrer.is_none_or(|route| route == routes.default_route);
    let route = if needs_probe {
        routes
            .url_params
            .iter()
            .find(|pattern| matches(pattern, search, true))
            .map(|pattern| pattern.route.as_str())
            .or(from_referrer)
    } else {
        from_referrer
    };

    route.unwrap_or(&routes.default_route).to_string()
}

fn matches(pattern: &RoutePattern, text: &str, as_param: bool) -> bool {
    let compiled = if as_param {
        RegexBuilder::new(&format!(r"[\?&]{}=", pattern.pattern))
            .case_insensitive(true)
            .build()
    } else {
        Regex::new(&pattern.pattern)
    };

    match compiled {
        Ok(regex) => regex.is_match(text),
        Err(e) => {
            warn!(pattern = %pattern.pattern, error = %e, "⚠️ Skipping invalid route pattern");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> RouteValues {
        let pattern = |pattern: &str, route: &str| RoutePattern {
            pattern: pattern.to_string(),
            route: route.to_string(),
        };

        RouteValues {
            default_route: "direct".to_string(),
            referrers: vec![
                pattern("^$", "direct"),
                pattern(r"google\.", "search"),
                pattern(r"bank\.example/online", "online banking"),
                pattern("([", "broken"),
            ],
            url_params: vec![pattern("utm_source", "campaign"), pattern("gclid", "paid search")],
        }
    }

    #[test]
    fn test_referrer_match_wins() {
        assert_eq!(
            entry_route("https://www.google.com/", "?utm_source=mail", &routes()),
            "search"
        );
    }

    #[test]
    fn test_default_referrer_probes_url_params() {
        assert_eq!(entry_route("", "?a=1&UTM_SOURCE=mail", &routes()), "campaign");
        assert_eq!(entry_route("", "?gclid=xyz", &routes()), "paid search");
    }

    #[test]
    fn test_fallback_to_default() {
        assert_eq!(entry_route("", "", &routes()), "direct");
        assert_eq!(entry_route("https://elsewhere.example/", "?x=1", &routes()), "direct");
    }

    #[test]
    fn test_param_must_be_a_whole_key() {
        assert_eq!(entry_route("", "?not_utm_source=1", &routes()), "direct");
    }
}
