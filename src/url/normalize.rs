use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a site-scope prefix the way `normalize_url` normalizes pages
///
/// Scheme and host are lowercased so the prefix test compares like with
/// like. A bare origin gains its trailing `/`.
///
/// ```
/// use catalog_crawler::url::normalize_scope;
///
/// assert_eq!(normalize_scope("HTTPS://Shop.Example.com").unwrap(), "https://shop.example.com/");
/// ```
pub fn normalize_scope(prefix: &str) -> Result<String, UrlError> {
    let url = Url::parse(prefix.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }
    Ok(url.into())
}

/// Normalizes an absolute URL so the same page always maps to the same string
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme and a host
/// 3. Lowercase the host and resolve dot segments (done by the parser)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters, keeping the rest in their original order
/// 6. Remove an empty query string (trailing ?)
///
/// Query strings are otherwise kept intact: item variants such as
/// `/product/1?variant=blue` stay distinct pages.
///
/// # Examples
///
/// ```
/// use catalog_crawler::url::normalize_url;
///
/// let url = normalize_url("https://SHOP.example.com/a/../item/7?utm_source=x#reviews").unwrap();
/// assert_eq!(url.as_str(), "https://shop.example.com/item/7");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else if kept.len() != url.query_pairs().count() {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
