use std::collections::{BTreeMap, HashSet};
use url::Url;

// * Normalizes a URL to a unique, deterministic representation.
// *
// * 1. Join href with base_url.
// * 2. Strip Fragment (#).
// * 3. Lowercase Hostname.
// * 4. Remove Tracking Parameters (utm_*, gclid, etc.).
// * 5. Sort Query Parameters alphabetically.
pub fn normalize_url(href: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let mut url = base.join(href).ok()?;

    url.set_fragment(None);

    if let Some(host) = url.host_str() {
        let lower_host = host.to_lowercase();
        if url.set_host(Some(&lower_host)).is_err() {
            return None;
        }
    }

    // * BTreeMap keeps the surviving keys sorted
    let mut clean_pairs = BTreeMap::new();

    // ! Stat sites append these to cross-site links (player-finder-links etc.)
    let drop_params: HashSet<&str> = [
        "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content", "gclid", "fbclid",
    ]
    .into();

    for (k, v) in url.query_pairs() {
        let key_lower = k.to_lowercase();
        if !drop_params.contains(key_lower.as_str()) {
            clean_pairs.insert(k.into_owned(), v.into_owned());
        }
    }

    if clean_pairs.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url.query_pairs_mut();
        serializer.clear();
        for (k, v) in clean_pairs {
            serializer.append_pair(&k, &v);
        }
    }

    Some(url.to_string())
}

// * Joins `path` onto `base_url` and appends query parameters in the given order.
pub fn build_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let mut url = base.join(path).ok()?;

    if !params.is_empty() {
        let mut serializer = url.query_pairs_mut();
        for (k, v) in params {
            serializer.append_pair(k, v);
        }
    }

    Some(url.to_string())
}

// * Lowercased host of an absolute URL
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.to_lowercase())
}
