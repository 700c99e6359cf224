use crate::geo::LatLng;

/// Query parameter carrying a shared destination.
pub const DEST_PARAM: &str = "dest";

/// `scheme://host` part of a page URL.
pub fn origin(href: &str) -> &str {
    let Some(scheme_end) = href.find("://") else {
        return href.split(['/', '?', '#']).next().unwrap_or(href);
    };
    let rest = &href[scheme_end + 3..];
    let host_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &href[..scheme_end + 3 + host_len]
}

/// Link that opens the page with `destination` preset.
pub fn share_url(href: &str, destination: LatLng) -> String {
    format!("{}?{DEST_PARAM}={destination}", origin(href))
}

/// Destination preset by a shared link, if the page URL carries a valid one.
pub fn shared_destination(href: &str) -> Option<LatLng> {
    let (_, query) = href.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == DEST_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path_and_query() {
        assert_eq!(origin("https://walk.example/path?x=1"), "https://walk.example");
        assert_eq!(origin("http://localhost:3000"), "http://localhost:3000");
        assert_eq!(origin("http://localhost:3000/#top"), "http://localhost:3000");
    }

    #[test]
    fn share_links_round_trip() {
        let destination = LatLng::new(37.4979, 127.0276);
        let link = share_url("https://walk.example/path", destination);
        assert_eq!(link, "https://walk.example?dest=37.4979,127.0276");
        assert_eq!(shared_destination(&link), Some(destination));
    }

    #[test]
    fn encoded_and_noisy_queries_are_understood() {
        assert_eq!(
            shared_destination("https://walk.example/?utm=x&dest=37.5%2C127.1#map"),
            Some(LatLng::new(37.5, 127.1))
        );
    }

    #[test]
    fn malformed_destinations_are_ignored() {
        assert_eq!(shared_destination("https://walk.example/path"), None);
        assert_eq!(shared_destination("https://walk.example/?dest=nowhere"), None);
        assert_eq!(shared_destination("https://walk.example/?dest=200,10"), None);
        assert_eq!(shared_destination("https://walk.example/?destination=1,2"), None);
    }
}
