use reqwest::Url;

const SHARE_ENDPOINT: &str = "https://www.linkedin.com/sharing/share-offsite/";

/// Builds the share-intent URL: the target network's share endpoint
/// pre-filled with the variant text and page URL, both query-encoded.
/// Opening it in a new browsing context is the caller's fire-and-forget
/// concern — nothing is tracked here.
pub fn share_url(text: &str, page_url: &str) -> String {
    Url::parse_with_params(SHARE_ENDPOINT, &[("url", page_url), ("text", text)])
        .map(|u| u.to_string())
        .unwrap_or_else(|_| SHARE_ENDPOINT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_url_targets_share_endpoint_with_both_params() {
        let url = share_url("Our Q3 revenue grew 40%.", "https://remix.example/post/1");
        assert!(url.starts_with("https://www.linkedin.com/sharing/share-offsite/?"));
        assert!(url.contains("url=https"));
        assert!(url.contains("text="));
    }

    #[test]
    fn test_share_url_encodes_reserved_characters() {
        let url = share_url("growth & profit? 100%", "https://remix.example/?a=b");
        assert!(!url.contains("growth & profit"));
        assert!(url.contains("growth+%26+profit%3F+100%25"));
    }
}
