//! HTTP page fetcher for deep-context verification

use crate::config::FetchConfig;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use vendorscope_classifiers::{PageFetcher, PageText};
use vendorscope_core::{Error, Result};

/// Fetches a page and extracts its title, meta description and visible text
pub struct HttpPageFetcher {
    client: Client,
    max_text_chars: usize,
    title: Regex,
    description: Regex,
    script: Regex,
    style: Regex,
    tag: Regex,
    whitespace: Regex,
}

impl HttpPageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to build page client: {}", e)))?;

        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::internal(format!("Failed to compile page regex: {}", e)))
        };

        Ok(Self {
            client,
            max_text_chars: config.max_text_chars,
            title: compile(r"(?is)<title[^>]*>([^<]+)</title>")?,
            description: compile(
                r#"(?is)<meta\s+name=["']description["']\s+content=["']([^"']+)["']"#,
            )?,
            script: compile(r"(?is)<script[^>]*>.*?</script>")?,
            style: compile(r"(?is)<style[^>]*>.*?</style>")?,
            tag: compile(r"<[^>]+>")?,
            whitespace: compile(r"\s+")?,
        })
    }

    /// Extract readable text from raw HTML
    pub fn extract(&self, html: &str) -> PageText {
        let capture = |re: &Regex| {
            re.captures(html)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        };

        let body = self.script.replace_all(html, " ");
        let body = self.style.replace_all(&body, " ");
        let body = self.tag.replace_all(&body, " ");
        let body = self.whitespace.replace_all(&body, " ");
        let body: String = body.trim().chars().take(self.max_text_chars).collect();

        PageText {
            title: capture(&self.title),
            description: capture(&self.description),
            body,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<PageText> {
        let parsed = url::Url::parse(url).map_err(|e| Error::fetch(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::fetch(format!("{}: unsupported scheme", url)));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| Error::fetch(format!("{}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::fetch(format!("{}: status {}", url, response.status())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("{}: {}", url, e)))?;

        let page = self.extract(&html);
        debug!(url = %url, chars = page.body.chars().count(), "Page fetched");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(limit: usize) -> HttpPageFetcher {
        HttpPageFetcher::new(&FetchConfig {
            max_text_chars: limit,
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_extract() {
        let html = r#"<html><head>
            <title>Acme implanta Protheus</title>
            <meta name="description" content="Case de sucesso">
            <style>.x { color: red }</style>
            <script>var tracking = "TOTVS";</script>
            </head><body><h1>Acme</h1>
            <p>A Acme concluiu a   implantação.</p></body></html>"#;

        let page = fetcher(1000).extract(html);
        assert_eq!(page.title, "Acme implanta Protheus");
        assert_eq!(page.description, "Case de sucesso");
        assert!(page.body.contains("A Acme concluiu a implantação."));
        assert!(!page.body.contains("tracking"));
        assert!(!page.body.contains("color"));
    }

    #[test]
    fn test_body_truncated_on_char_boundary() {
        let html = format!("<p>{}</p>", "ação ".repeat(100));
        let page = fetcher(10).extract(&html);
        assert_eq!(page.body.chars().count(), 10);
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let err = fetcher(10).fetch("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }
}
