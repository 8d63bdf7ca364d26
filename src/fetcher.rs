use crate::http_client::build_http_client;
use anyhow::{Context, Result, anyhow};
use thiserror::Error;
use url::Url;

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{0}': only http and https are supported")]
    UnsupportedScheme(String),
    #[error("Refusing to fetch {url}: only pages on {origin} can be analyzed")]
    CrossOrigin { url: String, origin: String },
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Stopped after {} redirects starting at {url}", MAX_REDIRECTS)]
    TooManyRedirects { url: String },
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub html: String,
}

/// Fetches live HTML, but only from the configured site origin.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    origin: Url,
}

impl PageFetcher {
    pub fn new(site_origin: &str, timeout_secs: u64) -> Result<Self> {
        let origin = Url::parse(site_origin)
            .with_context(|| format!("Invalid site origin: {}", site_origin))?;

        match origin.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(anyhow!(
                    "Invalid site origin scheme '{}': only http and https are supported",
                    scheme
                ));
            }
        }
        if origin.host_str().is_none() {
            return Err(anyhow!("Site origin has no host: {}", site_origin));
        }

        Ok(Self {
            client: build_http_client(timeout_secs)?,
            origin,
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Same scheme, host and effective port as the site origin
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin()
    }

    /// Resolves an absolute URL or site-relative path and checks it belongs to the site.
    /// Nothing is fetched.
    pub fn resolve(&self, target: &str) -> Result<Url, FetchError> {
        let target = target.trim();
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.origin
                    .join(target)
                    .map_err(|source| FetchError::InvalidUrl {
                        url: target.to_string(),
                        source,
                    })?
            }
            Err(source) => {
                return Err(FetchError::InvalidUrl {
                    url: target.to_string(),
                    source,
                });
            }
        };

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(FetchError::UnsupportedScheme(scheme.to_string())),
        }

        if !self.is_same_origin(&url) {
            tracing::warn!(url = %url, origin = %self.origin, "Rejected cross-origin analysis target");
            return Err(FetchError::CrossOrigin {
                url: url.to_string(),
                origin: self.origin.to_string(),
            });
        }

        Ok(url)
    }

    /// Fetches a same-origin page. Redirects are followed one hop at a time and each
    /// `Location` is checked against the origin before it is requested.
    pub async fn fetch(&self, target: &str) -> Result<FetchedPage, FetchError> {
        let start = self.resolve(target)?;
        let mut url = start.clone();
        let mut redirects = 0;

        let response = loop {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|source| FetchError::Request {
                    url: url.to_string(),
                    source,
                })?;

            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let Some(location) = location.filter(|_| response.status().is_redirection()) else {
                break response;
            };

            if redirects == MAX_REDIRECTS {
                return Err(FetchError::TooManyRedirects {
                    url: start.to_string(),
                });
            }
            redirects += 1;

            let next = url
                .join(location.trim())
                .map_err(|source| FetchError::InvalidUrl {
                    url: location.clone(),
                    source,
                })?;
            if !self.is_same_origin(&next) {
                tracing::warn!(url = %url, redirected_to = %next, "Page redirected off-site");
                return Err(FetchError::CrossOrigin {
                    url: next.to_string(),
                    origin: self.origin.to_string(),
                });
            }

            tracing::debug!(from = %url, to = %next, "Following redirect");
            url = next;
        };

        let final_url = url;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let ct_lower = content_type.to_lowercase();
            if !ct_lower.contains("text/html") && !ct_lower.contains("application/xhtml") {
                tracing::warn!(
                    url = %final_url,
                    content_type = %content_type,
                    "Non-HTML content type detected, analysis may be meaningless"
                );
            }
        }

        let html = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: final_url.to_string(),
                source,
            })?;

        tracing::info!(url = %final_url, bytes = html.len(), "Fetched page");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            html,
        })
    }
}
