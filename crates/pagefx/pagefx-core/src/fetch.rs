//! Content fetching and extraction of the parts a swap needs.

use crate::error::PageError;
use crate::host::{Dom, Fetcher, Method, Response, Selector};

impl Response {
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `PageError::Fetch`.
    pub fn ensure_success(self) -> Result<Self, PageError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(PageError::Fetch {
                status: self.status,
                status_text: self.status_text,
            })
        }
    }
}

/// Issue one request and resolve only on a 2xx status. No retries, no timeout.
pub async fn get_content<F: Fetcher>(
    fetcher: &F,
    url: &str,
    method: Method,
) -> Result<Response, PageError> {
    fetcher.fetch(url, method).await?.ensure_success()
}

/// Title and main-content fragment of a fetched document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot<E> {
    pub title: String,
    pub content: E,
}

impl<E: Clone + PartialEq> PageSnapshot<E> {
    /// Parse `body` and pull out the `<title>` text and the first element carrying
    /// `content_marker`. Either one missing is a `MalformedResponse`.
    pub fn extract<D>(dom: &D, url: &str, body: &str, content_marker: &str) -> Result<Self, PageError>
    where
        D: Dom<Element = E>,
    {
        let malformed = |reason: &str| PageError::MalformedResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let root = dom
            .parse_document(body)
            .ok_or_else(|| malformed("document could not be parsed"))?;
        let title = dom
            .query_first(Some(&root), &Selector::tag("title"))
            .and_then(|t| dom.text_content(&t))
            .ok_or_else(|| malformed("no <title> element"))?;
        let content = dom
            .query_first(Some(&root), &Selector::attr(content_marker))
            .ok_or_else(|| malformed(&format!("no [{content_marker}] element")))?;

        Ok(PageSnapshot { title, content })
    }
}
