//! Response format negotiation.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, Uri};
use serde::Serialize;

/// The representation a client asked for.
///
/// `Html` selects the browser flow (redirects and flash messages); every
/// other variant selects the machine flow (status codes and challenges).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    Html,
    Json,
    Xml,
    /// A non-empty `Accept` header naming nothing we recognise.
    Other,
}

impl ResponseFormat {
    /// A path extension wins over `Accept`.
    pub fn negotiate(uri: &Uri, headers: &HeaderMap) -> Self {
        Self::from_extension(uri.path()).unwrap_or_else(|| Self::from_accept(headers))
    }

    /// The format named by a path extension, plus the URI with that
    /// extension removed so it can be routed. `None` when the last path
    /// segment has no recognised extension.
    pub fn split_extension(uri: &Uri) -> Option<(Self, Uri)> {
        let path = uri.path();
        let format = Self::from_extension(path)?;
        let (stem, _) = path.rsplit_once('.')?;
        let stripped = match uri.query() {
            Some(query) => format!("{stem}?{query}"),
            None => stem.to_string(),
        };

        let mut parts = uri.clone().into_parts();
        parts.path_and_query = Some(stripped.parse().ok()?);
        Uri::from_parts(parts).ok().map(|uri| (format, uri))
    }

    pub fn is_html(&self) -> bool {
        matches!(self, ResponseFormat::Html)
    }

    fn from_extension(path: &str) -> Option<Self> {
        let last = path.rsplit('/').next()?;
        let (_, ext) = last.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(ResponseFormat::Html),
            "json" => Some(ResponseFormat::Json),
            "xml" => Some(ResponseFormat::Xml),
            _ => None,
        }
    }

    /// Picks the recognised media range with the highest `q`, earlier
    /// ranges winning ties. Ranges with `q=0` are refused by the client and
    /// skipped.
    fn from_accept(headers: &HeaderMap) -> Self {
        let accept = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");

        let mut saw_any = false;
        let mut best: Option<(Self, f32)> = None;
        for range in accept.split(',') {
            let mut params = range.split(';');
            let media = params.next().unwrap_or_default().trim();
            if media.is_empty() {
                continue;
            }
            saw_any = true;

            let Some(format) = Self::from_media_type(media) else {
                continue;
            };
            let quality = params
                .filter_map(|p| p.split_once('='))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, q)| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality <= 0.0 {
                continue;
            }
            if !matches!(best, Some((_, q)) if q >= quality) {
                best = Some((format, quality));
            }
        }

        match best {
            Some((format, _)) => format,
            None if saw_any => ResponseFormat::Other,
            None => ResponseFormat::Html,
        }
    }

    fn from_media_type(media: &str) -> Option<Self> {
        match media.to_ascii_lowercase().as_str() {
            "text/html" | "application/xhtml+xml" | "*/*" => Some(ResponseFormat::Html),
            "application/json" => Some(ResponseFormat::Json),
            "application/xml" | "text/xml" => Some(ResponseFormat::Xml),
            _ => None,
        }
    }
}

impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ResponseFormat>()
            .copied()
            .unwrap_or_else(|| Self::negotiate(&parts.uri, &parts.headers)))
    }
}
