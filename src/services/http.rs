//! Remote dialog content over HTTP (browser fetch via gloo-net)

use futures::future::LocalBoxFuture;
use gloo_net::http::Request;

use crate::utils::errors::FetchError;

/// GET `locator` with `params` as the query string and read the body as text.
///
/// The request is built before the future is returned, so the future owns
/// everything it needs.
pub fn get_text(locator: &str, params: &[(&str, &str)]) -> LocalBoxFuture<'static, Result<String, FetchError>> {
    let request = Request::get(locator)
        .query(params.iter().copied())
        // Lets servers render a fragment instead of a full page
        .header("X-Requested-With", "XMLHttpRequest");
    let locator = locator.to_string();

    Box::pin(async move {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.ok() {
            log::warn!("GET {} returned HTTP {}", locator, response.status());
            return Err(FetchError::Status(response.status()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    })
}
