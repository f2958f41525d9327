//! Platform redirect endpoint
//!
//! Turns the decision from `platform::resolve` into a hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{HeaderMap, Response};

use crate::http;
use crate::platform::{self, Action, DecisionLog, Severity};

/// Answer a redirect request from its headers
pub fn redirect_response(
    headers: &HeaderMap,
    is_head: bool,
    log: &dyn DecisionLog,
) -> Response<Full<Bytes>> {
    match platform::resolve(headers, log) {
        Action::Redirect(url) => {
            log.log(Severity::Info, &format!("Redirecting to: {url}"));
            http::build_redirect_response(url)
        }
        Action::RenderHtml(document) => {
            let response = http::build_html_response(document, is_head);
            log.log(
                Severity::Info,
                "Custom HTML response sent for Windows platform.",
            );
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{
        NoopLog, ANDROID_STORE_URL, FALLBACK_STORE_URL, PLATFORM_HEADER, WINDOWS_HTML,
    };
    use http_body_util::BodyExt;
    use hyper::header::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(PLATFORM_HEADER, HeaderValue::from_static(value));
        headers
    }

    async fn into_parts(resp: Response<Full<Bytes>>) -> (u16, HeaderMap, Bytes) {
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (parts.status.as_u16(), parts.headers, bytes)
    }

    #[tokio::test]
    async fn test_android_redirects_to_play_store() {
        let resp = redirect_response(&headers_with("\"Android\""), false, &NoopLog);
        let (status, headers, body) = into_parts(resp).await;
        assert_eq!(status, 302);
        assert_eq!(headers["Location"], ANDROID_STORE_URL);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_windows_renders_document() {
        let resp = redirect_response(&headers_with("\"Windows\""), false, &NoopLog);
        let (status, headers, body) = into_parts(resp).await;
        assert_eq!(status, 200);
        assert_eq!(headers["Content-Type"], "text/html");
        assert!(headers.get("Location").is_none());

        let text = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(text, WINDOWS_HTML);
        assert!(text.contains("Microsoft Windows OS detected"));
        assert!(text.contains("url=https://www.4dmobilesoft.com"));
    }

    #[tokio::test]
    async fn test_missing_and_unknown_fall_back() {
        for headers in [HeaderMap::new(), headers_with("\"Linux\""), headers_with("chromeos")] {
            let (status, headers, body) =
                into_parts(redirect_response(&headers, false, &NoopLog)).await;
            assert_eq!(status, 302);
            assert_eq!(headers["Location"], FALLBACK_STORE_URL);
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_identical_input_identical_output() {
        let headers = headers_with("\"Windows\"");
        let first = into_parts(redirect_response(&headers, false, &NoopLog)).await;
        let second = into_parts(redirect_response(&headers, false, &NoopLog)).await;
        assert_eq!(first, second);
    }
}
