//! Platform classification and redirect decision
//!
//! Pure mapping from the `sec-ch-ua-platform` client hint to an output action.
//! Nothing here knows about hyper responses; see `handler::redirect` for that.

use hyper::HeaderMap;
use std::fmt;

/// Client hint header carrying the user agent's platform
pub const PLATFORM_HEADER: &str = "sec-ch-ua-platform";

/// Google Play listing for Android clients
pub const ANDROID_STORE_URL: &str =
    "https://play.google.com/store/apps/details?id=com.mobiledemand.xscale";

/// Apple App Store listing, used for every platform without a specific rule
pub const FALLBACK_STORE_URL: &str = "https://apps.apple.com/us/app/xscale/id6477849456";

/// Page shown to Windows clients before the meta-refresh fires
pub const WINDOWS_HTML: &str = r"<html>
<head>
    <title>Windows OS detected...redirecting...</title>
    <meta http-equiv='refresh' content='7;url=https://www.4dmobilesoft.com' />
    <style>
        body {
            font-family: Arial, sans-serif;
        }
        h1 {
            font-family: Arial, sans-serif;
            text-align: center;
        }
        img {
            display: block;
            margin: 0 auto;
            width: 50%;
            height: auto;
        }
    </style>
</head>
<body lang='EN-US' link='#467886' vlink='#96607D' style='word-wrap:break-word'>
    <div>
        <br>
        <h1>Microsoft Windows OS detected. Try xDIM for Windows!</h1>
        <p><img src='https://4dmobilesoft.com/wp-content/uploads/2023/10/4D-Mobile-Main-Banner-5icons.jpg'></p>
        <p align='center' style='text-align:center'>&nbsp;</p>
        <p align='center' style='text-align:center'>You will be
            redirected to <a href='http://www.4dmobilesoft.com'>www.4dmobilesoft.com</a>
            shortly.</p>
        <p align='center' style='text-align:center'>Click <a
                href='https://www.4dmobilesoft.com/'>here</a> if not redirected.</p>
    </div>
</body>
</html>";

/// Severity of a decision log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl Severity {
    /// Parse a configured level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" | "debug" | "trace" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
        };
        f.write_str(name)
    }
}

/// Logging capability injected into the redirect handler
pub trait DecisionLog {
    fn log(&self, severity: Severity, message: &str);
}

/// Discards everything
#[cfg(test)]
pub struct NoopLog;

#[cfg(test)]
impl DecisionLog for NoopLog {
    fn log(&self, _severity: Severity, _message: &str) {}
}

/// Platform derived from the client hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Windows,
    Other,
}

impl Platform {
    /// Classify a request from its headers.
    ///
    /// Returns the classification together with the normalised header value,
    /// which is `None` when the header is missing or not visible ASCII.
    pub fn from_headers(headers: &HeaderMap) -> (Self, Option<String>) {
        // HeaderMap::get yields the first value of a multi-valued header
        let normalized = headers
            .get(PLATFORM_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(normalize);

        let platform = normalized
            .as_deref()
            .map_or(Self::Other, Self::from_normalized);
        (platform, normalized)
    }

    /// Map an already normalised value
    pub fn from_normalized(value: &str) -> Self {
        match value {
            "android" => Self::Android,
            "windows" => Self::Windows,
            _ => Self::Other,
        }
    }
}

/// Strip surrounding whitespace and quote characters, then lowercase
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

/// What the endpoint answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Redirect(&'static str),
    RenderHtml(&'static str),
}

/// Total, side-effect free mapping from platform to action
pub const fn decide(platform: Platform) -> Action {
    match platform {
        Platform::Android => Action::Redirect(ANDROID_STORE_URL),
        Platform::Windows => Action::RenderHtml(WINDOWS_HTML),
        Platform::Other => Action::Redirect(FALLBACK_STORE_URL),
    }
}

/// Classify and decide, emitting the decision log lines
pub fn resolve(headers: &HeaderMap, log: &dyn DecisionLog) -> Action {
    log.log(Severity::Info, "Processing redirect request.");

    let (platform, normalized) = Platform::from_headers(headers);
    if let Some(value) = &normalized {
        log.log(Severity::Info, &format!("Extracted platform: \"{value}\""));
    }

    match platform {
        Platform::Android => log.log(
            Severity::Info,
            "Platform is Android. Redirecting to Google Play Store.",
        ),
        Platform::Windows => log.log(
            Severity::Info,
            "Platform is Windows. Showing custom HTML response with redirect.",
        ),
        Platform::Other => log.log(
            Severity::Warn,
            "Unsupported platform detected. Redirecting to Apple App Store as fallback.",
        ),
    }

    decide(platform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingLog {
        lines: RefCell<Vec<(Severity, String)>>,
    }

    impl DecisionLog for RecordingLog {
        fn log(&self, severity: Severity, message: &str) {
            self.lines.borrow_mut().push((severity, message.to_string()));
        }
    }

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(PLATFORM_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_android_variants() {
        for value in ["\"Android\"", "android", "'android'", "ANDROID"] {
            let (platform, _) = Platform::from_headers(&headers_with(value));
            assert_eq!(platform, Platform::Android, "value: {value}");
        }
    }

    #[test]
    fn test_windows_variants() {
        for value in ["\"Windows\"", "WINDOWS", "windows", "  \"windows\" "] {
            let (platform, _) = Platform::from_headers(&headers_with(value));
            assert_eq!(platform, Platform::Windows, "value: {value}");
        }
    }

    #[test]
    fn test_unrecognized_and_absent() {
        for value in ["\"Linux\"", "chromeos", "\"macOS\"", "", "\"\""] {
            let (platform, _) = Platform::from_headers(&headers_with(value));
            assert_eq!(platform, Platform::Other, "value: {value}");
        }

        let (platform, normalized) = Platform::from_headers(&HeaderMap::new());
        assert_eq!(platform, Platform::Other);
        assert!(normalized.is_none());
    }

    #[test]
    fn test_first_value_wins() {
        let mut headers = HeaderMap::new();
        headers.append(PLATFORM_HEADER, HeaderValue::from_static("\"Android\""));
        headers.append(PLATFORM_HEADER, HeaderValue::from_static("\"Windows\""));
        let (platform, normalized) = Platform::from_headers(&headers);
        assert_eq!(platform, Platform::Android);
        assert_eq!(normalized.as_deref(), Some("android"));
    }

    #[test]
    fn test_non_ascii_value_is_unset() {
        let mut headers = HeaderMap::new();
        headers.insert(
            PLATFORM_HEADER,
            HeaderValue::from_bytes(b"\"Andr\xc3\xb6id\"").unwrap(),
        );
        let (platform, normalized) = Platform::from_headers(&headers);
        assert_eq!(platform, Platform::Other);
        assert!(normalized.is_none());
    }

    #[test]
    fn test_decide_is_total() {
        assert_eq!(decide(Platform::Android), Action::Redirect(ANDROID_STORE_URL));
        assert_eq!(decide(Platform::Windows), Action::RenderHtml(WINDOWS_HTML));
        assert_eq!(decide(Platform::Other), Action::Redirect(FALLBACK_STORE_URL));
    }

    #[test]
    fn test_windows_document_contents() {
        assert!(WINDOWS_HTML.contains("Microsoft Windows OS detected"));
        assert!(WINDOWS_HTML.contains("content='7;url=https://www.4dmobilesoft.com'"));
        assert!(WINDOWS_HTML.contains("<img src="));
        assert!(WINDOWS_HTML.contains("href='https://www.4dmobilesoft.com/'>here</a>"));
    }

    #[test]
    fn test_resolve_logs_fallback_as_warning() {
        let log = RecordingLog::default();
        let action = resolve(&headers_with("\"Linux\""), &log);
        assert_eq!(action, Action::Redirect(FALLBACK_STORE_URL));

        let lines = log.lines.borrow();
        assert!(lines.iter().any(|(_, m)| m == "Extracted platform: \"linux\""));
        assert_eq!(lines.last().map(|(s, _)| *s), Some(Severity::Warn));
    }

    #[test]
    fn test_resolve_without_header_skips_extraction_line() {
        let log = RecordingLog::default();
        resolve(&HeaderMap::new(), &log);
        let lines = log.lines.borrow();
        assert!(!lines.iter().any(|(_, m)| m.starts_with("Extracted platform")));
        assert!(lines.iter().all(|(s, _)| *s != Severity::Error));
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warn));
        assert_eq!(Severity::parse("info"), Some(Severity::Info));
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("loud"), None);
        assert!(Severity::Error < Severity::Info);
    }
}
