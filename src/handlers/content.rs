//! Fixed documents, images, links and small generated values.

use axum::{
    extract::Path,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::handlers::status::status_response;
use crate::http::error::{HandlerResult, HttpBinError};
use crate::http::request::RequestContext;
use crate::http::response::{json_ok, UuidResponse, HTML_CONTENT_TYPE, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const FORMS_POST_HTML: &str = include_str!("../../static/forms-post.html");
const UTF8_HTML: &str = include_str!("../../static/utf8.html");
const MOBY_HTML: &str = include_str!("../../static/moby.html");
const SAMPLE_XML: &str = include_str!("../../static/sample.xml");
const SAMPLE_JSON: &str = include_str!("../../static/sample.json");

const PNG: &[u8] = include_bytes!("../../static/images/pig_icon.png");
const JPEG: &[u8] = include_bytes!("../../static/images/jackal.jpg");
const WEBP: &[u8] = include_bytes!("../../static/images/wolf_1.webp");
const SVG: &[u8] = include_bytes!("../../static/images/svg_logo.svg");

const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /deny\n";

const DENY_TEXT: &str = r#"
          .-''''''-.
        .' _      _ '.
       /   O      O   \
      :                :
      |                |
      :       __       :
       \  .-"`  `"-.  /
        '.          .'
          '-......-'
     YOU SHOULDN'T BE HERE
"#;

/// Most links `/links` will render on one page.
pub const MAX_LINKS: usize = 256;

/// Base64 decoder for `/base64`: URL-safe alphabet, padding optional.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn document(content_type: &'static str, body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

pub async fn index() -> Response {
    document(HTML_CONTENT_TYPE, INDEX_HTML)
}

pub async fn forms_post() -> Response {
    document(HTML_CONTENT_TYPE, FORMS_POST_HTML)
}

pub async fn utf8() -> Response {
    document(HTML_CONTENT_TYPE, UTF8_HTML)
}

pub async fn html() -> Response {
    document(HTML_CONTENT_TYPE, MOBY_HTML)
}

pub async fn robots() -> Response {
    document(TEXT_CONTENT_TYPE, ROBOTS_TXT)
}

pub async fn deny() -> Response {
    document(TEXT_CONTENT_TYPE, DENY_TEXT)
}

pub async fn xml() -> Response {
    document("application/xml", SAMPLE_XML)
}

pub async fn json() -> Response {
    document(JSON_CONTENT_TYPE, SAMPLE_JSON)
}

fn parse_link_count(raw: &str) -> HandlerResult<usize> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n <= MAX_LINKS)
        .ok_or_else(|| HttpBinError::bad_request(format!("Invalid link count, must be <= {}", MAX_LINKS)))
}

/// Render `n` links with the one at `offset` left unlinked.
pub fn links_page(n: usize, offset: usize) -> String {
    let mut page = String::from("<html><head><title>Links</title></head><body>");
    for i in 0..n {
        if i == offset {
            page.push_str(&format!("{} ", i));
        } else {
            page.push_str(&format!("<a href='/links/{}/{}'>{}</a> ", n, i, i));
        }
    }
    page.push_str("</body></html>");
    page
}

/// `/links/{n}` redirects to the first page.
pub async fn links_redirect(Path(raw): Path<String>) -> HandlerResult<Response> {
    let n = parse_link_count(&raw)?;
    let location = HeaderValue::from_str(&format!("/links/{}/0", n))
        .map_err(|e| HttpBinError::Internal(e.to_string()))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// `/links/{n}/{offset}`
pub async fn links(Path((raw_n, raw_offset)): Path<(String, String)>) -> HandlerResult<Response> {
    let n = parse_link_count(&raw_n)?;
    let offset = raw_offset
        .parse::<usize>()
        .map_err(|_| HttpBinError::bad_request("Invalid offset"))?;
    Ok(([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], links_page(n, offset)).into_response())
}

fn image_response(kind: &str) -> Option<Response> {
    let (content_type, body) = match kind {
        "png" => ("image/png", PNG),
        "jpeg" => ("image/jpeg", JPEG),
        "webp" => ("image/webp", WEBP),
        "svg" => ("image/svg+xml", SVG),
        _ => return None,
    };
    Some(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

/// Image kind to serve for an `Accept` header, if any is acceptable.
pub fn negotiate_image(accept: Option<&str>) -> Option<&'static str> {
    let accept = match accept {
        None | Some("") => return Some("png"),
        Some(accept) => accept,
    };
    if accept.contains("image/webp") {
        Some("webp")
    } else if accept.contains("image/svg+xml") {
        Some("svg")
    } else if accept.contains("image/jpeg") {
        Some("jpeg")
    } else if accept.contains("image/png") || accept.contains("image/*") {
        Some("png")
    } else {
        None
    }
}

/// `/image`, negotiated on `Accept`.
pub async fn image_accept(ctx: RequestContext) -> Response {
    negotiate_image(ctx.header(header::ACCEPT.as_str()))
        .and_then(image_response)
        .unwrap_or_else(|| status_response(406))
}

/// `/image/{kind}`
pub async fn image(Path(kind): Path<String>) -> Response {
    image_response(&kind).unwrap_or_else(|| HttpBinError::NotFound.into_response())
}

pub async fn uuid() -> Response {
    json_ok(&UuidResponse {
        uuid: uuid::Uuid::new_v4().to_string(),
    })
}

/// `/base64/{data}`
pub async fn base64(Path(data): Path<String>) -> HandlerResult<Response> {
    let decoded = URL_SAFE_LENIENT
        .decode(data.trim())
        .map_err(|_| HttpBinError::bad_request("Incorrect Base64 data try: SFRUUEJJTiBpcyBhd2Vzb21l"))?;
    Ok(([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], decoded).into_response())
}

pub async fn not_found() -> HttpBinError {
    HttpBinError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_page_skips_offset() {
        let page = links_page(3, 1);
        assert!(page.contains("<a href='/links/3/0'>0</a> "));
        assert!(page.contains("1 "));
        assert!(!page.contains("/links/3/1'"));
        assert!(page.contains("<a href='/links/3/2'>2</a> "));
    }

    #[test]
    fn test_negotiate_image() {
        assert_eq!(negotiate_image(None), Some("png"));
        assert_eq!(negotiate_image(Some("image/webp,*/*")), Some("webp"));
        assert_eq!(negotiate_image(Some("image/svg+xml")), Some("svg"));
        assert_eq!(negotiate_image(Some("image/*")), Some("png"));
        assert_eq!(negotiate_image(Some("text/html")), None);
    }

    #[test]
    fn test_base64_decoder_is_lenient_about_padding() {
        assert_eq!(URL_SAFE_LENIENT.decode("aGk=").unwrap(), b"hi");
        assert_eq!(URL_SAFE_LENIENT.decode("aGk").unwrap(), b"hi");
        assert_eq!(URL_SAFE_LENIENT.decode("_-8").unwrap(), vec![0xff, 0xef]);
        assert!(URL_SAFE_LENIENT.decode("not base64!").is_err());
    }

    #[test]
    fn test_images_embedded() {
        assert!(PNG.starts_with(b"\x89PNG"));
        assert!(JPEG.starts_with(&[0xff, 0xd8]));
        assert!(WEBP.starts_with(b"RIFF"));
    }
}
