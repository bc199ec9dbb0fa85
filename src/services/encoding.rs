use std::borrow::Cow;
use std::sync::OnceLock;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EncodingSource {
    Bom,
    ContentType,
    XmlDeclaration,
    Detected,
}

#[derive(Debug, Serialize)]
pub struct DecodedBody {
    pub text: String,
    pub encoding: String,
    pub source: EncodingSource,
    pub had_errors: bool,
}

fn charset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([A-Za-z0-9_.:-]+)"?"#).expect("valid charset regex"))
}

fn xml_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9_.:-]+)["']"#)
            .expect("valid xml declaration regex")
    })
}

pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let caps = charset_re().captures(content_type)?;
    Encoding::for_label(caps.get(1)?.as_str().as_bytes())
}

pub fn charset_from_xml_declaration(bytes: &[u8]) -> Option<&'static Encoding> {
    // The declaration is ASCII in every encoding we can meet here.
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let caps = xml_decl_re().captures(&head)?;
    Encoding::for_label(caps.get(1)?.as_str().as_bytes())
}

pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedBody {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return finish(text, encoding, EncodingSource::Bom, had_errors);
    }

    let (encoding, source) = if let Some(enc) = content_type.and_then(charset_from_content_type) {
        (enc, EncodingSource::ContentType)
    } else if let Some(enc) = charset_from_xml_declaration(bytes) {
        (enc, EncodingSource::XmlDeclaration)
    } else {
        (detect(bytes), EncodingSource::Detected)
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    finish(text, encoding, source, had_errors)
}

fn detect(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn finish(
    text: Cow<'_, str>,
    encoding: &'static Encoding,
    source: EncodingSource,
    had_errors: bool,
) -> DecodedBody {
    debug!(
        encoding = encoding.name(),
        ?source,
        had_errors,
        "decoded mapping response"
    );

    DecodedBody {
        text: text.into_owned(),
        encoding: encoding.name().to_lowercase(),
        source,
        had_errors,
    }
}
