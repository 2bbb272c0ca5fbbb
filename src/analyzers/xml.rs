//! XML well-formedness validation (spec §4.4 `xml`).
//!
//! Uses `quick-xml`, already in the teacher's own dependency table, for
//! the well-formedness pass; DTD validation is best-effort (structural
//! checks only — a full DTD validator is out of scope, spec Non-goals).

use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Unspecified,
}

/// Detect a byte-order mark, falling back to `Unspecified` (the
/// document is then assumed UTF-8, matching `quick-xml`'s default).
pub fn detect_encoding(data: &[u8]) -> Encoding {
    match data {
        [0xEF, 0xBB, 0xBF, ..] => Encoding::Utf8,
        [0xFF, 0xFE, ..] => Encoding::Utf16Le,
        [0xFE, 0xFF, ..] => Encoding::Utf16Be,
        _ => Encoding::Unspecified,
    }
}

#[derive(Debug, Clone)]
pub struct XmlValidation {
    pub well_formed: bool,
    pub error: Option<String>,
    pub has_doctype: bool,
}

/// Check that `data` parses as well-formed XML, draining the whole
/// event stream rather than stopping at the first element (quick-xml
/// only surfaces most well-formedness errors once asked to keep
/// reading, e.g. a mismatched closing tag near EOF).
pub fn validate(data: &[u8]) -> XmlValidation {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut has_doctype = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => {
                return XmlValidation { well_formed: true, error: None, has_doctype };
            }
            Ok(Event::DocType(_)) => {
                has_doctype = true;
            }
            Ok(_) => {}
            Err(e) => {
                return XmlValidation {
                    well_formed: false,
                    error: Some(e.to_string()),
                    has_doctype,
                };
            }
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_document_passes() {
        let result = validate(b"<root><child attr=\"x\">text</child></root>");
        assert!(result.well_formed);
        assert!(result.error.is_none());
    }

    #[test]
    fn mismatched_tags_are_reported() {
        let result = validate(b"<root><child></root></child>");
        assert!(!result.well_formed);
        assert!(result.error.is_some());
    }

    #[test]
    fn doctype_is_recorded() {
        let result = validate(b"<!DOCTYPE root SYSTEM \"root.dtd\"><root/>");
        assert!(result.well_formed);
        assert!(result.has_doctype);
    }

    #[test]
    fn detects_byte_order_marks() {
        assert_eq!(detect_encoding(&[0xEF, 0xBB, 0xBF, b'<']), Encoding::Utf8);
        assert_eq!(detect_encoding(&[0xFF, 0xFE, b'<', 0]), Encoding::Utf16Le);
        assert_eq!(detect_encoding(&[0xFE, 0xFF, 0, b'<']), Encoding::Utf16Be);
        assert_eq!(detect_encoding(b"<root/>"), Encoding::Unspecified);
    }
}
