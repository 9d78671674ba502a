// XML properties documents
//
// One flat document per preference family:
//
//   <?xml version="1.0" encoding="UTF-8" standalone="no"?>
//   <!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
//   <properties>
//   <comment>keepsake preferences</comment>
//   <entry key="main.width">800.0</entry>
//   </properties>

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{PrefsError, Result};

/// Flat key/value view of a properties document, ordered by key
pub type PropertyMap = BTreeMap<String, String>;

const XML_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
    "<!DOCTYPE properties SYSTEM \"http://java.sun.com/dtd/properties.dtd\">\n",
);

/// Parse a properties document.
///
/// `origin` only labels errors (usually the layer the text came from).
pub fn parse_properties(xml: &str, origin: &str) -> Result<PropertyMap> {
    let mut reader = Reader::from_str(xml);

    let mut props = PropertyMap::new();
    let mut entry: Option<(String, String)> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"entry" => {
                entry = Some((entry_key(e, origin)?, String::new()));
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"entry" => {
                props.insert(entry_key(e, origin)?, String::new());
            }
            Ok(Event::Text(ref e)) => {
                if let Some((_, value)) = entry.as_mut() {
                    let raw = String::from_utf8_lossy(e);
                    value.push_str(&unescape_text(&raw, origin)?);
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some((_, value)) = entry.as_mut() {
                    let raw = format!("&{};", String::from_utf8_lossy(e));
                    value.push_str(&unescape_text(&raw, origin)?);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some((_, value)) = entry.as_mut() {
                    value.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"entry" => {
                if let Some((key, value)) = entry.take() {
                    props.insert(key, value);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PrefsError::xml(origin, e)),
            _ => {}
        }
        buf.clear();
    }

    if let Some((key, _)) = entry {
        return Err(PrefsError::xml(
            origin,
            format!("unterminated entry {key:?}"),
        ));
    }

    Ok(props)
}

/// Render a properties document with entries in key order
pub fn to_xml_string(props: &PropertyMap, comment: Option<&str>) -> String {
    let mut out = String::from(XML_HEADER);
    out.push_str("<properties>\n");
    if let Some(comment) = comment {
        let _ = writeln!(out, "<comment>{}</comment>", escape(comment));
    }
    for (key, value) in props {
        let _ = writeln!(
            out,
            "<entry key=\"{}\">{}</entry>",
            escape(key.as_str()),
            escape(value.as_str())
        );
    }
    out.push_str("</properties>\n");
    out
}

fn entry_key(e: &BytesStart, origin: &str) -> Result<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"key" {
            let raw = String::from_utf8_lossy(&attr.value);
            return unescape_text(&raw, origin).map(Cow::into_owned);
        }
    }
    Err(PrefsError::xml(origin, "entry without key attribute"))
}

fn unescape_text<'a>(raw: &'a str, origin: &str) -> Result<Cow<'a, str>> {
    unescape(raw).map_err(|e| PrefsError::xml(origin, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAVA_STYLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
<properties>
<comment>class jp.example.PriorityPropertiesManager</comment>
<entry key="main.maximized">false</entry>
<entry key="main.width">800.0</entry>
<entry key="main.tableView.list">name:80.0,:40.0</entry>
<entry key="empty"/>
</properties>
"#;

    #[test]
    fn parses_java_style_document() {
        let props = parse_properties(JAVA_STYLE, "test").unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(props["main.maximized"], "false");
        assert_eq!(props["main.width"], "800.0");
        assert_eq!(props["main.tableView.list"], "name:80.0,:40.0");
        assert_eq!(props["empty"], "");
    }

    #[test]
    fn comment_is_not_an_entry() {
        let props = parse_properties(JAVA_STYLE, "test").unwrap();
        assert!(props.values().all(|v| !v.contains("PriorityPropertiesManager")));
    }

    #[test]
    fn escaped_text_survives_render_and_parse() {
        let mut props = PropertyMap::new();
        props.insert("a<b".to_string(), "x & \"y\" <z>".to_string());
        props.insert("recent.path".to_string(), "C:\\Users\\me\\data.csv".to_string());

        let xml = to_xml_string(&props, Some("keepsake & co"));
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("&amp;"));

        let parsed = parse_properties(&xml, "roundtrip").unwrap();
        assert_eq!(parsed, props);
    }

    #[test]
    fn entries_render_in_key_order() {
        let mut props = PropertyMap::new();
        props.insert("b".to_string(), "2".to_string());
        props.insert("a".to_string(), "1".to_string());

        let xml = to_xml_string(&props, None);
        let a = xml.find("key=\"a\"").unwrap();
        let b = xml.find("key=\"b\"").unwrap();
        assert!(a < b);
        assert!(!xml.contains("<comment>"));
    }

    #[test]
    fn character_references_are_resolved() {
        let xml = r#"<properties><entry key="k">a&#44;b&lt;c</entry></properties>"#;
        let props = parse_properties(xml, "refs").unwrap();
        assert_eq!(props["k"], "a,b<c");
    }

    #[test]
    fn entry_without_key_is_rejected() {
        let xml = "<properties><entry>orphan</entry></properties>";
        let err = parse_properties(xml, "orphan.xml").unwrap_err();
        assert!(matches!(err, PrefsError::Xml { .. }));
        assert!(err.to_string().contains("orphan.xml"));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        let xml = "<properties><entry key=\"k\">v</value></properties>";
        assert!(parse_properties(xml, "broken").is_err());
    }

    #[test]
    fn empty_properties_element() {
        let props = parse_properties("<properties/>", "empty").unwrap();
        assert!(props.is_empty());
    }
}
