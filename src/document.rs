//! Typed model of a `.cxf` collage description.
//!
//! A `.cxf` file is a small XML document written by the photo library's
//! collage editor:
//!
//! ```xml
//! <collage format="3:2" version="2">
//!   <albumTitle>Summer</albumTitle>
//!   <albumDate>2009-07-14</albumDate>
//!   <spacing value="0.25"/>
//!   <background color="FFFFFFFF"/>
//!   <node x="0.0" y="0.0" w="0.5" h="1.0">
//!     <src>$HomeDir/Pictures/beach.jpg</src>
//!   </node>
//! </collage>
//! ```
//!
//! Everything the renderer reads is validated here, once, so a document that
//! parses is safe to render. Missing or non-numeric fields surface as a
//! [`DocumentError`] at load time rather than mid-render.
//!
//! Later editor versions add attributes (`theta`, `scale`, `orientation`,
//! `shadows`, background images). They are accepted and ignored.

use crate::imaging::NormalizedRect;
use roxmltree::Node as XmlNode;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("Root element is <{0}>, expected <collage>")]
    WrongRoot(String),
    #[error("Missing <{0}> element")]
    MissingElement(&'static str),
    #[error("Missing `{attribute}` attribute on {element}")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("Invalid format {0:?}, expected two positive integers as W:H")]
    InvalidFormat(String),
    #[error("Invalid background color {0:?}, expected 8 hex digits (RRGGBBAA)")]
    InvalidColor(String),
}

/// Grid dimensions from the `format="W:H"` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridFormat {
    pub width: u32,
    pub height: u32,
}

impl GridFormat {
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        let invalid = || DocumentError::InvalidFormat(raw.to_string());
        let mut parts = raw.split(':');
        let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for GridFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Background fill. The file stores RGBA; alpha is dropped on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub fn parse_rgba_hex(raw: &str) -> Result<Self, DocumentError> {
        let hex = raw.trim();
        if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DocumentError::InvalidColor(raw.to_string()));
        }
        let byte = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| DocumentError::InvalidColor(raw.to_string()))
        };
        Ok(Self([byte(0)?, byte(2)?, byte(4)?]))
    }

    pub fn rgb(self) -> [u8; 3] {
        self.0
    }
}

/// One placed photograph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Image path exactly as written in the document.
    pub src: String,
    pub area: NormalizedRect,
}

/// A parsed, validated collage description.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageDocument {
    pub album_title: String,
    pub album_date: String,
    pub album_uid: Option<String>,
    pub version: Option<String>,
    pub format: GridFormat,
    /// Raw spacing knob, nominally 0–100.
    pub spacing: f64,
    pub background: Background,
    /// In paint order.
    pub nodes: Vec<Node>,
    base_dir: Option<PathBuf>,
}

impl CollageDocument {
    /// Read and parse a `.cxf` file. Relative node paths resolve against
    /// the file's directory.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document = Self::parse(&text)?;
        document.base_dir = path.parent().map(Path::to_path_buf);
        Ok(document)
    }

    /// Parse a document from XML text. Relative node paths resolve against
    /// the current directory.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let xml = roxmltree::Document::parse(text)?;
        let root = xml.root_element();
        if !root.has_tag_name("collage") {
            return Err(DocumentError::WrongRoot(root.tag_name().name().to_string()));
        }

        let format = GridFormat::parse(required_attribute(root, "collage", "format")?)?;

        let spacing_element = child(root, "spacing").ok_or(DocumentError::MissingElement("spacing"))?;
        let spacing = parse_number(
            required_attribute(spacing_element, "spacing", "value")?,
            "spacing",
        )?;

        let background_element =
            child(root, "background").ok_or(DocumentError::MissingElement("background"))?;
        let background = Background::parse_rgba_hex(required_attribute(
            background_element,
            "background",
            "color",
        )?)?;

        let nodes = root
            .children()
            .filter(|n| n.has_tag_name("node"))
            .enumerate()
            .map(|(index, element)| parse_node(element, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            album_title: required_text(root, "albumTitle")?,
            album_date: required_text(root, "albumDate")?,
            album_uid: child(root, "albumUID").map(element_text),
            version: root.attribute("version").map(str::to_string),
            format,
            spacing,
            background,
            nodes,
            base_dir: None,
        })
    }

    /// Directory relative node paths are resolved against, if any.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Map a node's `src` to a filesystem path.
    ///
    /// - `$HomeDir/rest` and `$rest` → relative to the user's home directory
    /// - absolute paths → unchanged
    /// - anything else → relative to [`base_dir`](Self::base_dir)
    pub fn resolve_source(&self, src: &str) -> PathBuf {
        if let Some(rest) = src.strip_prefix('$')
            && let Some(home) = home_dir()
        {
            let rest = rest.strip_prefix("HomeDir/").unwrap_or(rest);
            return home.join(rest);
        }

        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

pub(crate) fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

fn parse_node(element: XmlNode<'_, '_>, index: usize) -> Result<Node, DocumentError> {
    let label = format!("node {}", index + 1);
    let coordinate = |name: &'static str| -> Result<f64, DocumentError> {
        let raw = element
            .attribute(name)
            .ok_or_else(|| DocumentError::MissingAttribute {
                element: label.clone(),
                attribute: name,
            })?;
        parse_number(raw, &format!("{label} `{name}`"))
    };

    let area = NormalizedRect {
        x: coordinate("x")?,
        y: coordinate("y")?,
        w: coordinate("w")?,
        h: coordinate("h")?,
    };

    let src = child(element, "src")
        .map(element_text)
        .filter(|s| !s.is_empty())
        .ok_or(DocumentError::MissingElement("src"))?;

    Ok(Node { src, area })
}

fn child<'a, 'input>(parent: XmlNode<'a, 'input>, name: &str) -> Option<XmlNode<'a, 'input>> {
    parent.children().find(|n| n.has_tag_name(name))
}

/// Concatenated text content, trimmed. Handles CDATA sections.
fn element_text(element: XmlNode<'_, '_>) -> String {
    element
        .children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn required_text(parent: XmlNode<'_, '_>, name: &'static str) -> Result<String, DocumentError> {
    child(parent, name)
        .map(element_text)
        .ok_or(DocumentError::MissingElement(name))
}

fn required_attribute<'a>(
    element: XmlNode<'a, '_>,
    label: &str,
    attribute: &'static str,
) -> Result<&'a str, DocumentError> {
    element
        .attribute(attribute)
        .ok_or_else(|| DocumentError::MissingAttribute {
            element: format!("<{label}>"),
            attribute,
        })
}

fn parse_number(raw: &str, field: &str) -> Result<f64, DocumentError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DocumentError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{CollageXml, write_cxf};

    fn sample() -> String {
        CollageXml::new("3:2")
            .spacing(0.25)
            .background("336699FF")
            .node("a.jpg", [0.0, 0.0, 0.5, 1.0])
            .node("b.jpg", [0.5, 0.0, 0.5, 0.5])
            .node("c.jpg", [0.5, 0.5, 0.5, 0.5])
            .to_string()
    }

    // =========================================================================
    // Full document parsing
    // =========================================================================

    #[test]
    fn parse_full_document() {
        let doc = CollageDocument::parse(&sample()).unwrap();

        assert_eq!(doc.album_title, "Test Album");
        assert_eq!(doc.album_date, "1993-03-20");
        assert_eq!(doc.format, GridFormat { width: 3, height: 2 });
        assert_eq!(doc.spacing, 0.25);
        assert_eq!(doc.background.rgb(), [0x33, 0x66, 0x99]);
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.base_dir(), None);
    }

    #[test]
    fn nodes_keep_document_order() {
        let doc = CollageDocument::parse(&sample()).unwrap();
        let srcs: Vec<&str> = doc.nodes.iter().map(|n| n.src.as_str()).collect();
        assert_eq!(srcs, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(
            doc.nodes[1].area,
            NormalizedRect { x: 0.5, y: 0.0, w: 0.5, h: 0.5 }
        );
    }

    #[test]
    fn parse_optional_metadata_and_extra_attributes() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<collage format="4:3" version="2" orientation="landscape" theme="grid" shadows="true">
  <albumTitle>Trip</albumTitle>
  <albumDate>2008-01-01</albumDate>
  <albumUID>c0ffee</albumUID>
  <spacing value="0"/>
  <background color="000000FF" src="bg.jpg"/>
  <node x="0" y="0" w="1" h="1" theta="0.1" scale="1.2">
    <src><![CDATA[photos/one.jpg]]></src>
  </node>
</collage>"#;
        let doc = CollageDocument::parse(xml).unwrap();
        assert_eq!(doc.album_uid.as_deref(), Some("c0ffee"));
        assert_eq!(doc.version.as_deref(), Some("2"));
        assert_eq!(doc.nodes[0].src, "photos/one.jpg");
    }

    #[test]
    fn parse_document_without_nodes() {
        let xml = CollageXml::new("1:1").to_string();
        let doc = CollageDocument::parse(&xml).unwrap();
        assert!(doc.nodes.is_empty());
    }

    #[test]
    fn parse_strips_byte_order_mark() {
        let xml = format!("\u{feff}{}", sample());
        assert!(CollageDocument::parse(&xml).is_ok());
    }

    // =========================================================================
    // Malformed documents
    // =========================================================================

    #[test]
    fn not_xml_is_error() {
        let result = CollageDocument::parse("this is not xml <<<");
        assert!(matches!(result, Err(DocumentError::Xml(_))));
    }

    #[test]
    fn wrong_root_is_error() {
        let result = CollageDocument::parse("<album format=\"1:1\"/>");
        assert!(matches!(result, Err(DocumentError::WrongRoot(name)) if name == "album"));
    }

    #[test]
    fn missing_album_title_is_error() {
        let xml = sample().replace("<albumTitle>Test Album</albumTitle>", "");
        let result = CollageDocument::parse(&xml);
        assert!(matches!(result, Err(DocumentError::MissingElement("albumTitle"))));
    }

    #[test]
    fn missing_spacing_value_is_error() {
        let xml = sample().replace("<spacing value=\"0.25\"/>", "<spacing/>");
        let result = CollageDocument::parse(&xml);
        assert!(matches!(
            result,
            Err(DocumentError::MissingAttribute { attribute: "value", .. })
        ));
    }

    #[test]
    fn missing_background_is_error() {
        let xml = sample().replace("<background color=\"336699FF\"/>", "");
        let result = CollageDocument::parse(&xml);
        assert!(matches!(result, Err(DocumentError::MissingElement("background"))));
    }

    #[test]
    fn non_numeric_node_coordinate_is_error() {
        let xml = sample().replacen("y=\"0\"", "y=\"top\"", 1);
        let result = CollageDocument::parse(&xml);
        assert!(
            matches!(&result, Err(DocumentError::InvalidNumber { value, .. }) if value == "top"),
            "got {result:?}"
        );
    }

    #[test]
    fn missing_node_attribute_names_the_node() {
        let xml = sample().replacen(" h=\"0.5\"", "", 1);
        match CollageDocument::parse(&xml) {
            Err(DocumentError::MissingAttribute { element, attribute }) => {
                assert_eq!(element, "node 2");
                assert_eq!(attribute, "h");
            }
            other => panic!("expected missing attribute, got {other:?}"),
        }
    }

    #[test]
    fn node_without_src_is_error() {
        let xml = sample().replace("<src>b.jpg</src>", "");
        let result = CollageDocument::parse(&xml);
        assert!(matches!(result, Err(DocumentError::MissingElement("src"))));
    }

    #[test]
    fn infinite_spacing_is_error() {
        let xml = sample().replace("value=\"0.25\"", "value=\"inf\"");
        let result = CollageDocument::parse(&xml);
        assert!(matches!(result, Err(DocumentError::InvalidNumber { .. })));
    }

    // =========================================================================
    // Format and color fields
    // =========================================================================

    #[test]
    fn format_parses_two_positive_integers() {
        assert_eq!(GridFormat::parse("2:1").unwrap(), GridFormat { width: 2, height: 1 });
        assert_eq!(GridFormat::parse(" 16 : 9 ").unwrap().to_string(), "16:9");
    }

    #[test]
    fn format_rejects_bad_values() {
        for raw in ["2x1", "2", "2:1:3", "2:0", "-2:1", "a:b", "", ":"] {
            assert!(
                matches!(GridFormat::parse(raw), Err(DocumentError::InvalidFormat(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn color_discards_alpha() {
        assert_eq!(Background::parse_rgba_hex("FF0000FF").unwrap().rgb(), [255, 0, 0]);
        assert_eq!(Background::parse_rgba_hex("00ff0000").unwrap().rgb(), [0, 255, 0]);
    }

    #[test]
    fn color_rejects_wrong_length_or_digits() {
        for raw in ["FF0000", "FF0000FF00", "GG0000FF", "#FF0000F"] {
            assert!(
                matches!(Background::parse_rgba_hex(raw), Err(DocumentError::InvalidColor(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    // =========================================================================
    // Source resolution
    // =========================================================================

    #[test]
    fn from_path_resolves_relative_sources_next_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_cxf(tmp.path(), "trip.cxf", &sample());

        let doc = CollageDocument::from_path(&path).unwrap();
        assert_eq!(doc.base_dir(), Some(tmp.path()));
        assert_eq!(doc.resolve_source("a.jpg"), tmp.path().join("a.jpg"));
    }

    #[test]
    fn absolute_sources_are_unchanged() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_cxf(tmp.path(), "trip.cxf", &sample());
        let doc = CollageDocument::from_path(&path).unwrap();

        let absolute = tmp.path().join("elsewhere/photo.jpg");
        assert_eq!(doc.resolve_source(absolute.to_str().unwrap()), absolute);
    }

    #[test]
    fn parsed_documents_resolve_against_current_directory() {
        let doc = CollageDocument::parse(&sample()).unwrap();
        assert_eq!(doc.resolve_source("a.jpg"), PathBuf::from("a.jpg"));
    }

    #[test]
    fn home_dir_sources_resolve_against_home() {
        let doc = CollageDocument::parse(&sample()).unwrap();
        if let Some(home) = home_dir() {
            assert_eq!(
                doc.resolve_source("$HomeDir/Pictures/a.jpg"),
                home.join("Pictures/a.jpg")
            );
            assert_eq!(doc.resolve_source("$Pictures/b.jpg"), home.join("Pictures/b.jpg"));
        }
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let result = CollageDocument::from_path(Path::new("/nonexistent/collage.cxf"));
        assert!(matches!(result, Err(DocumentError::Io { .. })));
    }
}
