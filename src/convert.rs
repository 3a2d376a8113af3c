//! Value converters for typed dictionary fields
//!
//! A converter is a stateless strategy bound to a field at schema
//! construction time. It can extend the field's allowed type set and
//! coerces raw values into their typed form when the field is read.
//!
//! The registry is an ordered list and dispatch is strictly first-match:
//! the file-specification converter has to come before the generic
//! dictionary converter (a Filespec type tag is also dictionary-shaped),
//! and the identity converter terminates the list by matching everything.

use crate::date::PdfDate;
use crate::dict::TypedValue;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{Dict, Name, Object, PdfString};
use crate::schema::{DictClass, TypeTag};
use crate::types::{Rectangle, DICTIONARY, FILESPEC};
use log::debug;

/// A stateless field value converter
pub trait Converter: Sync + Send {
    /// Registry dispatch predicate: can this converter handle fields whose
    /// canonical type is `tag`?
    fn usable_for(&self, tag: &TypeTag) -> bool;

    /// Types to add to the field's allowed set when this converter binds
    fn additional_types(&self) -> &'static [TypeTag] {
        &[]
    }

    /// Does `data` need coercion for a field with the given types?
    fn wants_convert(&self, data: &Object, types: &[TypeTag]) -> bool;

    /// Perform the coercion
    fn convert(&self, data: &Object, types: &[TypeTag], doc: &Document) -> Result<TypedValue>;
}

/// The canonical converter registry, in dispatch order
pub static CONVERTERS: [&dyn Converter; 7] = [
    &FileSpecConverter,
    &DictionaryConverter,
    &StringConverter,
    &ByteStringConverter,
    &DateConverter,
    &RectangleConverter,
    &IdentityConverter,
];

/// The first converter in the registry usable for `tag`
pub fn converter_for(tag: &TypeTag) -> &'static dyn Converter {
    CONVERTERS
        .iter()
        .find(|c| c.usable_for(tag))
        .copied()
        .unwrap_or(&IdentityConverter)
}

/// The first class-shaped tag in `types`, resolved through the document's
/// type map. Used to decide what dictionary-shaped values wrap into.
fn wrap_target(types: &[TypeTag], doc: &Document) -> Option<&'static DictClass> {
    types.iter().find_map(|t| match t {
        TypeTag::Class(c) => Some(*c),
        TypeTag::Lazy(name) => doc.config().class_for(name),
        _ => None,
    })
}

// ============================================================================
// File specifications
// ============================================================================

/// Promotes plain strings to `{F: string}` file specification dictionaries
/// and wraps dictionary-shaped values as the Filespec class
pub struct FileSpecConverter;

impl Converter for FileSpecConverter {
    fn usable_for(&self, tag: &TypeTag) -> bool {
        match tag {
            TypeTag::Class(c) => c.is_a(&FILESPEC),
            TypeTag::Lazy(name) => *name == "Filespec",
            _ => false,
        }
    }

    fn additional_types(&self) -> &'static [TypeTag] {
        &[TypeTag::Dictionary, TypeTag::String]
    }

    fn wants_convert(&self, data: &Object, _types: &[TypeTag]) -> bool {
        matches!(
            data,
            Object::String(_) | Object::Dict(_) | Object::Stream(_)
        )
    }

    fn convert(&self, data: &Object, types: &[TypeTag], doc: &Document) -> Result<TypedValue> {
        let class = wrap_target(types, doc).unwrap_or(&FILESPEC);
        match data {
            Object::String(s) => {
                let mut dict = Dict::new();
                dict.insert(Name::new("F"), Object::String(s.clone()));
                Ok(TypedValue::Dict(doc.wrap(&Object::Dict(dict), Some(class))?))
            }
            Object::Dict(_) | Object::Stream(_) => {
                Ok(TypedValue::Dict(doc.wrap(data, Some(class))?))
            }
            other => Err(Error::type_mismatch(
                "Filespec",
                "String|Dictionary",
                other.type_name(),
            )),
        }
    }
}

// ============================================================================
// Generic dictionaries
// ============================================================================

/// Wraps raw dictionaries (and streams) into the field's typed-dictionary
/// class via [`Document::wrap`]
pub struct DictionaryConverter;

impl Converter for DictionaryConverter {
    fn usable_for(&self, tag: &TypeTag) -> bool {
        matches!(
            tag,
            TypeTag::Dictionary | TypeTag::Class(_) | TypeTag::Lazy(_)
        )
    }

    fn additional_types(&self) -> &'static [TypeTag] {
        &[TypeTag::Dictionary]
    }

    fn wants_convert(&self, data: &Object, _types: &[TypeTag]) -> bool {
        matches!(data, Object::Dict(_) | Object::Stream(_))
    }

    fn convert(&self, data: &Object, types: &[TypeTag], doc: &Document) -> Result<TypedValue> {
        let class = wrap_target(types, doc).unwrap_or(&DICTIONARY);
        Ok(TypedValue::Dict(doc.wrap(data, Some(class))?))
    }
}

// ============================================================================
// Strings
// ============================================================================

/// Decodes binary strings to UTF-8 text: UTF-16BE when the bytes start
/// with a byte order mark, PDFDocEncoding otherwise
pub struct StringConverter;

impl Converter for StringConverter {
    fn usable_for(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::String
    }

    fn wants_convert(&self, data: &Object, _types: &[TypeTag]) -> bool {
        matches!(data, Object::String(s) if !s.is_text())
    }

    fn convert(&self, data: &Object, _types: &[TypeTag], _doc: &Document) -> Result<TypedValue> {
        match data {
            Object::String(s) => Ok(TypedValue::Value(Object::String(PdfString::text(
                s.to_text(),
            )))),
            other => Err(Error::type_mismatch("String", "String", other.type_name())),
        }
    }
}

/// Forces strings back to uninterpreted bytes for fields that must not be
/// treated as text (file paths, binary identifiers)
pub struct ByteStringConverter;

impl Converter for ByteStringConverter {
    fn usable_for(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::ByteString
    }

    fn additional_types(&self) -> &'static [TypeTag] {
        &[TypeTag::String]
    }

    fn wants_convert(&self, data: &Object, _types: &[TypeTag]) -> bool {
        matches!(data, Object::String(s) if s.is_text())
    }

    fn convert(&self, data: &Object, _types: &[TypeTag], _doc: &Document) -> Result<TypedValue> {
        match data {
            Object::String(s) => {
                debug!("forcing text string back to binary for a byte-string field");
                Ok(TypedValue::Value(Object::String(PdfString::binary(
                    s.as_bytes().to_vec(),
                ))))
            }
            other => Err(Error::type_mismatch(
                "ByteString",
                "String",
                other.type_name(),
            )),
        }
    }
}

// ============================================================================
// Dates
// ============================================================================

/// Parses `D:...` date strings into [`PdfDate`] values
pub struct DateConverter;

impl Converter for DateConverter {
    fn usable_for(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Date
    }

    fn additional_types(&self) -> &'static [TypeTag] {
        &[TypeTag::String]
    }

    fn wants_convert(&self, data: &Object, _types: &[TypeTag]) -> bool {
        matches!(data, Object::String(_))
    }

    fn convert(&self, data: &Object, _types: &[TypeTag], _doc: &Document) -> Result<TypedValue> {
        let string = data
            .as_string()
            .ok_or_else(|| Error::type_mismatch("Date", "String", data.type_name()))?;
        PdfDate::parse(string.as_bytes())
            .map(TypedValue::Date)
            .ok_or_else(|| {
                Error::generic(format!(
                    "Not a valid PDF date string: {:?}",
                    String::from_utf8_lossy(string.as_bytes())
                ))
            })
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// Wraps 4-element numeric arrays as [`Rectangle`] values
pub struct RectangleConverter;

impl Converter for RectangleConverter {
    fn usable_for(&self, tag: &TypeTag) -> bool {
        *tag == TypeTag::Rectangle
    }

    fn additional_types(&self) -> &'static [TypeTag] {
        &[TypeTag::Array]
    }

    fn wants_convert(&self, data: &Object, _types: &[TypeTag]) -> bool {
        matches!(data, Object::Array(_))
    }

    fn convert(&self, data: &Object, _types: &[TypeTag], _doc: &Document) -> Result<TypedValue> {
        let array = data
            .as_array()
            .ok_or_else(|| Error::type_mismatch("Rectangle", "Array", data.type_name()))?;
        Rectangle::from_array(array)
            .map(TypedValue::Rect)
            .ok_or_else(|| Error::generic("A rectangle needs exactly four numbers"))
    }
}

// ============================================================================
// Terminal fallback
// ============================================================================

/// Matches any type and never converts
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    fn usable_for(&self, _tag: &TypeTag) -> bool {
        true
    }

    fn wants_convert(&self, _data: &Object, _types: &[TypeTag]) -> bool {
        false
    }

    fn convert(&self, data: &Object, _types: &[TypeTag], _doc: &Document) -> Result<TypedValue> {
        Ok(TypedValue::Value(data.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::dict_from;
    use crate::types::{CATALOG, PAGES};

    #[test]
    fn test_registry_order_is_first_match() {
        // The identity converter would match everything, yet every earlier
        // converter keeps winning for its own tags.
        let date = converter_for(&TypeTag::Date);
        assert!(date.wants_convert(&Object::from("D:1998"), &[TypeTag::Date]));
        let rect = converter_for(&TypeTag::Rectangle);
        assert!(rect.wants_convert(&Object::Array(vec![]), &[TypeTag::Rectangle]));
        let ident = converter_for(&TypeTag::Integer);
        assert!(!ident.wants_convert(&Object::Int(1), &[TypeTag::Integer]));
    }

    #[test]
    fn test_filespec_beats_dictionary_converter() {
        // Both are usable for a Filespec class tag; the more specific one
        // comes first in the registry.
        let conv = converter_for(&TypeTag::Class(&FILESPEC));
        assert!(conv.wants_convert(&Object::from("file.txt"), &[]));
        // A plain class tag falls through to the dictionary converter,
        // which does not convert strings.
        let conv = converter_for(&TypeTag::Class(&PAGES));
        assert!(!conv.wants_convert(&Object::from("file.txt"), &[]));
    }

    #[test]
    fn test_filespec_string_promotion() {
        let doc = Document::new();
        let conv = converter_for(&TypeTag::Lazy("Filespec"));
        let result = conv
            .convert(
                &Object::from("test"),
                &[TypeTag::Lazy("Filespec")],
                &doc,
            )
            .unwrap();
        let wrapped = result.as_dict().unwrap();
        assert_eq!(wrapped.class().name, "Filespec");
        assert_eq!(
            wrapped.raw_key("F"),
            Some(&Object::from("test"))
        );
    }

    #[test]
    fn test_dictionary_converter_wraps_by_type_map() {
        let doc = Document::new();
        let conv = converter_for(&TypeTag::Lazy("Pages"));
        let raw = Object::Dict(dict_from([("Count", Object::Int(0))]));
        let result = conv.convert(&raw, &[TypeTag::Lazy("Pages")], &doc).unwrap();
        assert_eq!(result.as_dict().unwrap().class().name, "Pages");
    }

    #[test]
    fn test_string_converter_utf16() {
        let doc = Document::new();
        let raw = Object::String(PdfString::binary(vec![
            0xFE, 0xFF, 0x00, 0x74, 0x00, 0x65, 0x00, 0x73, 0x00, 0x74,
        ]));
        assert!(StringConverter.wants_convert(&raw, &[]));
        let result = StringConverter.convert(&raw, &[], &doc).unwrap();
        let value = result.as_object().unwrap();
        assert_eq!(value.as_string().unwrap().as_str(), Some("test"));
        assert!(value.as_string().unwrap().is_text());
    }

    #[test]
    fn test_string_converter_skips_decoded_text() {
        let decoded = Object::String(PdfString::text("done"));
        assert!(!StringConverter.wants_convert(&decoded, &[]));
    }

    #[test]
    fn test_byte_string_converter_forces_binary() {
        let doc = Document::new();
        let text = Object::String(PdfString::text("path"));
        assert!(ByteStringConverter.wants_convert(&text, &[]));
        let result = ByteStringConverter.convert(&text, &[], &doc).unwrap();
        let value = result.as_object().unwrap();
        assert!(!value.as_string().unwrap().is_text());
        assert_eq!(value.as_string().unwrap().as_bytes(), b"path");
    }

    #[test]
    fn test_date_converter() {
        let doc = Document::new();
        let raw = Object::from("D:19981223");
        let result = DateConverter.convert(&raw, &[], &doc).unwrap();
        let date = result.as_date().unwrap();
        assert_eq!((date.year, date.month, date.day), (1998, 12, 23));
        assert_eq!(date.utc_offset, 0);
    }

    #[test]
    fn test_date_converter_rejects_garbage() {
        let doc = Document::new();
        assert!(DateConverter
            .convert(&Object::from("yesterday"), &[], &doc)
            .is_err());
    }

    #[test]
    fn test_rectangle_converter() {
        let doc = Document::new();
        let raw = Object::Array(vec![
            Object::Int(0),
            Object::Int(1),
            Object::Int(2),
            Object::Int(3),
        ]);
        let result = RectangleConverter.convert(&raw, &[], &doc).unwrap();
        let rect = result.as_rect().unwrap();
        assert_eq!(
            (rect.llx(), rect.lly(), rect.urx(), rect.ury()),
            (0.0, 1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn test_rectangle_converter_rejects_short_array() {
        let doc = Document::new();
        assert!(RectangleConverter
            .convert(&Object::Array(vec![Object::Int(1)]), &[], &doc)
            .is_err());
    }

    #[test]
    fn test_converter_for_catalog_class() {
        // A concrete class tag that is not a file specification binds the
        // dictionary converter.
        let conv = converter_for(&TypeTag::Class(&CATALOG));
        assert!(conv.wants_convert(&Object::Dict(Dict::new()), &[]));
        assert!(!conv.wants_convert(&Object::Int(1), &[]));
    }
}
