//! Built-in typed dictionary classes
//!
//! The field tables mirror the PDF specification entries the core needs;
//! consumers can register further classes through
//! [`crate::config::Config::register_type`].

use crate::object::{Array, Name, Object};
use crate::schema::{DictClass, Field, IndirectRule, TypeTag};
use crate::version::PdfVersion;

/// The root of the class hierarchy: a dictionary without any constrained
/// fields
pub static DICTIONARY: DictClass = DictClass::new("Dictionary", None, None, Vec::new);

/// The document catalog
pub static CATALOG: DictClass = DictClass::new("Catalog", Some("Catalog"), Some(&DICTIONARY), || {
    vec![
        Field::new("Type", &[TypeTag::Name])
            .required()
            .default(Object::Name(Name::new("Catalog"))),
        Field::new("Version", &[TypeTag::Name]).min_version(PdfVersion::new(1, 4)),
        Field::new("Pages", &[TypeTag::Class(&PAGES)])
            .required()
            .indirect(IndirectRule::MustBeIndirect),
        Field::new("Names", &[TypeTag::Dictionary]).min_version(PdfVersion::new(1, 2)),
        Field::new("Outlines", &[TypeTag::Dictionary]).indirect(IndirectRule::MustBeIndirect),
        Field::new("Metadata", &[TypeTag::Stream])
            .indirect(IndirectRule::MustBeIndirect)
            .min_version(PdfVersion::new(1, 4)),
        Field::new("OCProperties", &[TypeTag::Dictionary]).min_version(PdfVersion::new(1, 5)),
        Field::new("AcroForm", &[TypeTag::Dictionary]).min_version(PdfVersion::new(1, 2)),
        Field::new("Lang", &[TypeTag::String]).min_version(PdfVersion::new(1, 4)),
    ]
});

/// An interior node of the page tree
pub static PAGES: DictClass = DictClass::new("Pages", Some("Pages"), Some(&DICTIONARY), || {
    vec![
        Field::new("Type", &[TypeTag::Name])
            .required()
            .default(Object::Name(Name::new("Pages"))),
        Field::new("Parent", &[TypeTag::Lazy("Pages")]).indirect(IndirectRule::MustBeIndirect),
        Field::new("Kids", &[TypeTag::Array])
            .required()
            .default(Object::Array(vec![])),
        Field::new("Count", &[TypeTag::Integer])
            .required()
            .default(Object::Int(0)),
        Field::new("MediaBox", &[TypeTag::Rectangle]),
    ]
});

/// A leaf of the page tree
pub static PAGE: DictClass = DictClass::new("Page", Some("Page"), Some(&DICTIONARY), || {
    vec![
        Field::new("Type", &[TypeTag::Name])
            .required()
            .default(Object::Name(Name::new("Page"))),
        Field::new("Parent", &[TypeTag::Lazy("Pages")])
            .required()
            .indirect(IndirectRule::MustBeIndirect),
        Field::new("LastModified", &[TypeTag::Date]).min_version(PdfVersion::new(1, 3)),
        Field::new("Resources", &[TypeTag::Dictionary]),
        Field::new("MediaBox", &[TypeTag::Rectangle]),
        Field::new("CropBox", &[TypeTag::Rectangle]),
        Field::new("Contents", &[TypeTag::Stream, TypeTag::Array]),
        Field::new("Rotate", &[TypeTag::Integer]).default(Object::Int(0)),
        Field::new("Annots", &[TypeTag::Array]),
    ]
});

/// A file specification
pub static FILESPEC: DictClass =
    DictClass::new("Filespec", Some("Filespec"), Some(&DICTIONARY), || {
        vec![
            Field::new("Type", &[TypeTag::Name]).default(Object::Name(Name::new("Filespec"))),
            Field::new("FS", &[TypeTag::Name]),
            Field::new("F", &[TypeTag::ByteString]),
            Field::new("UF", &[TypeTag::String]).min_version(PdfVersion::new(1, 7)),
            Field::new("EF", &[TypeTag::Dictionary]).min_version(PdfVersion::new(1, 3)),
            Field::new("Desc", &[TypeTag::String]).min_version(PdfVersion::new(1, 6)),
        ]
    });

/// The document information dictionary
pub static INFO: DictClass = DictClass::new("Info", None, Some(&DICTIONARY), || {
    vec![
        Field::new("Title", &[TypeTag::String]).min_version(PdfVersion::new(1, 1)),
        Field::new("Author", &[TypeTag::String]),
        Field::new("Subject", &[TypeTag::String]).min_version(PdfVersion::new(1, 1)),
        Field::new("Keywords", &[TypeTag::String]).min_version(PdfVersion::new(1, 1)),
        Field::new("Creator", &[TypeTag::String]),
        Field::new("Producer", &[TypeTag::String]),
        Field::new("CreationDate", &[TypeTag::Date]),
        Field::new("ModDate", &[TypeTag::Date]),
        Field::new("Trapped", &[TypeTag::Name]).min_version(PdfVersion::new(1, 3)),
    ]
});

/// The file trailer
pub static TRAILER: DictClass = DictClass::new("Trailer", None, Some(&DICTIONARY), || {
    vec![
        Field::new("Size", &[TypeTag::Integer]).required(),
        Field::new("Prev", &[TypeTag::Integer]),
        Field::new("Root", &[TypeTag::Class(&CATALOG)])
            .required()
            .indirect(IndirectRule::MustBeIndirect),
        Field::new("Info", &[TypeTag::Lazy("Info")]).indirect(IndirectRule::MustBeIndirect),
        Field::new("Encrypt", &[TypeTag::Dictionary]),
        Field::new("ID", &[TypeTag::Array]),
    ]
});

/// Classes registered into every default [`crate::config::Config`]
pub static BUILTIN_CLASSES: [&DictClass; 7] = [
    &DICTIONARY,
    &CATALOG,
    &PAGES,
    &PAGE,
    &FILESPEC,
    &INFO,
    &TRAILER,
];

/// A rectangle given by two diagonally opposite corners.
///
/// Stored in files as a 4-element numeric array `[llx, lly, urx, ury]`;
/// the corners are not necessarily ordered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    llx: f64,
    lly: f64,
    urx: f64,
    ury: f64,
}

impl Rectangle {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Wrap a 4-element numeric array; `None` for anything else
    pub fn from_array(array: &Array) -> Option<Self> {
        if array.len() != 4 {
            return None;
        }
        Some(Rectangle::new(
            array[0].as_real()?,
            array[1].as_real()?,
            array[2].as_real()?,
            array[3].as_real()?,
        ))
    }

    pub fn llx(&self) -> f64 {
        self.llx
    }

    pub fn lly(&self) -> f64 {
        self.lly
    }

    pub fn urx(&self) -> f64 {
        self.urx
    }

    pub fn ury(&self) -> f64 {
        self.ury
    }

    /// Smallest x coordinate, independent of corner order
    pub fn left(&self) -> f64 {
        self.llx.min(self.urx)
    }

    pub fn right(&self) -> f64 {
        self.llx.max(self.urx)
    }

    pub fn bottom(&self) -> f64 {
        self.lly.min(self.ury)
    }

    pub fn top(&self) -> f64 {
        self.lly.max(self.ury)
    }

    pub fn width(&self) -> f64 {
        self.right() - self.left()
    }

    pub fn height(&self) -> f64 {
        self.top() - self.bottom()
    }

    /// The array form this rectangle is stored as
    pub fn to_array(&self) -> Array {
        vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ]
    }
}
