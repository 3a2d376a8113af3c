//! PDF object types
use crate::encoding;
use bytes::Bytes;
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Interned Name Implementation
// ============================================================================

/// Interned PDF Name with shared storage
///
/// PDF names are frequently repeated (Type, Length, Kids, etc.). This
/// implementation uses `Arc<str>` for zero-copy cloning and sharing.
/// Common names are pre-interned for fast comparison.
#[derive(Debug, Clone, Eq)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a new name, potentially sharing storage with existing names
    pub fn new(s: &str) -> Self {
        // Check for common pre-interned names first
        if let Some(interned) = Self::get_interned(s) {
            return interned;
        }
        Self(Arc::from(s))
    }

    /// Create from owned String
    pub fn from_string(s: String) -> Self {
        if let Some(interned) = Self::get_interned(&s) {
            return interned;
        }
        Self(Arc::from(s))
    }

    /// Get the name string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The raw bytes of the name, exactly as they appear in a file
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Get Arc for zero-copy sharing
    pub fn arc(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }

    /// Check if this is a standard interned name (cheap pointer comparison)
    pub fn is_interned(&self) -> bool {
        COMMON_NAMES
            .iter()
            .any(|(_, arc)| Arc::ptr_eq(&self.0, arc))
    }

    /// Try to get a pre-interned common name
    fn get_interned(s: &str) -> Option<Self> {
        COMMON_NAMES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, arc)| Self(Arc::clone(arc)))
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: pointer equality for interned names
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        // Slow path: byte comparison
        self.0.as_ref() == other.0.as_ref()
    }
}

impl std::hash::Hash for Name {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

// ============================================================================
// Pre-interned Common PDF Names
// ============================================================================

use std::sync::LazyLock;

/// Common PDF names pre-interned for fast comparison
static COMMON_NAMES: LazyLock<Vec<(&'static str, Arc<str>)>> = LazyLock::new(|| {
    vec![
        // Document structure (most common)
        ("Type", Arc::from("Type")),
        ("Subtype", Arc::from("Subtype")),
        ("Length", Arc::from("Length")),
        ("Filter", Arc::from("Filter")),
        ("Parent", Arc::from("Parent")),
        ("Kids", Arc::from("Kids")),
        ("Count", Arc::from("Count")),
        // Page tree
        ("Catalog", Arc::from("Catalog")),
        ("Pages", Arc::from("Pages")),
        ("Page", Arc::from("Page")),
        ("Resources", Arc::from("Resources")),
        ("Contents", Arc::from("Contents")),
        ("MediaBox", Arc::from("MediaBox")),
        ("CropBox", Arc::from("CropBox")),
        ("Rotate", Arc::from("Rotate")),
        ("Annots", Arc::from("Annots")),
        ("LastModified", Arc::from("LastModified")),
        // Catalog entries
        ("Version", Arc::from("Version")),
        ("Names", Arc::from("Names")),
        ("Outlines", Arc::from("Outlines")),
        ("Metadata", Arc::from("Metadata")),
        ("AcroForm", Arc::from("AcroForm")),
        ("Lang", Arc::from("Lang")),
        ("OCProperties", Arc::from("OCProperties")),
        // Stream properties
        ("DecodeParms", Arc::from("DecodeParms")),
        ("FlateDecode", Arc::from("FlateDecode")),
        ("Predictor", Arc::from("Predictor")),
        ("Colors", Arc::from("Colors")),
        ("BitsPerComponent", Arc::from("BitsPerComponent")),
        ("Columns", Arc::from("Columns")),
        // Trailer
        ("Root", Arc::from("Root")),
        ("Info", Arc::from("Info")),
        ("Size", Arc::from("Size")),
        ("Prev", Arc::from("Prev")),
        ("Encrypt", Arc::from("Encrypt")),
        ("ID", Arc::from("ID")),
        // Info dictionary
        ("Title", Arc::from("Title")),
        ("Author", Arc::from("Author")),
        ("Subject", Arc::from("Subject")),
        ("Keywords", Arc::from("Keywords")),
        ("Creator", Arc::from("Creator")),
        ("Producer", Arc::from("Producer")),
        ("CreationDate", Arc::from("CreationDate")),
        ("ModDate", Arc::from("ModDate")),
        ("Trapped", Arc::from("Trapped")),
        // File specifications
        ("Filespec", Arc::from("Filespec")),
        ("FS", Arc::from("FS")),
        ("F", Arc::from("F")),
        ("UF", Arc::from("UF")),
        ("EF", Arc::from("EF")),
        ("Desc", Arc::from("Desc")),
    ]
});

// ============================================================================
// Strings, references, composite values
// ============================================================================

/// A PDF string: uninterpreted octets plus a marker telling whether the
/// bytes have already been decoded to UTF-8 text.
///
/// Strings coming out of a file are binary; the field schema decides at
/// read time whether they should be interpreted as text (see the string
/// converters in [`crate::convert`]).
#[derive(Debug, Clone, PartialEq)]
pub struct PdfString {
    data: Vec<u8>,
    text: bool,
}

impl PdfString {
    /// A string of raw, uninterpreted bytes
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            text: false,
        }
    }

    /// A string that is known to hold UTF-8 text
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            data: s.into().into_bytes(),
            text: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Whether the bytes were produced by text decoding
    pub fn is_text(&self) -> bool {
        self.text
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Decode the raw bytes to text: UTF-16BE when the bytes carry a BOM,
    /// PDFDocEncoding otherwise. Already-decoded strings come back as-is.
    pub fn to_text(&self) -> String {
        if self.text {
            String::from_utf8_lossy(&self.data).into_owned()
        } else {
            encoding::decode_text_string(&self.data)
        }
    }
}

impl From<&str> for PdfString {
    fn from(s: &str) -> Self {
        PdfString::binary(s.as_bytes().to_vec())
    }
}

/// Reference to an indirect object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    /// Object number
    pub num: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjRef {
    pub fn new(num: u32, gen: u16) -> Self {
        Self { num, gen }
    }

    /// The oid of direct (inlined) objects
    pub const DIRECT: ObjRef = ObjRef { num: 0, gen: 0 };

    /// Whether this oid addresses an indirect object
    pub fn is_indirect(&self) -> bool {
        self.num != 0
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.num, self.gen)
    }
}

pub type Dict = IndexMap<Name, Object>;
pub type Array = Vec<Object>;

/// A stream: a dictionary plus an opaque byte payload.
///
/// The payload is kept in its encoded (filtered) form; decoding happens on
/// demand through the producer chain in [`crate::filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dict,
    data: Bytes,
}

impl Stream {
    pub fn new(dict: Dict, data: impl Into<Bytes>) -> Self {
        Self {
            dict,
            data: data.into(),
        }
    }

    /// The raw (still encoded) payload bytes
    pub fn raw_data(&self) -> &Bytes {
        &self.data
    }

    /// Replace the raw payload
    pub fn set_raw_data(&mut self, data: impl Into<Bytes>) {
        self.data = data.into();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Object {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    String(PdfString),
    Name(Name),
    Array(Array),
    Dict(Dict),
    Stream(Stream),
    Ref(ObjRef),
}

impl Object {
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Object::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        if let Object::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            Object::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        if let Object::Name(n) = self {
            Some(n)
        } else {
            None
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        if let Object::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        if let Object::Array(a) = self {
            Some(a)
        } else {
            None
        }
    }

    /// Try to cast to dictionary. Works for both Dict and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream(s) => Some(&mut s.dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        if let Object::Stream(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_ref_id(&self) -> Option<ObjRef> {
        if let Object::Ref(r) = self {
            Some(*r)
        } else {
            None
        }
    }

    /// Get the type name of this object (without data)
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Bool(_) => "Boolean",
            Object::Int(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dict(_) => "Dictionary",
            Object::Stream(_) => "Stream",
            Object::Ref(_) => "Reference",
        }
    }
}

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Object::String(PdfString::binary(s.as_bytes().to_vec()))
    }
}

impl From<i64> for Object {
    fn from(i: i64) -> Self {
        Object::Int(i)
    }
}

impl From<f64> for Object {
    fn from(r: f64) -> Self {
        Object::Real(r)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Bool(b)
    }
}

impl From<Name> for Object {
    fn from(n: Name) -> Self {
        Object::Name(n)
    }
}

impl From<ObjRef> for Object {
    fn from(r: ObjRef) -> Self {
        Object::Ref(r)
    }
}

/// Build a [`Dict`] from `(key, value)` pairs
pub fn dict_from(pairs: impl IntoIterator<Item = (&'static str, Object)>) -> Dict {
    pairs
        .into_iter()
        .map(|(k, v)| (Name::new(k), v))
        .collect()
}
