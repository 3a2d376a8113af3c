//! Field schemas for typed dictionaries
//!
//! Every typed dictionary class carries a declarative table of its fields:
//! allowed types, required flag, default value, indirect rule and the
//! minimum PDF version the field needs. A field binds a converter from the
//! registry in [`crate::convert`] at construction time; the converter may
//! extend the set of allowed types (a Date field also accepts strings, a
//! Rectangle field also accepts plain arrays).

use crate::convert::{self, Converter};
use crate::object::Object;
use crate::version::PdfVersion;
use std::fmt;
use std::sync::LazyLock;

/// A type a field value may have.
///
/// Besides the concrete value shapes this includes class references
/// ([`TypeTag::Class`]), lazily resolved class names ([`TypeTag::Lazy`],
/// looked up through the configured type map at access time) and the
/// meta-tags `ByteString`, `Date` and `Rectangle` that drive coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeTag {
    Boolean,
    Integer,
    Real,
    Name,
    String,
    ByteString,
    Date,
    Array,
    Dictionary,
    Stream,
    Rectangle,
    /// A concrete typed-dictionary class
    Class(&'static DictClass),
    /// A class referenced by name, resolved through the type map
    Lazy(&'static str),
}

impl TypeTag {
    /// Whether `value` (already dereferenced) is acceptable for this tag
    pub fn matches(&self, value: &Object) -> bool {
        match self {
            TypeTag::Boolean => matches!(value, Object::Bool(_)),
            TypeTag::Integer => matches!(value, Object::Int(_)),
            TypeTag::Real => matches!(value, Object::Int(_) | Object::Real(_)),
            TypeTag::Name => matches!(value, Object::Name(_)),
            // Dates are stored as strings and coerced on read
            TypeTag::String | TypeTag::ByteString | TypeTag::Date => {
                matches!(value, Object::String(_))
            }
            TypeTag::Array => matches!(value, Object::Array(_)),
            TypeTag::Stream => matches!(value, Object::Stream(_)),
            // Streams are dictionary-shaped as well
            TypeTag::Dictionary | TypeTag::Class(_) | TypeTag::Lazy(_) => {
                matches!(value, Object::Dict(_) | Object::Stream(_))
            }
            TypeTag::Rectangle => value
                .as_array()
                .is_some_and(|a| a.len() == 4 && a.iter().all(|v| v.as_real().is_some())),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Class(c) => write!(f, "{}", c.name),
            TypeTag::Lazy(n) => write!(f, "{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Whether a field value has to be stored as an indirect object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndirectRule {
    MustBeIndirect,
    MustBeDirect,
    #[default]
    Either,
}

/// A single schema entry
pub struct Field {
    name: &'static str,
    types: Vec<TypeTag>,
    required: bool,
    default: Option<Object>,
    indirect: IndirectRule,
    min_version: Option<PdfVersion>,
    converter: &'static dyn Converter,
}

impl Field {
    /// Create a field accepting the given types. The first type is the
    /// canonical one: dictionary-shaped coercions wrap into it. Binds the
    /// first matching converter from the registry and augments the type
    /// list with the converter's additional types.
    pub fn new(name: &'static str, types: &[TypeTag]) -> Self {
        assert!(!types.is_empty(), "field {} needs at least one type", name);
        let converter = convert::converter_for(&types[0]);
        let mut types = types.to_vec();
        for extra in converter.additional_types() {
            if !types.contains(extra) {
                types.push(*extra);
            }
        }
        Self {
            name,
            types,
            required: false,
            default: None,
            indirect: IndirectRule::Either,
            min_version: None,
            converter,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Object) -> Self {
        self.default = Some(value);
        self
    }

    pub fn indirect(mut self, rule: IndirectRule) -> Self {
        self.indirect = rule;
        self
    }

    pub fn min_version(mut self, version: PdfVersion) -> Self {
        self.min_version = Some(version);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The augmented, deduplicated type list
    pub fn types(&self) -> &[TypeTag] {
        &self.types
    }

    /// The declared canonical type
    pub fn first_type(&self) -> &TypeTag {
        &self.types[0]
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// A fresh duplicate of the default value. Composite defaults are
    /// deep-cloned so callers never alias the schema's copy.
    pub fn default_value(&self) -> Option<Object> {
        self.default.clone()
    }

    pub fn indirect_rule(&self) -> IndirectRule {
        self.indirect
    }

    pub fn min_pdf_version(&self) -> Option<PdfVersion> {
        self.min_version
    }

    pub fn converter(&self) -> &'static dyn Converter {
        self.converter
    }

    /// Whether `value` (already dereferenced) matches one of the allowed
    /// types
    pub fn allows(&self, value: &Object) -> bool {
        self.types.iter().any(|t| t.matches(value))
    }

    /// Human-readable list of allowed types, for diagnostics
    pub fn types_description(&self) -> String {
        let names: Vec<String> = self.types.iter().map(|t| t.to_string()).collect();
        names.join("|")
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("types", &self.types)
            .field("required", &self.required)
            .field("indirect", &self.indirect)
            .field("min_version", &self.min_version)
            .finish()
    }
}

/// A typed-dictionary class: a name, an optional `/Type` value, an optional
/// superclass and a field table.
///
/// Field declarations are inherited; a subclass redeclaring a field name
/// replaces the inherited entry wholesale.
pub struct DictClass {
    pub name: &'static str,
    /// The value the `/Type` key carries for instances of this class
    pub type_name: Option<&'static str>,
    pub superclass: Option<&'static DictClass>,
    fields: LazyLock<Vec<Field>>,
}

impl DictClass {
    pub const fn new(
        name: &'static str,
        type_name: Option<&'static str>,
        superclass: Option<&'static DictClass>,
        fields: fn() -> Vec<Field>,
    ) -> Self {
        Self {
            name,
            type_name,
            superclass,
            fields: LazyLock::new(fields),
        }
    }

    /// Look up a field, walking up the superclass chain
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.superclass.and_then(|s| s.field(name)))
    }

    /// All fields, own declarations shadowing inherited ones
    pub fn each_field(&self) -> Vec<&Field> {
        let mut result: Vec<&Field> = self.fields.iter().collect();
        let mut class = self.superclass;
        while let Some(c) = class {
            for field in c.fields.iter() {
                if !result.iter().any(|f| f.name == field.name) {
                    result.push(field);
                }
            }
            class = c.superclass;
        }
        result
    }

    /// Whether this class is `other` or inherits from it
    pub fn is_a(&self, other: &DictClass) -> bool {
        if std::ptr::eq(self, other) || self.name == other.name {
            return true;
        }
        self.superclass.is_some_and(|s| s.is_a(other))
    }
}

impl PartialEq for DictClass {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for DictClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictClass").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{dict_from, Name, PdfString};
    use crate::types::{DICTIONARY, FILESPEC, PAGES};

    #[test]
    fn test_type_tag_matches_scalars() {
        assert!(TypeTag::Boolean.matches(&Object::Bool(true)));
        assert!(TypeTag::Integer.matches(&Object::Int(3)));
        assert!(!TypeTag::Integer.matches(&Object::Real(3.0)));
        // Real fields accept integers
        assert!(TypeTag::Real.matches(&Object::Int(3)));
        assert!(TypeTag::Name.matches(&Object::Name(Name::new("X"))));
    }

    #[test]
    fn test_type_tag_matches_shapes() {
        let dict = Object::Dict(dict_from([("A", Object::Int(1))]));
        assert!(TypeTag::Dictionary.matches(&dict));
        assert!(TypeTag::Class(&PAGES).matches(&dict));
        assert!(TypeTag::Lazy("Pages").matches(&dict));
        assert!(!TypeTag::Array.matches(&dict));
    }

    #[test]
    fn test_type_tag_matches_rectangle() {
        let rect = Object::Array(vec![
            Object::Int(0),
            Object::Int(1),
            Object::Real(2.5),
            Object::Int(3),
        ]);
        assert!(TypeTag::Rectangle.matches(&rect));
        let short = Object::Array(vec![Object::Int(0)]);
        assert!(!TypeTag::Rectangle.matches(&short));
        let non_numeric = Object::Array(vec![
            Object::Int(0),
            Object::Int(1),
            Object::from("x"),
            Object::Int(3),
        ]);
        assert!(!TypeTag::Rectangle.matches(&non_numeric));
    }

    #[test]
    fn test_field_augments_types() {
        // A Date field also accepts plain strings after augmentation
        let field = Field::new("ModDate", &[TypeTag::Date]);
        assert!(field.types().contains(&TypeTag::String));
        assert_eq!(*field.first_type(), TypeTag::Date);
    }

    #[test]
    fn test_field_augmentation_dedupes() {
        let field = Field::new("F", &[TypeTag::ByteString, TypeTag::String]);
        let strings = field
            .types()
            .iter()
            .filter(|t| **t == TypeTag::String)
            .count();
        assert_eq!(strings, 1);
    }

    #[test]
    fn test_field_rectangle_accepts_array() {
        let field = Field::new("MediaBox", &[TypeTag::Rectangle]);
        assert!(field.types().contains(&TypeTag::Array));
    }

    #[test]
    fn test_field_default_is_fresh_copy() {
        let field = Field::new("Kids", &[TypeTag::Array]).default(Object::Array(vec![]));
        let mut a = field.default_value().unwrap();
        if let Object::Array(v) = &mut a {
            v.push(Object::Int(1));
        }
        // The next read is unaffected by mutation of the previous copy
        assert_eq!(field.default_value().unwrap(), Object::Array(vec![]));
    }

    #[test]
    fn test_field_allows() {
        let field = Field::new("Rotate", &[TypeTag::Integer]);
        assert!(field.allows(&Object::Int(90)));
        assert!(!field.allows(&Object::from("90")));
    }

    #[test]
    fn test_date_field_allows_string() {
        let field = Field::new("CreationDate", &[TypeTag::Date]);
        assert!(field.allows(&Object::String(PdfString::binary(b"D:1998".to_vec()))));
    }

    #[test]
    fn test_class_inheritance_lookup() {
        // Filespec inherits nothing of interest but walks to Dictionary
        assert!(FILESPEC.is_a(&DICTIONARY));
        assert!(!DICTIONARY.is_a(&FILESPEC));
        assert!(FILESPEC.field("FS").is_some());
        assert!(FILESPEC.field("NoSuchField").is_none());
    }

    #[test]
    fn test_each_field_shadows_inherited() {
        static BASE: DictClass = DictClass::new("TestBase", None, None, || {
            vec![
                Field::new("A", &[TypeTag::Integer]),
                Field::new("B", &[TypeTag::Integer]),
            ]
        });
        static SUB: DictClass = DictClass::new("TestSub", None, Some(&BASE), || {
            vec![Field::new("A", &[TypeTag::String]).required()]
        });

        let fields = SUB.each_field();
        assert_eq!(fields.len(), 2);
        // The subclass declaration replaces the inherited one wholesale
        let a = SUB.field("A").unwrap();
        assert!(a.is_required());
        assert!(a.types().contains(&TypeTag::String));
        assert!(!a.types().contains(&TypeTag::Integer));
        assert!(SUB.field("B").is_some());
    }
}
