//! Typed dictionary access
//!
//! A [`TypedDict`] is a dictionary viewed through the field schema of its
//! class. Reads validate and coerce lazily, writes are type-checked, and
//! `validate` can repair missing required fields.
//!
//! The document is never stored inside the wrapper; every operation that
//! needs to resolve references or wrap nested dictionaries receives it as
//! an explicit parameter.

use crate::date::PdfDate;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{Dict, Name, ObjRef, Object};
use crate::schema::{DictClass, IndirectRule};
use crate::types::Rectangle;
use log::warn;

/// The result of a typed field read: either a plain value or one of the
/// typed views produced by coercion
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// An unconverted (or write-back converted) value
    Value(Object),
    /// A dictionary wrapped into its typed class
    Dict(TypedDict),
    /// A parsed date
    Date(PdfDate),
    /// A wrapped rectangle
    Rect(Rectangle),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Value(Object::Null))
    }

    pub fn as_object(&self) -> Option<&Object> {
        if let TypedValue::Value(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_dict(&self) -> Option<&TypedDict> {
        if let TypedValue::Dict(d) = self {
            Some(d)
        } else {
            None
        }
    }

    pub fn as_date(&self) -> Option<&PdfDate> {
        if let TypedValue::Date(d) = self {
            Some(d)
        } else {
            None
        }
    }

    pub fn as_rect(&self) -> Option<&Rectangle> {
        if let TypedValue::Rect(r) = self {
            Some(r)
        } else {
            None
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        self.as_object().and_then(Object::as_int)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_object()
            .and_then(Object::as_string)
            .and_then(|s| s.as_str())
    }
}

/// A dictionary with the field schema of a [`DictClass`] attached
#[derive(Debug, Clone)]
pub struct TypedDict {
    class: &'static DictClass,
    dict: Dict,
    oid: ObjRef,
    dirty: bool,
}

impl TypedDict {
    pub fn new(class: &'static DictClass, dict: Dict, oid: ObjRef) -> Self {
        Self {
            class,
            dict,
            oid,
            dirty: false,
        }
    }

    pub fn class(&self) -> &'static DictClass {
        self.class
    }

    pub fn oid(&self) -> ObjRef {
        self.oid
    }

    pub fn dict(&self) -> &Dict {
        &self.dict
    }

    pub fn into_dict(self) -> Dict {
        self.dict
    }

    /// Whether a write happened since wrapping
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The `/Type` of this dictionary, falling back to the class default
    pub fn type_name(&self) -> Name {
        self.dict
            .get("Type")
            .and_then(Object::as_name)
            .cloned()
            .unwrap_or_else(|| Name::new(self.class.type_name.unwrap_or(self.class.name)))
    }

    /// The stored value for `name` without dereferencing or coercion
    pub fn raw_key(&self, name: &str) -> Option<&Object> {
        self.dict.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.dict.contains_key(name)
    }

    /// Read a field.
    ///
    /// Resolution order: a missing key returns a fresh duplicate of the
    /// schema default (Null without one); references are resolved through
    /// the document, dangling ones reading as Null; when the field's
    /// converter applies, the coerced value is returned and, for plain
    /// values stored directly, memoized back into the dictionary.
    ///
    /// Coercion failures never fail the read: the raw value is returned
    /// and a diagnostic is logged.
    pub fn key(&mut self, name: &str, doc: &Document) -> TypedValue {
        let field = self.class.field(name);

        let (raw, stored_directly) = match self.dict.get(name) {
            None => {
                let default = field
                    .and_then(|f| f.default_value())
                    .unwrap_or(Object::Null);
                return TypedValue::Value(default);
            }
            Some(Object::Ref(r)) => (doc.deref_oid(*r).clone(), false),
            Some(v) => (v.clone(), true),
        };

        if let Some(field) = field {
            if field.converter().wants_convert(&raw, field.types()) {
                match field.converter().convert(&raw, field.types(), doc) {
                    Ok(TypedValue::Value(converted)) => {
                        if stored_directly {
                            // One-shot coercion: later reads see the converted value
                            self.dict.insert(Name::new(name), converted.clone());
                        }
                        return TypedValue::Value(converted);
                    }
                    Ok(other) => return other,
                    Err(err) => {
                        warn!("could not coerce /{} of a {}: {}", name, self.class.name, err);
                    }
                }
            }
        }

        TypedValue::Value(raw)
    }

    /// Write a field.
    ///
    /// When the class has a schema entry for `name` the value must match
    /// one of the allowed types (references are checked against their
    /// target), the document version is raised to the field's minimum when
    /// necessary, and the field's indirect rule is applied. Unknown keys
    /// are stored unconstrained.
    pub fn set_key(&mut self, name: &str, mut value: Object, doc: &mut Document) -> Result<()> {
        if let Some(field) = self.class.field(name) {
            {
                let check = match &value {
                    Object::Ref(r) => doc.deref_oid(*r),
                    v => v,
                };
                if !field.allows(check) {
                    return Err(Error::type_mismatch(
                        name,
                        field.types_description(),
                        check.type_name(),
                    ));
                }
            }

            if let Some(min) = field.min_pdf_version() {
                doc.enforce_version(name, min)?;
            }

            match field.indirect_rule() {
                IndirectRule::MustBeIndirect => {
                    if !matches!(value, Object::Ref(_)) {
                        let oid = doc.add(value);
                        if let Some(obj) = doc.object_mut(oid) {
                            obj.set_must_be_indirect(true);
                        }
                        value = Object::Ref(oid);
                    }
                }
                IndirectRule::MustBeDirect => {
                    if let Object::Ref(r) = value {
                        value = doc.deref_oid(r).clone();
                    }
                }
                IndirectRule::Either => {}
            }
        }

        self.dict.insert(Name::new(name), value);
        self.dirty = true;
        Ok(())
    }

    /// Remove a key, returning its previous value
    pub fn delete_key(&mut self, name: &str) -> Option<Object> {
        let old = self.dict.shift_remove(name);
        if old.is_some() {
            self.dirty = true;
        }
        old
    }

    /// Check this dictionary against its schema.
    ///
    /// Returns whether the dictionary is valid plus one message per
    /// problem found. With `auto_correct`, a missing required field is
    /// materialized from its default, or as a fresh instance when its
    /// canonical type is a dictionary class (a Catalog without `/Pages`
    /// gets an empty page tree).
    pub fn validate(&mut self, doc: &mut Document, auto_correct: bool) -> (bool, Vec<String>) {
        let mut ok = true;
        let mut messages = Vec::new();

        for field in self.class.each_field() {
            if !self.dict.contains_key(field.name()) {
                if !field.is_required() {
                    continue;
                }
                if !auto_correct {
                    ok = false;
                    messages.push(format!("Required field /{} is missing", field.name()));
                    continue;
                }

                if let Some(default) = field.default_value() {
                    self.dict.insert(Name::new(field.name()), default);
                    self.dirty = true;
                    messages.push(format!("Set /{} to its default value", field.name()));
                } else if let Some(class) = wrap_target_class(field.types(), doc) {
                    let mut dict = Dict::new();
                    if let Some(type_name) = class.type_name {
                        dict.insert(Name::new("Type"), Object::Name(Name::new(type_name)));
                    }
                    let value = if field.indirect_rule() == IndirectRule::MustBeIndirect {
                        let oid = doc.add(Object::Dict(dict));
                        if let Some(obj) = doc.object_mut(oid) {
                            obj.set_must_be_indirect(true);
                        }
                        Object::Ref(oid)
                    } else {
                        Object::Dict(dict)
                    };
                    self.dict.insert(Name::new(field.name()), value);
                    self.dirty = true;
                    messages.push(format!(
                        "Created missing /{} as a new {}",
                        field.name(),
                        class.name
                    ));
                } else {
                    ok = false;
                    messages.push(format!("Required field /{} is missing", field.name()));
                }
                continue;
            }

            let resolved = match self.dict.get(field.name()) {
                Some(Object::Ref(r)) => doc.deref_oid(*r).clone(),
                Some(v) => v.clone(),
                None => continue,
            };
            if !field.allows(&resolved) {
                ok = false;
                messages.push(format!(
                    "Field /{} should be {} but is {}",
                    field.name(),
                    field.types_description(),
                    resolved.type_name()
                ));
            }
        }

        (ok, messages)
    }
}

/// The first class-shaped type in `types`, resolved through the type map
fn wrap_target_class(
    types: &[crate::schema::TypeTag],
    doc: &Document,
) -> Option<&'static DictClass> {
    use crate::schema::TypeTag;
    types.iter().find_map(|t| match t {
        TypeTag::Class(c) => Some(*c),
        TypeTag::Lazy(name) => doc.config().class_for(name),
        _ => None,
    })
}

impl PartialEq for TypedDict {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.dict == other.dict
    }
}
