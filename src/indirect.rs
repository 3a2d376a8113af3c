//! Indirect objects
//!
//! An [`IndirectObject`] pairs a value with its identity in the object
//! table: the (object number, generation) oid plus the bookkeeping flags
//! the writer needs (dirty tracking, forced indirectness).

use crate::object::{Name, ObjRef, Object};

/// A value together with its oid and bookkeeping flags
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    oid: ObjRef,
    value: Object,
    must_be_indirect: bool,
    dirty: bool,
}

impl IndirectObject {
    pub fn new(oid: ObjRef, value: Object) -> Self {
        Self {
            oid,
            value,
            must_be_indirect: false,
            dirty: false,
        }
    }

    pub fn oid(&self) -> ObjRef {
        self.oid
    }

    pub fn value(&self) -> &Object {
        &self.value
    }

    /// Mutable access to the value; the object is marked dirty
    pub fn value_mut(&mut self) -> &mut Object {
        self.dirty = true;
        &mut self.value
    }

    pub fn set_value(&mut self, value: Object) {
        self.value = value;
        self.dirty = true;
    }

    /// Raw dictionary lookup for dictionary-valued objects. Returns Null
    /// for absent keys and for non-dictionary values.
    pub fn key(&self, name: &str) -> &Object {
        static NULL: Object = Object::Null;
        self.value
            .as_dict()
            .and_then(|d| d.get(name))
            .unwrap_or(&NULL)
    }

    /// The `/Type` of dictionary-valued objects
    pub fn type_name(&self) -> Option<&Name> {
        self.value
            .as_dict()
            .and_then(|d| d.get("Type"))
            .and_then(Object::as_name)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Whether a field schema demanded this object be written indirectly
    pub fn must_be_indirect(&self) -> bool {
        self.must_be_indirect
    }

    pub fn set_must_be_indirect(&mut self, value: bool) {
        self.must_be_indirect = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::dict_from;

    #[test]
    fn test_new_object_is_clean() {
        let obj = IndirectObject::new(ObjRef::new(1, 0), Object::Int(5));
        assert!(!obj.is_dirty());
        assert!(!obj.must_be_indirect());
        assert_eq!(obj.oid(), ObjRef::new(1, 0));
    }

    #[test]
    fn test_set_value_marks_dirty() {
        let mut obj = IndirectObject::new(ObjRef::new(1, 0), Object::Int(5));
        obj.set_value(Object::Int(6));
        assert!(obj.is_dirty());
        assert_eq!(obj.value(), &Object::Int(6));
    }

    #[test]
    fn test_value_mut_marks_dirty() {
        let mut obj = IndirectObject::new(ObjRef::new(1, 0), Object::Array(vec![]));
        if let Object::Array(a) = obj.value_mut() {
            a.push(Object::Int(1));
        }
        assert!(obj.is_dirty());
    }

    #[test]
    fn test_key_on_dict_value() {
        let dict = dict_from([("Type", Object::Name(Name::new("Page")))]);
        let obj = IndirectObject::new(ObjRef::new(3, 0), Object::Dict(dict));
        assert_eq!(obj.key("Type").as_name().map(Name::as_str), Some("Page"));
        assert!(obj.key("Missing").is_null());
        assert_eq!(obj.type_name().map(Name::as_str), Some("Page"));
    }

    #[test]
    fn test_key_on_non_dict_value() {
        let obj = IndirectObject::new(ObjRef::new(3, 0), Object::Int(5));
        assert!(obj.key("Type").is_null());
        assert!(obj.type_name().is_none());
    }
}
