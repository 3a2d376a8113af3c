//! Document and object table
//!
//! The [`Document`] owns every indirect object through an oid-keyed
//! [`ObjectTable`] (the in-memory form of the file's cross-reference
//! table), resolves references, wraps raw values into typed dictionaries
//! and allocates object numbers for new objects.
//!
//! Dangling references are not an error: they dereference to Null.

use crate::config::Config;
use crate::dict::TypedDict;
use crate::error::{Error, Result};
use crate::indirect::IndirectObject;
use crate::object::{Dict, ObjRef, Object};
use crate::schema::DictClass;
use crate::types::{CATALOG, DICTIONARY, TRAILER};
use crate::version::PdfVersion;
use std::collections::BTreeMap;

static NULL: Object = Object::Null;

/// State of a slot in the object table
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    /// A live object
    InUse(IndirectObject),
    /// Deleted but retained until the next write; dereferences read Null
    Deleted(IndirectObject),
    /// Allocated and never filled
    Free { gen: u16 },
}

impl TableEntry {
    pub fn is_in_use(&self) -> bool {
        matches!(self, TableEntry::InUse(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, TableEntry::Deleted(_))
    }

    pub fn is_free(&self) -> bool {
        matches!(self, TableEntry::Free { .. })
    }
}

/// The oid-keyed object store
#[derive(Debug, Default)]
pub struct ObjectTable {
    entries: BTreeMap<u32, TableEntry>,
    max_num: u32,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object, replacing whatever occupied its slot
    pub fn insert(&mut self, object: IndirectObject) {
        let num = object.oid().num;
        if num > self.max_num {
            self.max_num = num;
        }
        self.entries.insert(num, TableEntry::InUse(object));
    }

    pub fn entry(&self, num: u32) -> Option<&TableEntry> {
        self.entries.get(&num)
    }

    /// The live object with exactly this oid (number and generation)
    pub fn object(&self, oid: ObjRef) -> Option<&IndirectObject> {
        match self.entries.get(&oid.num) {
            Some(TableEntry::InUse(obj)) if obj.oid().gen == oid.gen => Some(obj),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, oid: ObjRef) -> Option<&mut IndirectObject> {
        match self.entries.get_mut(&oid.num) {
            Some(TableEntry::InUse(obj)) if obj.oid().gen == oid.gen => Some(obj),
            _ => None,
        }
    }

    /// Allocate the next object number. The slot starts out free.
    pub fn allocate(&mut self) -> u32 {
        self.max_num += 1;
        self.entries.insert(self.max_num, TableEntry::Free { gen: 0 });
        self.max_num
    }

    /// Mark an object deleted. It is retained for enumeration but no
    /// longer dereferences.
    pub fn delete(&mut self, oid: ObjRef) -> bool {
        let Some(entry) = self.entries.get_mut(&oid.num) else {
            return false;
        };
        if !matches!(&*entry, TableEntry::InUse(obj) if obj.oid().gen == oid.gen) {
            return false;
        }
        let old = std::mem::replace(entry, TableEntry::Free { gen: oid.gen });
        if let TableEntry::InUse(object) = old {
            *entry = TableEntry::Deleted(object);
        }
        true
    }

    pub fn max_num(&self) -> u32 {
        self.max_num
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn in_use_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_in_use()).count()
    }

    pub fn deleted_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_deleted()).count()
    }

    pub fn free_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_free()).count()
    }

    /// Iterate stored objects in object number order. With `current` only
    /// live objects are yielded; without it deleted ones are included.
    pub fn each(&self, current: bool) -> impl Iterator<Item = &IndirectObject> {
        self.entries.values().filter_map(move |entry| match entry {
            TableEntry::InUse(obj) => Some(obj),
            TableEntry::Deleted(obj) if !current => Some(obj),
            _ => None,
        })
    }
}

/// An in-memory PDF document: object table, trailer, version and
/// configuration
#[derive(Debug)]
pub struct Document {
    table: ObjectTable,
    trailer: Dict,
    version: PdfVersion,
    config: Config,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            table: ObjectTable::new(),
            trailer: Dict::new(),
            version: PdfVersion::default(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn version(&self) -> PdfVersion {
        self.version
    }

    pub fn set_version(&mut self, version: PdfVersion) {
        self.version = version;
    }

    /// Make sure the document version is at least `min`, upgrading it when
    /// allowed and failing with a version conflict otherwise. `field`
    /// names the schema field that triggered the check.
    pub fn enforce_version(&mut self, field: &str, min: PdfVersion) -> Result<()> {
        if self.version >= min {
            return Ok(());
        }
        if self.config.auto_upgrade_version {
            self.version = min;
            Ok(())
        } else {
            Err(Error::VersionConflict {
                field: field.to_string(),
                needed: min.to_string(),
                current: self.version.to_string(),
            })
        }
    }

    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    pub fn set_trailer(&mut self, trailer: Dict) {
        self.trailer = trailer;
    }

    /// The trailer viewed through its schema
    pub fn trailer_typed(&self) -> TypedDict {
        TypedDict::new(&TRAILER, self.trailer.clone(), ObjRef::DIRECT)
    }

    /// Store a parsed object under its oid (parser hand-off; the parser
    /// performs no coercion)
    pub fn insert_object(&mut self, num: u32, gen: u16, value: Object) {
        self.table
            .insert(IndirectObject::new(ObjRef::new(num, gen), value));
    }

    /// Add a new object, allocating the next object number
    pub fn add(&mut self, value: Object) -> ObjRef {
        let num = self.table.allocate();
        let oid = ObjRef::new(num, 0);
        let mut object = IndirectObject::new(oid, value);
        object.mark_dirty();
        self.table.insert(object);
        oid
    }

    pub fn object(&self, oid: ObjRef) -> Option<&IndirectObject> {
        self.table.object(oid)
    }

    pub fn object_mut(&mut self, oid: ObjRef) -> Option<&mut IndirectObject> {
        self.table.object_mut(oid)
    }

    /// Delete an object; later dereferences of its oid read Null
    pub fn delete(&mut self, oid: ObjRef) -> bool {
        self.table.delete(oid)
    }

    pub fn table(&self) -> &ObjectTable {
        &self.table
    }

    /// Resolve `value` if it is a reference; other values pass through.
    /// Dangling references resolve to Null.
    pub fn deref<'a>(&'a self, value: &'a Object) -> &'a Object {
        match value {
            Object::Ref(r) => self.deref_oid(*r),
            other => other,
        }
    }

    /// Resolve an oid; dangling oids read as Null
    pub fn deref_oid(&self, oid: ObjRef) -> &Object {
        self.table
            .object(oid)
            .map(IndirectObject::value)
            .unwrap_or(&NULL)
    }

    /// Like [`Document::deref`] but failing on unresolvable references
    pub fn deref_strict<'a>(&'a self, value: &'a Object) -> Result<&'a Object> {
        match value {
            Object::Ref(r) => self
                .table
                .object(*r)
                .map(IndirectObject::value)
                .ok_or(Error::UnresolvableReference {
                    num: r.num,
                    gen: r.gen,
                }),
            other => Ok(other),
        }
    }

    /// Wrap a dictionary-shaped value into a typed dictionary.
    ///
    /// Without an explicit class the `/Type` entry is looked up in the
    /// configured type map; unknown types wrap as the generic dictionary
    /// class.
    pub fn wrap(&self, value: &Object, class: Option<&'static DictClass>) -> Result<TypedDict> {
        self.wrap_at(value, class, ObjRef::DIRECT)
    }

    /// Wrap the object stored under `oid`, keeping its identity attached
    pub fn typed(&self, oid: ObjRef, class: Option<&'static DictClass>) -> Result<TypedDict> {
        let object = self
            .table
            .object(oid)
            .ok_or(Error::UnresolvableReference {
                num: oid.num,
                gen: oid.gen,
            })?;
        self.wrap_at(object.value(), class, oid)
    }

    fn wrap_at(
        &self,
        value: &Object,
        class: Option<&'static DictClass>,
        oid: ObjRef,
    ) -> Result<TypedDict> {
        let dict = value.as_dict().ok_or_else(|| {
            Error::generic(format!("Cannot wrap a {} as dictionary", value.type_name()))
        })?;
        let class = class
            .or_else(|| {
                dict.get("Type")
                    .and_then(Object::as_name)
                    .and_then(|n| self.config.class_for(n.as_str()))
            })
            .unwrap_or(&DICTIONARY);
        Ok(TypedDict::new(class, dict.clone(), oid))
    }

    /// Store a (possibly modified) typed dictionary back under its oid
    pub fn update(&mut self, typed: &TypedDict) -> Result<()> {
        let oid = typed.oid();
        if !oid.is_indirect() {
            return Err(Error::generic(
                "Cannot store a direct dictionary back into the object table",
            ));
        }
        let object = self
            .table
            .object_mut(oid)
            .ok_or(Error::UnresolvableReference {
                num: oid.num,
                gen: oid.gen,
            })?;
        match object.value_mut() {
            Object::Stream(stream) => stream.dict = typed.dict().clone(),
            other => *other = Object::Dict(typed.dict().clone()),
        }
        Ok(())
    }

    /// Iterate stored objects; see [`ObjectTable::each`]
    pub fn each(&self, current: bool) -> impl Iterator<Item = &IndirectObject> {
        self.table.each(current)
    }

    /// Live objects whose `/Type` is `name`
    pub fn iter_type<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a IndirectObject> {
        self.each(true)
            .filter(move |obj| obj.type_name().is_some_and(|n| n.as_str() == name))
    }

    /// The document catalog, typed
    pub fn catalog(&self) -> Result<TypedDict> {
        match self.trailer.get("Root") {
            Some(Object::Ref(r)) => self.typed(*r, Some(&CATALOG)),
            Some(value) => self.wrap(value, Some(&CATALOG)),
            None => Err(Error::missing_field("Root")),
        }
    }

    /// Validate every object that wraps into a registered class, plus the
    /// trailer. Returns overall success and the collected diagnostics.
    pub fn validate(&mut self, auto_correct: bool) -> (bool, Vec<String>) {
        let mut ok = true;
        let mut messages = Vec::new();

        let mut trailer = self.trailer_typed();
        let (trailer_ok, trailer_messages) = trailer.validate(self, auto_correct);
        ok &= trailer_ok;
        messages.extend(trailer_messages.into_iter().map(|m| format!("trailer: {}", m)));
        if trailer.is_dirty() {
            self.trailer = trailer.into_dict();
        }

        let oids: Vec<ObjRef> = self.each(true).map(IndirectObject::oid).collect();
        for oid in oids {
            let class = self
                .object(oid)
                .and_then(IndirectObject::type_name)
                .and_then(|n| self.config.class_for(n.as_str()));
            let Some(class) = class else { continue };

            let mut typed = match self.typed(oid, Some(class)) {
                Ok(typed) => typed,
                Err(_) => continue,
            };
            let (object_ok, object_messages) = typed.validate(self, auto_correct);
            ok &= object_ok;
            messages.extend(
                object_messages
                    .into_iter()
                    .map(|m| format!("{} ({}): {}", oid, class.name, m)),
            );
            if typed.is_dirty() {
                ok &= self.update(&typed).is_ok();
            }
        }

        (ok, messages)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
