//! pdfcore - the in-memory object model of a PDF library
//!
//! This crate implements the layer every other PDF subsystem builds on:
//! the value model for PDF objects, typed dictionaries with declarative
//! field schemas and lazy coercion, the document object table with
//! reference resolution, and the streaming Flate(+Predictor) filter
//! pipeline for stream payloads.
//!
//! # Modules
//!
//! - `object` - PDF values: names, strings, arrays, dictionaries, streams,
//!   references
//! - `indirect` - objects with identity (object number, generation)
//! - `schema` / `types` - field tables and the built-in dictionary classes
//! - `convert` - the converter registry coercing raw values at read time
//! - `document` - the object table, reference resolution and the typed
//!   wrapping factory
//! - `filter` - cooperative chunked codecs for stream payloads
//!
//! # Example
//!
//! ```
//! use pdfcore::{Document, Object, Name, dict_from};
//!
//! let mut doc = Document::new();
//! let oid = doc.add(Object::Dict(dict_from([
//!     ("Type", Object::Name(Name::new("Page"))),
//! ])));
//!
//! let mut page = doc.typed(oid, None).unwrap();
//! assert_eq!(page.class().name, "Page");
//! assert_eq!(page.key("Rotate", &doc).as_int(), Some(0));
//! ```

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod convert;
pub mod date;
pub mod dict;
pub mod document;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod indirect;
pub mod object;
pub mod schema;
pub mod types;
pub mod version;

pub use config::Config;
pub use date::PdfDate;
pub use dict::{TypedDict, TypedValue};
pub use document::Document;
pub use error::{Error, Result};
pub use indirect::IndirectObject;
pub use object::{dict_from, Array, Dict, Name, ObjRef, Object, PdfString, Stream};
pub use schema::{DictClass, Field, IndirectRule, TypeTag};
pub use types::Rectangle;
pub use version::PdfVersion;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
