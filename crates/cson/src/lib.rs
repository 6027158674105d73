//! Mutable JSON document model.
//!
//! A [`Value`] tree is built by the non-recursive [`parse_source`] from any
//! [`TokenSource`], or incrementally through the [`EventSink`] events of a
//! [`TreeWriter`]. Trees are written back out as events in an order chosen
//! by a [`Canonicalizer`], rendered as text by [`TextWriter`], and bridged to
//! serde, in both directions, and `serde_json`.

mod accessors;
mod canonical;
mod error;
mod interop;
mod number;
mod parser;
mod sink;
mod text;
mod value;
mod writer;

pub mod config;
pub mod de;
pub mod ser;

pub use cson_token::{TextReader, TokenError, TokenKind, TokenSource};

pub use canonical::{Canonicalizer, Elements, KeyComparator, Members, SortMode};
pub use config::CsonConfig;
pub use de::{from_value, ValueDeserializer};
pub use error::{CsonError, Result};
pub use interop::drain_json_value;
pub use number::Number;
pub use parser::{from_slice, from_str, parse_source};
pub use ser::{to_value, EventSerializer};
pub use sink::EventSink;
pub use text::{to_string, to_string_pretty, to_string_with, Formatting, TextWriter};
pub use value::{Array, Object, Primitive, Value};
pub use writer::TreeWriter;
