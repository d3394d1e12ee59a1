//! Lowering of XML Schema documents into a language-neutral catalog of enumerations, records
//! and root element bindings that code emitters consume.

mod builtins;
mod catalog;
mod diagnostics;
mod error;
mod lowering;
mod naming;
mod registry;
mod values;

pub use builtins::{Primitive, XS_NAMESPACE};
pub use catalog::{
    Catalog, ChoiceBranch, ElementBinding, EnumDef, Field, FieldKind, GroupDef, MaxOccurs,
    RecordDef, TypeRef,
};
pub use diagnostics::{Diagnostic, Severity};
pub use error::XsdError;
pub use lowering::{parse_schema, read_schema, LoweredSchema};
pub use naming::{
    display_name, is_reserved, normalize_enum_value, sanitize, strip_prefix, to_camel_case,
    to_upper_case,
};
pub use registry::{Resolution, TypeRegistry};
