use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// Namespace used by the XSD specification (pt. 1, §1.3.1)
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// A target-independent scalar type that built-in XSD types project onto.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Int32,
    Int64,
    Int16,
    UInt32,
    UInt64,
    UInt16,
    Double,
    Float,
    Bool,
    /// A sequence of octets (`base64Binary`, `hexBinary`)
    Bytes,
}

impl Primitive {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Int16 => "int16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::UInt16 => "uint16",
            Self::Double => "double",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    /// The seed table of the type registry. These are the only built-ins recognized; the keys are
    /// spelled with the conventional `xs:` prefix.
    pub(crate) static ref BUILTIN_TYPES: HashMap<&'static str, Primitive> = {
        use Primitive::*;
        [
            ("xs:string", String),
            ("xs:date", String),
            ("xs:dateTime", String),
            ("xs:time", String),
            ("xs:anyURI", String),
            ("xs:QName", String),
            ("xs:Name", String),
            ("xs:normalizedString", String),
            ("xs:token", String),
            ("xs:int", Int32),
            ("xs:integer", Int32),
            ("xs:long", Int64),
            ("xs:short", Int16),
            ("xs:unsignedInt", UInt32),
            ("xs:positiveInteger", UInt32),
            ("xs:nonNegativeInteger", UInt32),
            // Not an XSD built-in, but common enough in register description schemas to be seeded
            ("scaledNonNegativeInteger", UInt32),
            ("xs:unsignedLong", UInt64),
            ("xs:unsignedShort", UInt16),
            ("xs:decimal", Double),
            ("xs:double", Double),
            ("xs:float", Float),
            ("xs:boolean", Bool),
            ("xs:base64Binary", Bytes),
            ("xs:hexBinary", Bytes),
        ]
        .into_iter()
        .collect()
    };
}

pub(crate) fn lookup_builtin(name: &str) -> Option<Primitive> {
    BUILTIN_TYPES.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_table_projects_integers() {
        assert_eq!(lookup_builtin("xs:int"), Some(Primitive::Int32));
        assert_eq!(lookup_builtin("xs:integer"), Some(Primitive::Int32));
        assert_eq!(lookup_builtin("xs:unsignedShort"), Some(Primitive::UInt16));
        assert_eq!(
            lookup_builtin("scaledNonNegativeInteger"),
            Some(Primitive::UInt32)
        );
    }

    #[test]
    fn only_the_xs_spelling_is_seeded() {
        assert_eq!(lookup_builtin("string"), None);
        assert_eq!(lookup_builtin("xsd:string"), None);
        assert_eq!(lookup_builtin("xs:byte"), None);
    }
}
