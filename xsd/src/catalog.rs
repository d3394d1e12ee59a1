//! The intermediate model produced by lowering.
//!
//! Type references between definitions are stored by name, so forward and cyclic references need
//! no ordering between the definitions themselves.

use std::fmt;

use indexmap::IndexMap;

use crate::builtins::Primitive;

/// Reference to the type of a field, an enum base or a record base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    /// A user type, bound late by identifier. The definition may appear anywhere in the catalog,
    /// or not at all when the schema refers to a type it never declares.
    Named(String),
    /// The collapsed alternatives of an `xs:choice`.
    Choice(Vec<ChoiceBranch>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceBranch {
    pub ident: String,
    pub type_: TypeRef,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl Default for TypeRef {
    fn default() -> Self {
        Self::Primitive(Primitive::String)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Named(name) => f.write_str(name),
            Self::Choice(branches) => {
                f.write_str("choice<")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", branch.type_)?;
                }
                f.write_str(">")
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Unbounded,
    Count(u32),
}

impl MaxOccurs {
    pub const ONE: Self = Self::Count(1);

    pub fn is_single(self) -> bool {
        self == Self::ONE
    }

    /// The conventional integer encoding, with `-1` standing for unbounded.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unbounded => -1,
            Self::Count(n) => i64::from(n),
        }
    }
}

impl Default for MaxOccurs {
    fn default() -> Self {
        Self::ONE
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Attribute,
    Element,
    Choice,
}

/// One attribute, element, or collapsed choice within a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub ident: String,
    pub type_: TypeRef,
    pub kind: FieldKind,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub is_optional: bool,
    pub documentation: String,
}

impl Field {
    pub fn new(ident: impl Into<String>, type_: TypeRef, kind: FieldKind) -> Self {
        Self {
            ident: ident.into(),
            type_,
            kind,
            min_occurs: 1,
            max_occurs: MaxOccurs::ONE,
            is_optional: false,
            documentation: String::new(),
        }
    }

    /// Marks the field as optional, which implies `minOccurs = 0`.
    pub fn make_optional(&mut self) {
        self.is_optional = true;
        self.min_occurs = 0;
    }

    pub fn is_repeated(&self) -> bool {
        !self.max_occurs.is_single()
    }
}

/// One enumerated simple type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumDef {
    pub orig_name: String,
    pub ident: String,
    pub display_name: String,
    pub base_type: TypeRef,
    /// The literal `value`s in source order, duplicates included.
    pub values: Vec<String>,
    pub documentation: String,
}

/// One complex type, either declared by name or hoisted from an inline definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDef {
    pub orig_name: String,
    pub ident: String,
    pub display_name: String,
    /// Set from `complexContent/extension`; the base fields are not copied.
    pub base_type: Option<TypeRef>,
    pub is_abstract: bool,
    pub is_root: bool,
    pub fields: Vec<Field>,
    pub documentation: String,
}

impl RecordDef {
    pub fn field(&self, ident: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.ident == ident)
    }
}

/// A top-level `xs:element` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementBinding {
    pub ident: String,
    /// The raw `type` attribute, empty for inline types.
    pub type_: String,
    pub documentation: String,
    /// Whether the raw type carries a namespace prefix.
    pub is_complex: bool,
    /// Identifier of the record lowered from an inline complex type.
    pub root_record: Option<String>,
}

/// A named model group, kept out of the record list and inlined wherever it is referenced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupDef {
    pub orig_name: String,
    pub fields: Vec<Field>,
    pub documentation: String,
}

/// All definitions of one run, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub target_namespace: Option<String>,
    pub enums: Vec<EnumDef>,
    pub records: Vec<RecordDef>,
    pub elements: Vec<ElementBinding>,
    pub groups: IndexMap<String, GroupDef>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn enum_by_ident(&self, ident: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.ident == ident)
    }

    pub fn record_by_ident(&self, ident: &str) -> Option<&RecordDef> {
        self.records.iter().find(|r| r.ident == ident)
    }

    /// Looks a record up by the name fields use to refer to it, i.e. its identifier or its
    /// camel-cased display name.
    pub fn record_by_reference(&self, name: &str) -> Option<&RecordDef> {
        self.records
            .iter()
            .find(|r| r.ident == name || r.display_name == name)
    }

    pub fn enum_by_reference(&self, name: &str) -> Option<&EnumDef> {
        self.enums
            .iter()
            .find(|e| e.ident == name || e.display_name == name)
    }

    pub fn element_by_ident(&self, ident: &str) -> Option<&ElementBinding> {
        self.elements.iter().find(|e| e.ident == ident)
    }

    pub fn group(&self, name: &str) -> Option<&GroupDef> {
        self.groups.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_display_lists_branch_types() {
        let choice = TypeRef::Choice(vec![
            ChoiceBranch {
                ident: "a".into(),
                type_: TypeRef::Primitive(Primitive::Int32),
            },
            ChoiceBranch {
                ident: "b".into(),
                type_: TypeRef::named("Point"),
            },
        ]);
        assert_eq!(choice.to_string(), "choice<int32, Point>");
    }

    #[test]
    fn unbounded_encodes_as_minus_one() {
        assert_eq!(MaxOccurs::Unbounded.as_i64(), -1);
        assert_eq!(MaxOccurs::Count(4).as_i64(), 4);
        assert!(MaxOccurs::default().is_single());
    }

    #[test]
    fn optional_fields_have_zero_min_occurs() {
        let mut field = Field::new("x", TypeRef::default(), FieldKind::Element);
        assert_eq!(field.min_occurs, 1);
        field.make_optional();
        assert!(field.is_optional);
        assert_eq!(field.min_occurs, 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut catalog = Catalog::new();
        catalog.target_namespace = Some("urn:x".into());
        catalog.elements.push(ElementBinding {
            ident: "root".into(),
            type_: String::new(),
            documentation: String::new(),
            is_complex: false,
            root_record: None,
        });
        catalog.clear();
        assert_eq!(catalog, Catalog::default());
    }
}
