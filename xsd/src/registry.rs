use std::collections::HashMap;

use crate::builtins::{lookup_builtin, Primitive};
use crate::catalog::{Catalog, TypeRef};
use crate::naming::{sanitize, strip_prefix};

/// Outcome of resolving a qualified type name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub type_: TypeRef,
    pub is_builtin: bool,
}

impl Resolution {
    fn builtin(primitive: Primitive) -> Self {
        Self {
            type_: TypeRef::Primitive(primitive),
            is_builtin: true,
        }
    }

    fn user(name: impl Into<String>) -> Self {
        Self {
            type_: TypeRef::Named(name.into()),
            is_builtin: false,
        }
    }
}

/// Maps XSD type names onto intermediate type references.
///
/// Besides the fixed built-in table, the registry learns aliases while lowering: simple types that
/// restrict a base without enumerating values project to that primitive instead of becoming enums.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    aliases: HashMap<String, Primitive>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_alias(&mut self, name: impl Into<String>, primitive: Primitive) {
        self.aliases.insert(name.into(), primitive);
    }

    pub fn alias(&self, qname: &str) -> Option<Primitive> {
        self.aliases
            .get(qname)
            .or_else(|| self.aliases.get(strip_prefix(qname)))
            .copied()
    }

    pub fn is_enum(&self, name: &str, catalog: &Catalog) -> bool {
        catalog.enums.iter().any(|e| e.ident == name)
    }

    pub fn is_record(&self, name: &str, catalog: &Catalog) -> bool {
        catalog.records.iter().any(|r| r.ident == name)
    }

    /// Resolves `qname` against the built-ins, the learned aliases and the definitions lowered so
    /// far. Unknown names are forward references; they come back sanitized so that they agree with
    /// the identifier the declaration will eventually get.
    pub fn resolve(&self, qname: &str, catalog: &Catalog) -> Resolution {
        if let Some(primitive) = lookup_builtin(qname).or_else(|| self.alias(qname)) {
            return Resolution::builtin(primitive);
        }

        let local_name = strip_prefix(qname);
        if self.is_enum(local_name, catalog) || self.is_record(local_name, catalog) {
            return Resolution::user(local_name);
        }
        Resolution::user(sanitize(local_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EnumDef;

    #[test]
    fn builtins_resolve_to_primitives() {
        let registry = TypeRegistry::new();
        let catalog = Catalog::new();
        let resolved = registry.resolve("xs:long", &catalog);
        assert!(resolved.is_builtin);
        assert_eq!(resolved.type_, TypeRef::Primitive(Primitive::Int64));
    }

    #[test]
    fn aliases_resolve_with_or_without_prefix() {
        let mut registry = TypeRegistry::new();
        registry.register_alias("Blank", Primitive::String);
        let catalog = Catalog::new();
        for name in ["Blank", "tns:Blank"] {
            let resolved = registry.resolve(name, &catalog);
            assert!(resolved.is_builtin, "{name}");
            assert_eq!(resolved.type_, TypeRef::Primitive(Primitive::String));
        }
    }

    #[test]
    fn known_definitions_resolve_to_their_identifier() {
        let registry = TypeRegistry::new();
        let mut catalog = Catalog::new();
        catalog.enums.push(EnumDef {
            orig_name: "Access".into(),
            ident: "Access".into(),
            display_name: "Access".into(),
            base_type: TypeRef::default(),
            values: vec!["read".into()],
            documentation: String::new(),
        });
        let resolved = registry.resolve("svd:Access", &catalog);
        assert!(!resolved.is_builtin);
        assert_eq!(resolved.type_, TypeRef::named("Access"));
    }

    #[test]
    fn forward_references_are_sanitized() {
        let registry = TypeRegistry::new();
        let catalog = Catalog::new();
        let resolved = registry.resolve("tns:register-propertiesType", &catalog);
        assert!(!resolved.is_builtin);
        assert_eq!(resolved.type_, TypeRef::named("register_properties"));
    }
}
