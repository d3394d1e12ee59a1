use roxmltree::Node;

use super::documentation::documentation;
use super::xml::{attr, element_children, first_xs_child, is_xs};
use super::LoweringContext;
use crate::builtins::Primitive;
use crate::catalog::EnumDef;
use crate::naming::{display_name, sanitize};

impl<'a, 'input: 'a> LoweringContext<'a, 'input> {
    /// Lowers a named `<simpleType>`. Enumerated restrictions become an [`EnumDef`]; anything else
    /// is registered as an alias of `string`.
    pub(super) fn lower_simple_type(&mut self, node: Node<'a, 'input>) {
        let Some(name) = attr(node, "name") else {
            self.diagnostics
                .warn("simpleType without a name attribute, skipping");
            return;
        };

        let Some(restriction) = first_xs_child(node, "restriction") else {
            // list and union types pass through as their lexical form
            self.diagnostics.info(format!(
                "simpleType '{name}' is not a restriction, projecting it to string"
            ));
            self.registry.register_alias(name, Primitive::String);
            return;
        };

        let base_type = attr(restriction, "base")
            .map(|base| self.resolve(restriction, base).type_)
            .unwrap_or_default();

        let values: Vec<String> = element_children(restriction)
            .filter(|c| is_xs(*c, "enumeration"))
            .filter_map(|c| c.attribute("value"))
            .map(str::to_string)
            .collect();

        if values.is_empty() {
            tracing::debug!(name, "simpleType has no enumeration, registering string alias");
            self.registry.register_alias(name, Primitive::String);
            return;
        }

        let ident = sanitize(name);
        if self.catalog.enum_by_ident(&ident).is_some() {
            self.diagnostics.warn(format!(
                "enumeration '{ident}' is already defined, skipping duplicate"
            ));
            return;
        }

        self.catalog.enums.push(EnumDef {
            orig_name: name.to_string(),
            display_name: display_name(&ident),
            ident,
            base_type,
            values,
            documentation: documentation(node),
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins::Primitive;
    use crate::catalog::TypeRef;
    use crate::parse_schema;

    fn schema(body: &str) -> String {
        format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#)
    }

    #[test]
    fn enumeration_keeps_source_order_and_duplicates() {
        let lowered = parse_schema(&schema(
            r#"<xs:simpleType name="Level">
                <xs:restriction base="xs:int">
                    <xs:enumeration value="3"/>
                    <xs:enumeration value="1"/>
                    <xs:enumeration value="3"/>
                </xs:restriction>
            </xs:simpleType>"#,
        ))
        .unwrap();
        let level = &lowered.catalog.enums[0];
        assert_eq!(level.values, ["3", "1", "3"]);
        assert_eq!(level.base_type, TypeRef::Primitive(Primitive::Int32));
    }

    #[test]
    fn unnamed_simple_type_is_skipped() {
        let lowered = parse_schema(&schema(
            r#"<xs:simpleType><xs:restriction base="xs:string">
                <xs:enumeration value="a"/>
            </xs:restriction></xs:simpleType>"#,
        ))
        .unwrap();
        assert!(lowered.catalog.enums.is_empty());
        assert_eq!(lowered.diagnostics.len(), 1);
    }

    #[test]
    fn union_projects_to_string() {
        let lowered = parse_schema(&schema(
            r#"<xs:simpleType name="Either"><xs:union memberTypes="xs:int xs:string"/></xs:simpleType>"#,
        ))
        .unwrap();
        assert!(lowered.catalog.enums.is_empty());
        assert_eq!(lowered.registry.alias("Either"), Some(Primitive::String));
    }

    #[test]
    fn duplicate_enumeration_is_discarded() {
        let lowered = parse_schema(&schema(
            r#"<xs:simpleType name="Mode"><xs:restriction base="xs:string">
                <xs:enumeration value="a"/></xs:restriction></xs:simpleType>
               <xs:simpleType name="ModeType"><xs:restriction base="xs:string">
                <xs:enumeration value="b"/></xs:restriction></xs:simpleType>"#,
        ))
        .unwrap();
        assert_eq!(lowered.catalog.enums.len(), 1);
        assert_eq!(lowered.catalog.enums[0].values, ["a"]);
    }
}
