use roxmltree::Node;

use super::documentation::{append_value_constraints, documentation};
use super::xml::{attr, element_children, first_xs_child, is_xs};
use super::LoweringContext;
use crate::catalog::{ChoiceBranch, Field, FieldKind, MaxOccurs, TypeRef};
use crate::naming::{display_name, sanitize, strip_prefix};
use crate::values::actual_value;

impl<'a, 'input: 'a> LoweringContext<'a, 'input> {
    /// Appends the fields of a `<sequence>`. Nested sequences flatten into the same field list.
    pub(super) fn lower_sequence(&mut self, sequence: Node<'a, 'input>, fields: &mut Vec<Field>) {
        for child in element_children(sequence) {
            if is_xs(child, "element") {
                if let Some(field) = self.lower_element_field(child) {
                    if !field.ident.is_empty() {
                        fields.push(field);
                    }
                }
            } else if is_xs(child, "group") {
                self.inline_group_reference(child, fields);
            } else if is_xs(child, "sequence") {
                self.lower_sequence(child, fields);
            } else if is_xs(child, "choice") {
                self.lower_choice(child, fields);
            } else if is_xs(child, "all") {
                self.lower_all(child, fields);
            } else if is_xs(child, "any") {
                self.diagnostics
                    .warn("<any> is not supported, skipping");
            } else if !is_xs(child, "annotation") {
                self.diagnostics.info(format!(
                    "unrecognised construct <{}> in sequence, ignoring",
                    child.tag_name().name()
                ));
            }
        }
    }

    /// Collapses a `<choice>` into a single optional field whose type lists the element branches.
    pub(super) fn lower_choice(&mut self, choice: Node<'a, 'input>, fields: &mut Vec<Field>) {
        let mut branches = Vec::new();
        let mut branch_docs = Vec::new();
        for child in element_children(choice) {
            if !is_xs(child, "element") {
                if !is_xs(child, "annotation") {
                    self.diagnostics.info(format!(
                        "only element branches of a choice are lowered, ignoring <{}>",
                        child.tag_name().name()
                    ));
                }
                continue;
            }
            let Some(field) = self.lower_element_field(child) else {
                continue;
            };
            if !field.documentation.is_empty() {
                branch_docs.push(field.documentation);
            }
            branches.push(ChoiceBranch {
                ident: field.ident,
                type_: field.type_,
            });
        }

        if branches.is_empty() {
            return;
        }

        let ident = branches
            .iter()
            .map(|b| b.ident.as_str())
            .collect::<Vec<_>>()
            .join("_");
        let mut field = Field::new(ident, TypeRef::Choice(branches), FieldKind::Choice);
        field.make_optional();
        field.documentation = branch_docs.join("\n");
        fields.push(field);
    }

    /// Lowers an `<all>`: every element occurs at most once.
    pub(super) fn lower_all(&mut self, all: Node<'a, 'input>, fields: &mut Vec<Field>) {
        for child in element_children(all).filter(|c| is_xs(*c, "element")) {
            if let Some(mut field) = self.lower_element_field(child) {
                field.max_occurs = MaxOccurs::ONE;
                if !field.ident.is_empty() {
                    fields.push(field);
                }
            }
        }
    }

    /// Inlines the fields of a previously defined named group.
    pub(super) fn inline_group_reference(&mut self, group: Node<'a, 'input>, fields: &mut Vec<Field>) {
        let Some(reference) = attr(group, "ref") else {
            self.diagnostics
                .warn("group without a ref attribute inside a content model, skipping");
            return;
        };

        let definition = self
            .catalog
            .group(reference)
            .or_else(|| self.catalog.group(strip_prefix(reference)));
        match definition {
            Some(definition) => fields.extend(definition.fields.iter().cloned()),
            None => self.diagnostics.warn(format!(
                "group '{reference}' is referenced before its definition, skipping"
            )),
        }
    }

    /// Builds the field for a local `<element>`. Returns `None` for elements that can never occur
    /// (`maxOccurs="0"`).
    pub(super) fn lower_element_field(&mut self, element: Node<'a, 'input>) -> Option<Field> {
        let reference = attr(element, "ref");
        let ident = match (attr(element, "name"), reference) {
            (Some(name), _) => sanitize(name),
            (None, Some(reference)) => sanitize(strip_prefix(reference)),
            (None, None) => self.next_anonymous_element(),
        };

        let max_occurs = match attr(element, "maxOccurs") {
            Some(raw) => actual_value::<MaxOccurs>(raw).unwrap_or_else(|| {
                self.diagnostics.warn(format!(
                    "invalid maxOccurs '{raw}' on element '{ident}', assuming 1"
                ));
                MaxOccurs::ONE
            }),
            None => MaxOccurs::ONE,
        };
        if max_occurs == MaxOccurs::Count(0) {
            self.diagnostics.info(format!(
                "element '{ident}' has maxOccurs=\"0\" and can never occur, skipping"
            ));
            return None;
        }

        let type_ = if let Some(type_name) = attr(element, "type") {
            self.resolve_field_type(element, type_name)
        } else if let (Some(reference), None) = (reference, attr(element, "name")) {
            self.resolve_element_reference(reference)
        } else if let Some(simple_type) = first_xs_child(element, "simpleType") {
            self.inline_simple_type(simple_type)
        } else if let Some(complex_type) = first_xs_child(element, "complexType") {
            let hoisted_name = display_name(&ident);
            TypeRef::Named(self.lower_complex_type(complex_type, Some(&hoisted_name), false).ident)
        } else {
            TypeRef::default()
        };

        let mut field = Field::new(ident, type_, FieldKind::Element);
        field.max_occurs = max_occurs;

        if let Some(raw) = attr(element, "minOccurs") {
            match actual_value::<u32>(raw) {
                Some(min_occurs) => field.min_occurs = min_occurs,
                None => self.diagnostics.warn(format!(
                    "invalid minOccurs '{raw}' on element '{}', assuming 1",
                    field.ident
                )),
            }
        }
        field.is_optional = field.min_occurs == 0;
        if attr(element, "nillable").and_then(actual_value::<bool>) == Some(true) {
            field.make_optional();
        }

        field.documentation = documentation(element);
        append_value_constraints(&mut field.documentation, element);
        Some(field)
    }

    /// Type of an inline `<simpleType>`: the base of its restriction, or `string`.
    fn inline_simple_type(&self, simple_type: Node<'a, 'input>) -> TypeRef {
        first_xs_child(simple_type, "restriction")
            .and_then(|restriction| {
                attr(restriction, "base").map(|base| self.resolve_field_type(restriction, base))
            })
            .unwrap_or_default()
    }

    /// Type of `<element ref="..."/>`, taken from the referenced top-level declaration.
    fn resolve_element_reference(&mut self, reference: &str) -> TypeRef {
        let local_name = strip_prefix(reference);
        let Some(target) = self.top_level_elements.get(local_name).copied() else {
            self.diagnostics.warn(format!(
                "element reference '{reference}' does not match a top-level element, assuming string"
            ));
            return TypeRef::default();
        };

        if let Some(type_name) = attr(target, "type") {
            self.resolve_field_type(target, type_name)
        } else if first_xs_child(target, "complexType").is_some() {
            // lowered as a root record under the element's own name
            TypeRef::Named(sanitize(local_name))
        } else if let Some(simple_type) = first_xs_child(target, "simpleType") {
            self.inline_simple_type(simple_type)
        } else {
            TypeRef::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins::Primitive;
    use crate::catalog::{FieldKind, MaxOccurs, RecordDef, TypeRef};
    use crate::diagnostics::Severity;
    use crate::{parse_schema, LoweredSchema};

    fn lower(body: &str) -> LoweredSchema {
        let xml = format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#);
        parse_schema(&xml).unwrap()
    }

    fn record<'c>(lowered: &'c LoweredSchema, ident: &str) -> &'c RecordDef {
        lowered.catalog.record_by_ident(ident).unwrap()
    }

    #[test]
    fn choice_collapses_into_one_optional_field() {
        let lowered = lower(
            r#"<xs:complexType name="Value"><xs:choice>
                <xs:element name="a" type="xs:int"/>
                <xs:element name="b" type="xs:string"/>
            </xs:choice></xs:complexType>"#,
        );
        let fields = &record(&lowered, "Value").fields;
        assert_eq!(fields.len(), 1);
        let choice = &fields[0];
        assert_eq!(choice.ident, "a_b");
        assert_eq!(choice.kind, FieldKind::Choice);
        assert!(choice.is_optional);
        assert_eq!(choice.min_occurs, 0);
        assert_eq!(choice.max_occurs, MaxOccurs::ONE);
        assert_eq!(choice.type_.to_string(), "choice<int32, string>");
    }

    #[test]
    fn nested_sequences_flatten() {
        let lowered = lower(
            r#"<xs:complexType name="Outer"><xs:sequence>
                <xs:element name="a" type="xs:int"/>
                <xs:sequence><xs:element name="b" type="xs:int"/></xs:sequence>
                <xs:choice><xs:element name="c" type="xs:int"/></xs:choice>
            </xs:sequence></xs:complexType>"#,
        );
        let idents: Vec<_> = record(&lowered, "Outer")
            .fields
            .iter()
            .map(|f| f.ident.as_str())
            .collect();
        assert_eq!(idents, ["a", "b", "c"]);
    }

    #[test]
    fn all_caps_occurrence_at_one() {
        let lowered = lower(
            r#"<xs:complexType name="Bag"><xs:all>
                <xs:element name="x" type="xs:int" maxOccurs="4"/>
            </xs:all></xs:complexType>"#,
        );
        assert_eq!(record(&lowered, "Bag").fields[0].max_occurs, MaxOccurs::ONE);
    }

    #[test]
    fn group_reference_inlines_fields() {
        let lowered = lower(
            r#"<xs:group name="Coords"><xs:sequence>
                <xs:element name="x" type="xs:double"/>
                <xs:element name="y" type="xs:double"/>
              </xs:sequence></xs:group>
              <xs:complexType name="Point"><xs:sequence>
                <xs:group ref="Coords"/>
                <xs:element name="label" type="xs:string"/>
              </xs:sequence></xs:complexType>"#,
        );
        let idents: Vec<_> = record(&lowered, "Point")
            .fields
            .iter()
            .map(|f| f.ident.as_str())
            .collect();
        assert_eq!(idents, ["x", "y", "label"]);
    }

    #[test]
    fn forward_group_reference_is_warned() {
        let lowered = lower(
            r#"<xs:complexType name="Early"><xs:sequence><xs:group ref="Later"/></xs:sequence></xs:complexType>
               <xs:group name="Later"><xs:sequence><xs:element name="x" type="xs:int"/></xs:sequence></xs:group>"#,
        );
        assert!(record(&lowered, "Early").fields.is_empty());
        assert!(lowered
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message.contains("Later")));
    }

    #[test]
    fn inline_complex_type_is_hoisted_before_its_parent() {
        let lowered = lower(
            r#"<xs:complexType name="Order"><xs:sequence>
                <xs:element name="ship-to"><xs:complexType><xs:sequence>
                    <xs:element name="city" type="xs:string"/>
                </xs:sequence></xs:complexType></xs:element>
            </xs:sequence></xs:complexType>"#,
        );
        let idents: Vec<_> = lowered.catalog.records.iter().map(|r| r.ident.as_str()).collect();
        assert_eq!(idents, ["ShipTo", "Order"]);
        let field = &record(&lowered, "Order").fields[0];
        assert_eq!(field.ident, "ship_to");
        assert_eq!(field.type_, TypeRef::named("ShipTo"));
    }

    #[test]
    fn inline_simple_type_uses_restriction_base() {
        let lowered = lower(
            r#"<xs:complexType name="Pixel"><xs:sequence>
                <xs:element name="alpha"><xs:simpleType>
                    <xs:restriction base="xs:unsignedShort"><xs:maxInclusive value="255"/></xs:restriction>
                </xs:simpleType></xs:element>
            </xs:sequence></xs:complexType>"#,
        );
        assert_eq!(
            record(&lowered, "Pixel").fields[0].type_,
            TypeRef::Primitive(Primitive::UInt16)
        );
    }

    #[test]
    fn element_reference_takes_type_of_target() {
        let lowered = lower(
            r#"<xs:element name="price" type="xs:decimal"/>
               <xs:complexType name="Item"><xs:sequence>
                 <xs:element ref="price" minOccurs="0"/>
               </xs:sequence></xs:complexType>"#,
        );
        let field = &record(&lowered, "Item").fields[0];
        assert_eq!(field.ident, "price");
        assert_eq!(field.type_, TypeRef::Primitive(Primitive::Double));
        assert!(field.is_optional);
    }

    #[test]
    fn user_types_are_referenced_camel_cased() {
        let lowered = lower(
            r#"<xs:complexType name="Holder"><xs:sequence>
                <xs:element name="part" type="car_partType"/>
            </xs:sequence></xs:complexType>"#,
        );
        assert_eq!(
            record(&lowered, "Holder").fields[0].type_,
            TypeRef::named("CarPart")
        );
    }

    #[test]
    fn occurrence_and_nillable_set_optionality() {
        let lowered = lower(
            r#"<xs:complexType name="List"><xs:sequence>
                <xs:element name="item" type="xs:int" minOccurs="2" maxOccurs="unbounded"/>
                <xs:element name="note" type="xs:string" nillable="true"/>
                <xs:element name="never" type="xs:string" maxOccurs="0"/>
            </xs:sequence></xs:complexType>"#,
        );
        let fields = &record(&lowered, "List").fields;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].min_occurs, 2);
        assert_eq!(fields[0].max_occurs, MaxOccurs::Unbounded);
        assert!(fields[0].is_repeated());
        assert!(fields[1].is_optional);
        assert_eq!(fields[1].min_occurs, 0);
    }

    #[test]
    fn wildcards_are_warned() {
        let lowered = lower(
            r#"<xs:complexType name="Open"><xs:sequence>
                <xs:any processContents="lax"/>
            </xs:sequence></xs:complexType>"#,
        );
        assert!(record(&lowered, "Open").fields.is_empty());
        assert_eq!(lowered.diagnostics[0].severity, Severity::Warning);
    }
}
