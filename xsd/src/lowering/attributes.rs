use roxmltree::Node;

use super::documentation::{append_value_constraints, documentation};
use super::xml::{attr, element_children, first_xs_child, is_xs};
use super::LoweringContext;
use crate::catalog::{Field, FieldKind, TypeRef};
use crate::naming::{display_name, sanitize};

impl<'a, 'input: 'a> LoweringContext<'a, 'input> {
    /// Appends a field for every `<attribute>` directly below `parent`.
    pub(super) fn lower_attributes(&mut self, parent: Node<'a, 'input>, fields: &mut Vec<Field>) {
        for child in element_children(parent) {
            if is_xs(child, "attribute") {
                if let Some(field) = self.lower_attribute(child) {
                    fields.push(field);
                }
            } else if is_xs(child, "attributeGroup") {
                if let Some(reference) = attr(child, "ref") {
                    self.diagnostics.info(format!(
                        "attributeGroup reference '{reference}' is not resolved, its attributes are not lowered"
                    ));
                }
            } else if is_xs(child, "anyAttribute") {
                self.diagnostics
                    .info("<anyAttribute> is not supported, skipping");
            }
        }
    }

    fn lower_attribute(&mut self, attribute: Node<'a, 'input>) -> Option<Field> {
        let Some(name) = attr(attribute, "name") else {
            self.diagnostics.info(match attr(attribute, "ref") {
                Some(reference) => {
                    format!("attribute reference '{reference}' is not supported, skipping")
                }
                None => "attribute without a name attribute, skipping".to_string(),
            });
            return None;
        };

        let use_ = attr(attribute, "use");
        if use_ == Some("prohibited") {
            return None;
        }

        let ident = display_name(&sanitize(name));
        let mut field = Field::new(ident, TypeRef::default(), FieldKind::Attribute);
        if use_ != Some("required") {
            field.make_optional();
        }

        field.type_ = if let Some(type_name) = attr(attribute, "type") {
            self.resolve(attribute, type_name).type_
        } else {
            first_xs_child(attribute, "simpleType")
                .and_then(|simple_type| first_xs_child(simple_type, "restriction"))
                .and_then(|restriction| {
                    attr(restriction, "base").map(|base| self.resolve(restriction, base).type_)
                })
                .unwrap_or_default()
        };

        field.documentation = documentation(attribute);
        append_value_constraints(&mut field.documentation, attribute);
        Some(field)
    }
}
