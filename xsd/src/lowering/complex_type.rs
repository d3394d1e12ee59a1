use roxmltree::Node;

use super::documentation::documentation;
use super::xml::{attr, first_xs_child, first_xs_child_of, is_xs};
use super::LoweringContext;
use crate::builtins::Primitive;
use crate::catalog::{Field, FieldKind, RecordDef, TypeRef};
use crate::naming::{display_name, sanitize};
use crate::values::actual_value;

/// What [`LoweringContext::lower_complex_type()`] did with the record it built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct RecordOutcome {
    pub ident: String,
    /// `false` when a record with the same identifier already existed.
    pub added: bool,
}

impl<'a, 'input: 'a> LoweringContext<'a, 'input> {
    /// Lowers a `<complexType>` into a record and appends it to the catalog.
    ///
    /// `name` overrides the `name` attribute; inline types are lowered under the name of the
    /// field that contains them. Without either, a synthetic `AnonymousComplexType_<n>` name is
    /// used.
    pub(super) fn lower_complex_type(
        &mut self,
        node: Node<'a, 'input>,
        name: Option<&str>,
        is_root: bool,
    ) -> RecordOutcome {
        let (orig_name, ident, display) = match name.or_else(|| attr(node, "name")) {
            Some(name) => {
                let ident = sanitize(name);
                let display = display_name(&ident);
                (name.to_string(), ident, display)
            }
            None => {
                let name = self.next_anonymous_complex_type();
                (name.clone(), name.clone(), name)
            }
        };
        tracing::debug!(name = %orig_name, "lowering complexType");

        let mut record = RecordDef {
            orig_name,
            ident,
            display_name: display,
            base_type: None,
            is_abstract: attr(node, "abstract")
                .and_then(actual_value::<bool>)
                .unwrap_or(false),
            is_root,
            fields: Vec::new(),
            documentation: documentation(node),
        };

        if let Some(complex_content) = first_xs_child(node, "complexContent") {
            record.base_type = self.lower_complex_content(complex_content, &mut record.fields);
        } else if let Some(simple_content) = first_xs_child(node, "simpleContent") {
            self.lower_simple_content(simple_content, &mut record.fields);
        } else {
            let mixed = attr(node, "mixed")
                .and_then(actual_value::<bool>)
                .unwrap_or(false);
            if mixed {
                let mut text = Field::new(
                    "textContent",
                    TypeRef::Primitive(Primitive::String),
                    FieldKind::Element,
                );
                text.make_optional();
                text.documentation = "mixed content text".to_string();
                record.fields.push(text);
            }
            self.lower_content_model(node, &mut record.fields);
            self.lower_attributes(node, &mut record.fields);
        }

        let ident = record.ident.clone();
        if self.catalog.record_by_ident(&ident).is_some() {
            self.diagnostics.warn(format!(
                "type '{ident}' already exists, skipping duplicate"
            ));
            return RecordOutcome {
                ident,
                added: false,
            };
        }
        self.catalog.records.push(record);
        RecordOutcome { ident, added: true }
    }

    /// Lowers the first `sequence`, `choice`, `all` or `group` reference below `parent`.
    pub(super) fn lower_content_model(&mut self, parent: Node<'a, 'input>, fields: &mut Vec<Field>) {
        if let Some(sequence) = first_xs_child(parent, "sequence") {
            self.lower_sequence(sequence, fields);
        } else if let Some(choice) = first_xs_child(parent, "choice") {
            self.lower_choice(choice, fields);
        } else if let Some(all) = first_xs_child(parent, "all") {
            self.lower_all(all, fields);
        } else if let Some(group) = first_xs_child(parent, "group") {
            self.inline_group_reference(group, fields);
        }
    }

    /// Handles `complexContent` and returns the base type of an extension. Base fields are not
    /// copied into the derived record.
    fn lower_complex_content(
        &mut self,
        complex_content: Node<'a, 'input>,
        fields: &mut Vec<Field>,
    ) -> Option<TypeRef> {
        let Some(derivation) = first_xs_child_of(complex_content, &["extension", "restriction"])
        else {
            self.diagnostics
                .warn("complexContent without extension or restriction, skipping");
            return None;
        };

        if is_xs(derivation, "restriction") {
            self.diagnostics
                .warn("complexContent/restriction is not supported, skipping");
            return None;
        }

        let base_type = attr(derivation, "base").map(|base| self.resolve(derivation, base).type_);
        self.lower_content_model(derivation, fields);
        self.lower_attributes(derivation, fields);
        base_type
    }

    /// Handles `simpleContent`: the text of the element becomes a mandatory `value` field.
    fn lower_simple_content(&mut self, simple_content: Node<'a, 'input>, fields: &mut Vec<Field>) {
        let Some(derivation) = first_xs_child_of(simple_content, &["extension", "restriction"])
        else {
            self.diagnostics
                .warn("simpleContent without extension or restriction, skipping");
            return;
        };
        let is_extension = is_xs(derivation, "extension");

        match attr(derivation, "base") {
            Some(base) => {
                let mut value = Field::new(
                    "value",
                    self.resolve(derivation, base).type_,
                    FieldKind::Element,
                );
                value.documentation = if is_extension {
                    "text value".to_string()
                } else {
                    "text value with restrictions".to_string()
                };
                fields.push(value);
            }
            None => self
                .diagnostics
                .warn("simpleContent derivation without a base, no value field generated"),
        }

        if is_extension {
            self.lower_attributes(derivation, fields);
        }
    }
}
