use roxmltree::Node;

use super::documentation::documentation;
use super::xml::{attr, first_xs_child};
use super::LoweringContext;
use crate::catalog::{ElementBinding, GroupDef};
use crate::naming::{display_name, sanitize};

impl<'a, 'input: 'a> LoweringContext<'a, 'input> {
    /// Lowers a top-level `<element>` into an [`ElementBinding`].
    ///
    /// An inline complex type is lowered as an anonymous type and then renamed after the element,
    /// unless a record with that identifier already exists; the root record then keeps its
    /// synthetic name.
    pub(super) fn lower_top_level_element(&mut self, element: Node<'a, 'input>) {
        let Some(name) = attr(element, "name") else {
            self.diagnostics
                .info("top-level element without a name attribute, skipping");
            return;
        };

        let ident = sanitize(name);
        let type_ = attr(element, "type").unwrap_or_default().to_string();
        let is_complex = type_.contains(':');

        let root_record = first_xs_child(element, "complexType").and_then(|complex_type| {
            let outcome = self.lower_complex_type(complex_type, None, true);
            outcome.added.then(|| self.rename_root_record(&outcome.ident, name, &ident))
        });

        self.catalog.elements.push(ElementBinding {
            ident,
            type_,
            documentation: documentation(element),
            is_complex,
            root_record,
        });
    }

    /// Gives the just lowered anonymous record `anonymous` the names of the element `name`.
    /// Returns the identifier the record ends up with.
    fn rename_root_record(&mut self, anonymous: &str, name: &str, ident: &str) -> String {
        if self.catalog.record_by_ident(ident).is_some() {
            self.diagnostics.warn(format!(
                "type '{ident}' already exists, keeping the root record of element '{name}' as '{anonymous}'"
            ));
            return anonymous.to_string();
        }

        if let Some(record) = self
            .catalog
            .records
            .iter_mut()
            .rev()
            .find(|r| r.ident == anonymous)
        {
            record.orig_name = name.to_string();
            record.ident = ident.to_string();
            record.display_name = display_name(ident);
        }
        ident.to_string()
    }

    /// Lowers a named `<group>` definition so later references can inline its fields.
    pub(super) fn lower_group_definition(&mut self, group: Node<'a, 'input>) {
        let Some(name) = attr(group, "name") else {
            self.diagnostics
                .info("top-level group without a name attribute, skipping");
            return;
        };

        let mut fields = Vec::new();
        self.lower_content_model(group, &mut fields);
        self.lower_attributes(group, &mut fields);

        if self.catalog.groups.contains_key(name) {
            self.diagnostics
                .warn(format!("group '{name}' is already defined, skipping duplicate"));
            return;
        }
        tracing::debug!(name, fields = fields.len(), "group defined");
        self.catalog.groups.insert(
            name.to_string(),
            GroupDef {
                orig_name: name.to_string(),
                fields,
                documentation: documentation(group),
            },
        );
    }
}
