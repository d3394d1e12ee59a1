//! Lowering of a schema document into a [`Catalog`].
//!
//! The walk is a single sequential pass over the children of `<schema>`. Definitions are appended
//! to the catalog as soon as they are complete, so an inline complex type hoisted out of a field
//! lands in the catalog before the record that contains the field.

mod attributes;
mod complex_type;
mod documentation;
mod element;
mod particles;
mod simple_type;
mod xml;

use std::collections::HashMap;

use roxmltree::{Document, Node};

use crate::catalog::{Catalog, TypeRef};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::XsdError;
use crate::naming::display_name;
use crate::registry::{Resolution, TypeRegistry};

use xml::{attr, canonical_type_name, element_children, is_xs};

/// Result of lowering one schema document.
#[derive(Debug)]
pub struct LoweredSchema {
    pub catalog: Catalog,
    /// The registry as it stood at the end of the run, including the aliases learned from
    /// non-enumerated simple types.
    pub registry: TypeRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

pub(crate) struct LoweringContext<'a, 'input> {
    catalog: Catalog,
    registry: TypeRegistry,
    diagnostics: Diagnostics,

    anonymous_complex_types: usize,
    anonymous_elements: usize,

    /// Top-level element declarations by name, for resolving `<element ref=".."/>` regardless of
    /// declaration order.
    top_level_elements: HashMap<&'a str, Node<'a, 'input>>,
}

impl<'a, 'input: 'a> LoweringContext<'a, 'input> {
    fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            registry: TypeRegistry::new(),
            diagnostics: Diagnostics::default(),
            anonymous_complex_types: 0,
            anonymous_elements: 0,
            top_level_elements: HashMap::new(),
        }
    }

    fn next_anonymous_complex_type(&mut self) -> String {
        let name = format!("AnonymousComplexType_{}", self.anonymous_complex_types);
        self.anonymous_complex_types += 1;
        name
    }

    fn next_anonymous_element(&mut self) -> String {
        let name = format!("anonymousElement_{}", self.anonymous_elements);
        self.anonymous_elements += 1;
        name
    }

    /// Resolves a type name found on `node` through the registry.
    fn resolve(&self, node: Node, qname: &str) -> Resolution {
        let qname = canonical_type_name(node, qname);
        self.registry.resolve(&qname, &self.catalog)
    }

    /// Like [`resolve()`](Self::resolve), but user types come back camel-cased, the way element
    /// fields refer to them.
    fn resolve_field_type(&self, node: Node, qname: &str) -> TypeRef {
        let Resolution { type_, is_builtin } = self.resolve(node, qname);
        match type_ {
            TypeRef::Named(name) if !is_builtin => TypeRef::Named(display_name(&name)),
            type_ => type_,
        }
    }

    fn lower_schema(&mut self, schema: Node<'a, 'input>) {
        self.catalog.target_namespace = schema.attribute("targetNamespace").map(str::to_string);

        for child in element_children(schema) {
            if is_xs(child, "element") {
                if let Some(name) = attr(child, "name") {
                    self.top_level_elements.insert(name, child);
                }
            }
        }

        for child in element_children(schema) {
            if is_xs(child, "simpleType") {
                self.lower_simple_type(child);
            } else if is_xs(child, "complexType") {
                self.lower_complex_type(child, None, false);
            } else if is_xs(child, "element") {
                self.lower_top_level_element(child);
            } else if is_xs(child, "group") {
                self.lower_group_definition(child);
            } else if !is_xs(child, "annotation") {
                self.diagnostics.info(format!(
                    "unrecognised top-level construct <{}>, ignoring",
                    child.tag_name().name()
                ));
            }
        }
    }

    fn finish(self) -> LoweredSchema {
        LoweredSchema {
            catalog: self.catalog,
            registry: self.registry,
            diagnostics: self.diagnostics.into_vec(),
        }
    }
}

/// Lowers an already parsed schema document.
pub fn read_schema(document: &Document) -> Result<LoweredSchema, XsdError> {
    let schema = document.root_element();
    if !is_xs(schema, "schema") {
        return Err(XsdError::MissingSchemaRoot {
            found: schema.tag_name().name().to_string(),
        });
    }

    let mut context = LoweringContext::new();
    context.lower_schema(schema);
    let lowered = context.finish();
    tracing::debug!(
        enums = lowered.catalog.enums.len(),
        records = lowered.catalog.records.len(),
        elements = lowered.catalog.elements.len(),
        "schema lowered"
    );
    Ok(lowered)
}

/// Parses `text` as XML and lowers it.
pub fn parse_schema(text: &str) -> Result<LoweredSchema, XsdError> {
    let document = Document::parse(text)?;
    read_schema(&document)
}
