use std::collections::HashSet;

use xsd_catalog::{Catalog, ElementBinding, EnumDef, RecordDef, TypeRef};

/// A generated file, named relative to the output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub contents: String,
}

impl OutputFile {
    pub(super) fn new(name: impl Into<String>, contents: String) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }
}

/// Everything a generator gets to see of a run.
#[derive(Clone, Copy, Debug)]
pub struct EmitContext<'a> {
    pub catalog: &'a Catalog,
    /// Namespace (or module) wrapping the generated declarations; `None` emits them at top level.
    pub namespace: Option<&'a str>,
}

impl<'a> EmitContext<'a> {
    pub fn new(catalog: &'a Catalog, namespace: &'a str) -> Self {
        Self {
            catalog,
            namespace: Some(namespace).filter(|ns| !ns.is_empty()),
        }
    }
}

pub(super) trait CatalogVisitor: Sized {
    type EnumValue;
    fn visit_enum<'a>(
        &mut self,
        context: &mut GeneratorContext<'a>,
        enum_def: &'a EnumDef,
    ) -> Self::EnumValue;

    type RecordValue;
    fn visit_record<'a>(
        &mut self,
        context: &mut GeneratorContext<'a>,
        record: &'a RecordDef,
    ) -> Self::RecordValue;

    type ElementValue;
    fn visit_element<'a>(
        &mut self,
        context: &mut GeneratorContext<'a>,
        element: &'a ElementBinding,
    ) -> Self::ElementValue;
}

/// What a late-bound type name refers to.
#[derive(Copy, Clone, Debug)]
pub(super) enum NamedType<'a> {
    Record(&'a RecordDef),
    Enum(&'a EnumDef),
    /// Not defined in this schema; emitted verbatim.
    Unknown,
}

pub(super) struct GeneratorContext<'a> {
    pub(super) catalog: &'a Catalog,
    pub(super) visited_records: HashSet<&'a str>,
}

impl<'a> GeneratorContext<'a> {
    pub(super) fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            visited_records: HashSet::new(),
        }
    }

    pub(super) fn lookup(&self, name: &str) -> NamedType<'a> {
        if let Some(record) = self.catalog.record_by_reference(name) {
            NamedType::Record(record)
        } else if let Some(enum_def) = self.catalog.enum_by_reference(name) {
            NamedType::Enum(enum_def)
        } else {
            NamedType::Unknown
        }
    }

    pub(super) fn base_record(&self, record: &RecordDef) -> Option<&'a RecordDef> {
        match self.lookup(record.base_type.as_ref()?.name()?) {
            NamedType::Record(base) => Some(base),
            _ => None,
        }
    }

    /// Records that must be declared before `record`: its base and the records its fields name.
    pub(super) fn dependencies(&self, record: &RecordDef) -> Vec<&'a RecordDef> {
        let mut names = Vec::new();
        for field in &record.fields {
            collect_names(&field.type_, &mut names);
        }
        self.base_record(record)
            .into_iter()
            .chain(names.into_iter().filter_map(|name| match self.lookup(name) {
                NamedType::Record(dependency) => Some(dependency),
                _ => None,
            }))
            .collect()
    }
}

fn collect_names<'t>(type_: &'t TypeRef, names: &mut Vec<&'t str>) {
    match type_ {
        TypeRef::Primitive(_) => {}
        TypeRef::Named(name) => names.push(name),
        TypeRef::Choice(branches) => {
            for branch in branches {
                collect_names(&branch.type_, names);
            }
        }
    }
}

/// Splits documentation into lines, dropping the trailing empty ones.
pub(super) fn doc_lines(documentation: &str) -> impl Iterator<Item = &str> {
    documentation.trim_end().lines().map(str::trim_end)
}
