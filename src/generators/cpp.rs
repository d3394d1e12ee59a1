use std::collections::HashSet;
use std::fmt::{self, Write};

use xsd_catalog::{
    is_reserved, normalize_enum_value, ElementBinding, EnumDef, Field, Primitive, RecordDef,
    TypeRef,
};

use super::common::{doc_lines, CatalogVisitor, EmitContext, GeneratorContext, NamedType, OutputFile};

const TYPES_SOURCE: bool = cfg!(feature = "types-source");

/// Collects the declarations of each output file while visiting the catalog.
#[derive(Default)]
struct CppVisitor {
    enum_declarations: String,
    enum_definitions: String,
    record_declarations: String,
    record_definitions: String,
    root_elements: String,
}

/// Coerces `name` into a C++ identifier.
fn cpp_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() {
        ident.push_str("Empty");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_reserved(&ident) {
        ident.push('_');
    }
    ident
}

fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\t' => literal.push_str("\\t"),
            '\r' => literal.push_str("\\r"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// Enum members paired with the literal they stand for. Repeated literals are dropped and
/// members that normalize to the same identifier get a numeric suffix.
fn enum_members(enum_def: &EnumDef) -> Vec<(String, &str)> {
    let mut seen_values = HashSet::new();
    let mut seen_members = HashSet::new();
    let mut members = Vec::with_capacity(enum_def.values.len());
    for value in &enum_def.values {
        if !seen_values.insert(value.as_str()) {
            continue;
        }
        let base = cpp_ident(&normalize_enum_value(value));
        let mut member = base.clone();
        let mut n = 2;
        while !seen_members.insert(member.clone()) {
            member = format!("{base}_{n}");
            n += 1;
        }
        members.push((member, value.as_str()));
    }
    members
}

fn primitive_type(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::String => "std::string",
        Primitive::Int32 => "int32_t",
        Primitive::Int64 => "int64_t",
        Primitive::Int16 => "int16_t",
        Primitive::UInt32 => "uint32_t",
        Primitive::UInt64 => "uint64_t",
        Primitive::UInt16 => "uint16_t",
        Primitive::Double => "double",
        Primitive::Float => "float",
        Primitive::Bool => "bool",
        Primitive::Bytes => "std::vector<unsigned char>",
    }
}

fn type_name(ctx: &GeneratorContext, type_: &TypeRef) -> String {
    match type_ {
        TypeRef::Primitive(primitive) => primitive_type(*primitive).to_string(),
        TypeRef::Named(name) => match ctx.lookup(name) {
            NamedType::Record(record) => cpp_ident(&record.display_name),
            NamedType::Enum(enum_def) => cpp_ident(&enum_def.display_name),
            NamedType::Unknown => cpp_ident(name),
        },
        TypeRef::Choice(branches) => {
            let mut alternatives = Vec::with_capacity(branches.len());
            for branch in branches {
                let alternative = type_name(ctx, &branch.type_);
                // std::variant does not allow an alternative twice
                if !alternatives.contains(&alternative) {
                    alternatives.push(alternative);
                }
            }
            format!("std::variant<{}>", alternatives.join(", "))
        }
    }
}

/// Whether `field` names the record that contains it.
fn is_self_reference(ctx: &GeneratorContext, owner: &RecordDef, field: &Field) -> bool {
    match &field.type_ {
        TypeRef::Named(name) => {
            matches!(ctx.lookup(name), NamedType::Record(record) if record.ident == owner.ident)
        }
        _ => false,
    }
}

/// Wraps the element type of `field` according to its cardinality. A single-valued member of the
/// record's own type is held through a pointer, since the record is incomplete at that point.
fn field_type(ctx: &GeneratorContext, owner: &RecordDef, field: &Field) -> String {
    let type_ = type_name(ctx, &field.type_);
    if field.is_repeated() {
        format!("std::vector<{type_}>")
    } else if is_self_reference(ctx, owner, field) {
        format!("std::unique_ptr<{type_}>")
    } else if field.is_optional {
        format!("std::optional<{type_}>")
    } else {
        type_
    }
}

fn open_namespace(out: &mut String, namespace: Option<&str>) -> fmt::Result {
    match namespace {
        Some(namespace) => writeln!(out, "namespace {namespace} {{\n"),
        None => Ok(()),
    }
}

fn close_namespace(out: &mut String, namespace: Option<&str>) -> fmt::Result {
    match namespace {
        Some(namespace) => writeln!(out, "}} // namespace {namespace}"),
        None => Ok(()),
    }
}

fn write_enum_declaration(
    out: &mut String,
    enum_def: &EnumDef,
    name: &str,
    members: &[(String, &str)],
) -> fmt::Result {
    if !enum_def.documentation.is_empty() {
        writeln!(out, "/*\n{}\n*/", enum_def.documentation)?;
    }
    writeln!(out, "enum class {name} {{")?;
    for (member, value) in members {
        if member != value {
            writeln!(out, "    {member}, // {value}")?;
        } else {
            writeln!(out, "    {member},")?;
        }
    }
    writeln!(out, "}};\n")?;
    writeln!(out, "template <> {name} stringTo<{name}>(const std::string& str);")?;
    writeln!(out, "std::string toString({name} value);\n")
}

fn write_enum_definition(out: &mut String, name: &str, members: &[(String, &str)]) -> fmt::Result {
    writeln!(out, "template <> {name} stringTo<{name}>(const std::string& str) {{")?;
    writeln!(out, "    static const std::map<std::string, {name}> mapping = {{")?;
    for (member, _) in members {
        writeln!(out, "        {{{}, {name}::{member}}},", string_literal(member))?;
    }
    for (member, value) in members {
        if member != value {
            writeln!(out, "        {{{}, {name}::{member}}},", string_literal(value))?;
        }
    }
    writeln!(out, "    }};\n")?;
    writeln!(out, "    auto it = mapping.find(str);")?;
    writeln!(out, "    if (it != mapping.end()) return it->second;")?;
    writeln!(out, "    throw std::runtime_error(\"Invalid value for {name}: \" + str);")?;
    writeln!(out, "}}\n")?;

    writeln!(out, "std::string toString({name} value) {{")?;
    writeln!(out, "    switch (value) {{")?;
    for (member, value) in members {
        writeln!(out, "        case {name}::{member}: return {};", string_literal(value))?;
    }
    writeln!(out, "    }}")?;
    writeln!(out, "    throw std::runtime_error(\"Invalid {name} value\");")?;
    writeln!(out, "}}\n")
}

fn write_record_declaration(
    out: &mut String,
    ctx: &GeneratorContext,
    record: &RecordDef,
    name: &str,
    base: Option<&str>,
) -> fmt::Result {
    if !record.documentation.is_empty() {
        writeln!(out, "/**")?;
        for line in doc_lines(&record.documentation) {
            writeln!(out, " * {line}")?;
        }
        writeln!(out, " */")?;
    }
    match base {
        Some(base) => writeln!(out, "struct {name} : public {base} {{")?,
        None => writeln!(out, "struct {name} {{")?,
    }
    for field in &record.fields {
        for line in doc_lines(&field.documentation) {
            writeln!(out, "    // {line}")?;
        }
        writeln!(
            out,
            "    {} {};",
            field_type(ctx, record, field),
            cpp_ident(&field.ident)
        )?;
    }
    if TYPES_SOURCE {
        if !record.fields.is_empty() {
            out.push('\n');
        }
        writeln!(out, "    bool operator==(const {name}& other) const;")?;
    }
    writeln!(out, "}};\n")
}

fn write_record_definition(
    out: &mut String,
    ctx: &GeneratorContext,
    record: &RecordDef,
    name: &str,
    base: Option<&str>,
) -> fmt::Result {
    let mut comparisons: Vec<String> = base
        .iter()
        .map(|base| format!("static_cast<const {base}&>(*this) == static_cast<const {base}&>(other)"))
        .collect();
    comparisons.extend(record.fields.iter().map(|field| {
        let member = cpp_ident(&field.ident);
        if !field.is_repeated() && is_self_reference(ctx, record, field) {
            // pointees are compared, not the pointers
            format!("({member} == other.{member} || ({member} && other.{member} && *{member} == *other.{member}))")
        } else {
            format!("{member} == other.{member}")
        }
    }));

    writeln!(out, "bool {name}::operator==(const {name}& other) const {{")?;
    if comparisons.is_empty() {
        writeln!(out, "    (void)other;")?;
        writeln!(out, "    return true;")?;
    } else {
        writeln!(out, "    return {};", comparisons.join("\n        && "))?;
    }
    writeln!(out, "}}\n")
}

impl CatalogVisitor for CppVisitor {
    type EnumValue = fmt::Result;
    fn visit_enum<'a>(
        &mut self,
        _ctx: &mut GeneratorContext<'a>,
        enum_def: &'a EnumDef,
    ) -> fmt::Result {
        let name = cpp_ident(&enum_def.display_name);
        let members = enum_members(enum_def);
        write_enum_declaration(&mut self.enum_declarations, enum_def, &name, &members)?;
        write_enum_definition(&mut self.enum_definitions, &name, &members)
    }

    type RecordValue = fmt::Result;
    fn visit_record<'a>(
        &mut self,
        ctx: &mut GeneratorContext<'a>,
        record: &'a RecordDef,
    ) -> fmt::Result {
        if !ctx.visited_records.insert(record.ident.as_str()) {
            return Ok(());
        }
        // by-value members and bases need complete types
        for dependency in ctx.dependencies(record) {
            self.visit_record(ctx, dependency)?;
        }

        let name = cpp_ident(&record.display_name);
        let base = ctx.base_record(record).map(|base| cpp_ident(&base.display_name));

        let base = base.as_deref();
        write_record_declaration(&mut self.record_declarations, ctx, record, &name, base)?;
        if TYPES_SOURCE {
            write_record_definition(&mut self.record_definitions, ctx, record, &name, base)?;
        }
        Ok(())
    }

    type ElementValue = fmt::Result;
    fn visit_element<'a>(
        &mut self,
        ctx: &mut GeneratorContext<'a>,
        element: &'a ElementBinding,
    ) -> fmt::Result {
        let type_ = match &element.root_record {
            Some(root) => match ctx.lookup(root) {
                NamedType::Record(record) => cpp_ident(&record.display_name),
                _ => cpp_ident(root),
            },
            None => element.type_.clone(),
        };
        writeln!(self.root_elements, "//   {}: {type_}", element.ident)
    }
}

fn enums_header(ctx: &EmitContext, visitor: &CppVisitor) -> Result<String, fmt::Error> {
    let mut out = String::new();
    out.push_str("#pragma once\n\n");
    out.push_str("#include <map>\n#include <stdexcept>\n#include <string>\n#include <type_traits>\n\n");
    open_namespace(&mut out, ctx.namespace)?;
    out.push_str("template <typename E> concept Enum = std::is_enum_v<E>;\n\n");
    out.push_str("template <Enum E>\nE stringTo(const std::string& str);\n\n");
    out.push_str(&visitor.enum_declarations);
    close_namespace(&mut out, ctx.namespace)?;
    Ok(out)
}

fn enums_source(ctx: &EmitContext, visitor: &CppVisitor) -> Result<String, fmt::Error> {
    let mut out = String::new();
    out.push_str("#include \"Enums.h\"\n\n");
    open_namespace(&mut out, ctx.namespace)?;
    out.push_str(&visitor.enum_definitions);
    close_namespace(&mut out, ctx.namespace)?;
    Ok(out)
}

fn types_header(ctx: &EmitContext, visitor: &CppVisitor) -> Result<String, fmt::Error> {
    let mut out = String::new();
    out.push_str("#pragma once\n\n");
    out.push_str("#include <cstdint>\n#include <memory>\n#include <optional>\n#include <string>\n");
    out.push_str("#include <variant>\n#include <vector>\n\n");
    out.push_str("#include \"tinyxml2.h\"\n#include \"Enums.h\"\n\n");
    open_namespace(&mut out, ctx.namespace)?;
    out.push_str(&visitor.record_declarations);
    if !visitor.root_elements.is_empty() {
        out.push_str("// Root elements:\n");
        out.push_str(&visitor.root_elements);
        out.push('\n');
    }
    close_namespace(&mut out, ctx.namespace)?;
    Ok(out)
}

fn types_source(ctx: &EmitContext, visitor: &CppVisitor) -> Result<String, fmt::Error> {
    let mut out = String::new();
    out.push_str("#include \"Types.h\"\n\n");
    open_namespace(&mut out, ctx.namespace)?;
    out.push_str(&visitor.record_definitions);
    close_namespace(&mut out, ctx.namespace)?;
    Ok(out)
}

fn cmake_lists() -> String {
    let sources = if TYPES_SOURCE {
        "    Enums.cpp\n    Types.cpp\n"
    } else {
        "    Enums.cpp\n"
    };
    format!(
        "cmake_minimum_required(VERSION 3.10)
project(Generated)

set(CMAKE_CXX_STANDARD 20)

find_package(tinyxml2 REQUIRED)

add_library(xsd_generated
{sources})

target_include_directories(xsd_generated
    PUBLIC
        ${{CMAKE_CURRENT_SOURCE_DIR}}
)

target_link_libraries(xsd_generated
    PUBLIC
        tinyxml2::tinyxml2
)
"
    )
}

pub fn generate(ctx: &EmitContext) -> Result<Vec<OutputFile>, fmt::Error> {
    let mut gen_ctx = GeneratorContext::new(ctx.catalog);
    let mut visitor = CppVisitor::default();

    for enum_def in &ctx.catalog.enums {
        visitor.visit_enum(&mut gen_ctx, enum_def)?;
    }
    for record in &ctx.catalog.records {
        visitor.visit_record(&mut gen_ctx, record)?;
    }
    for element in &ctx.catalog.elements {
        visitor.visit_element(&mut gen_ctx, element)?;
    }

    let mut files = vec![
        OutputFile::new("Enums.h", enums_header(ctx, &visitor)?),
        OutputFile::new("Enums.cpp", enums_source(ctx, &visitor)?),
        OutputFile::new("Types.h", types_header(ctx, &visitor)?),
    ];
    if TYPES_SOURCE {
        files.push(OutputFile::new("Types.cpp", types_source(ctx, &visitor)?));
    }
    files.push(OutputFile::new("CMakeLists.txt", cmake_lists()));
    Ok(files)
}
