use std::collections::HashSet;

use syn::{
    Arm, Attribute, Field as SynField, FieldMutability, Fields, Ident, Item, Type, Variant,
    __private::Span, parse_quote,
};

use xsd_catalog::{ElementBinding, EnumDef, Field, FieldKind, Primitive, RecordDef, TypeRef};

use super::common::{doc_lines, CatalogVisitor, EmitContext, GeneratorContext, NamedType, OutputFile};

use check_keyword::CheckKeyword;
use heck::{ToKebabCase, ToPascalCase, ToSnakeCase};

const UNKNOWN_VARIANT: &str = "UnknownVariant";

#[derive(Default)]
struct RustVisitor {
    output_items: Vec<Item>,
    root_elements: Vec<(String, String)>,
}

impl RustVisitor {
    fn new() -> Self {
        Self::default()
    }

    fn name_to_ident(name: &str) -> Ident {
        if ["crate", "self", "super", "Self"].contains(&name) {
            // These are keywords that are not allowed as raw identifiers
            Ident::new(&format!("{}_", name), Span::call_site())
        } else if name.is_keyword() {
            Ident::new_raw(name, Span::call_site())
        } else {
            Ident::new(name, Span::call_site())
        }
    }

    /// Applies `convert` to the ASCII-alphanumeric skeleton of `name` and makes sure the result
    /// can start an identifier.
    fn convert_name(name: &str, convert: fn(&str) -> String, fallback: &str) -> Ident {
        let cleaned = name.replace(|c: char| !c.is_ascii_alphanumeric(), "_");
        let converted = convert(&cleaned);
        if converted.is_empty() {
            Self::name_to_ident(fallback)
        } else if converted.starts_with(|c: char| c.is_ascii_digit()) {
            Ident::new(&format!("_{converted}"), Span::call_site())
        } else {
            Self::name_to_ident(&converted)
        }
    }

    fn type_ident(name: &str) -> Ident {
        Self::convert_name(name, |s| s.to_pascal_case(), "Unnamed")
    }

    fn field_ident(name: &str) -> Ident {
        Self::convert_name(name, |s| s.to_snake_case(), "field")
    }

    fn string_variant_to_ident(variant: &str) -> Ident {
        if variant.is_empty() {
            Ident::new("Empty", Span::call_site())
        } else {
            Self::type_ident(variant)
        }
    }

    fn doc_attrs(documentation: &str) -> Vec<Attribute> {
        doc_lines(documentation)
            .map(|line| {
                let line = format!(" {line}");
                parse_quote!(#[doc = #line])
            })
            .collect()
    }

    fn primitive_type(primitive: Primitive) -> Type {
        match primitive {
            Primitive::String => parse_quote!(String),
            Primitive::Int32 => parse_quote!(i32),
            Primitive::Int64 => parse_quote!(i64),
            Primitive::Int16 => parse_quote!(i16),
            Primitive::UInt32 => parse_quote!(u32),
            Primitive::UInt64 => parse_quote!(u64),
            Primitive::UInt16 => parse_quote!(u16),
            Primitive::Double => parse_quote!(f64),
            Primitive::Float => parse_quote!(f32),
            Primitive::Bool => parse_quote!(bool),
            Primitive::Bytes => parse_quote!(Vec<u8>),
        }
    }

    fn named_type_ident(ctx: &GeneratorContext, name: &str) -> Ident {
        match ctx.lookup(name) {
            NamedType::Record(record) => Self::type_ident(&record.display_name),
            NamedType::Enum(enum_def) => Self::type_ident(&enum_def.display_name),
            NamedType::Unknown => Self::type_ident(name),
        }
    }

    /// Element type of `field`, before its cardinality is applied. Choices get an enum of their
    /// own, named after the record and the field.
    fn element_type(&mut self, ctx: &GeneratorContext, owner: &Ident, field: &Field) -> Type {
        match &field.type_ {
            TypeRef::Primitive(primitive) => Self::primitive_type(*primitive),
            TypeRef::Named(name) => {
                let name = Self::named_type_ident(ctx, name);
                parse_quote!(#name)
            }
            TypeRef::Choice(branches) => {
                let choice_name = Self::type_ident(&format!("{owner}_{}", field.ident));
                let mut used = HashSet::new();
                let mut variants = Vec::with_capacity(branches.len());
                for branch in branches {
                    let ident = Self::unique(Self::type_ident(&branch.ident), &mut used);
                    let type_ = match &branch.type_ {
                        TypeRef::Primitive(primitive) => Self::primitive_type(*primitive),
                        TypeRef::Named(name) => {
                            let name = Self::named_type_ident(ctx, name);
                            parse_quote!(#name)
                        }
                        TypeRef::Choice(_) => parse_quote!(String),
                    };
                    variants.push(Variant {
                        attrs: vec![],
                        ident,
                        fields: Fields::Unnamed(parse_quote! { (#type_) }),
                        discriminant: None,
                    });
                }
                self.output_items.push(parse_quote! {
                    #[derive(Debug, Clone, PartialEq)]
                    pub enum #choice_name {
                        #(#variants),*
                    }
                });
                parse_quote!(#choice_name)
            }
        }
    }

    /// Returns `ident`, or `ident` with a numeric suffix if it was taken already.
    fn unique(ident: Ident, used: &mut HashSet<String>) -> Ident {
        if used.insert(ident.to_string()) {
            return ident;
        }
        let base = ident.to_string().trim_start_matches("r#").to_string();
        let mut n = 2;
        loop {
            let candidate = Self::name_to_ident(&format!("{base}{n}"));
            if used.insert(candidate.to_string()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn generate_field(
        &mut self,
        ctx: &GeneratorContext,
        record: &RecordDef,
        owner: &Ident,
        field: &Field,
        used: &mut HashSet<String>,
    ) -> SynField {
        let mut name = Self::field_ident(&field.ident);
        if field.kind == FieldKind::Attribute && used.contains(&name.to_string()) {
            let renamed = format!("{}_attr", name.to_string().trim_start_matches("r#"));
            name = Self::name_to_ident(&renamed);
        }
        let name = Self::unique(name, used);

        let type_ = self.element_type(ctx, owner, field);
        let is_self_reference = matches!(
            &field.type_,
            TypeRef::Named(target)
                if matches!(ctx.lookup(target), NamedType::Record(r) if r.ident == record.ident)
        );
        let type_: Type = if field.is_repeated() {
            parse_quote!(Vec<#type_>)
        } else if is_self_reference {
            parse_quote!(Option<std::boxed::Box<#type_>>)
        } else if field.is_optional {
            parse_quote!(Option<#type_>)
        } else {
            type_
        };

        SynField {
            attrs: Self::doc_attrs(&field.documentation),
            vis: parse_quote!(pub),
            ident: Some(name),
            colon_token: None,
            ty: type_,
            mutability: FieldMutability::None,
        }
    }

    fn unknown_variant_items() -> [Item; 3] {
        let name = Ident::new(UNKNOWN_VARIANT, Span::call_site());
        [
            parse_quote! {
                /// Error returned when parsing a string that is not one of the enumerated values.
                #[derive(Debug, Clone, PartialEq, Eq)]
                pub struct #name {
                    pub type_name: &'static str,
                    pub value: String,
                }
            },
            parse_quote! {
                impl std::fmt::Display for #name {
                    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        write!(f, "invalid value for {}: {}", self.type_name, self.value)
                    }
                }
            },
            parse_quote! {
                impl std::error::Error for #name {}
            },
        ]
    }
}

impl CatalogVisitor for RustVisitor {
    type EnumValue = ();
    fn visit_enum<'a>(&mut self, _ctx: &mut GeneratorContext<'a>, enum_def: &'a EnumDef) {
        let name = Self::type_ident(&enum_def.display_name);
        let error = Ident::new(UNKNOWN_VARIANT, Span::call_site());

        let mut seen_values = HashSet::new();
        let mut used = HashSet::new();
        let enum_members = enum_def
            .values
            .iter()
            .filter(|value| seen_values.insert(value.as_str()))
            .map(|value| {
                let ident = Self::unique(Self::string_variant_to_ident(value), &mut used);
                (value.as_str(), ident)
            })
            .collect::<Vec<_>>();

        let variants = enum_members.iter().map(|(value, ident)| Variant {
            ident: ident.clone(),
            fields: Fields::Unit,
            attrs: vec![{
                let c = format!("Enumeration value for `` {value} ``");
                parse_quote!(#[doc = #c])
            }],
            discriminant: None,
        });
        let as_str_arms = enum_members.iter().map(|(value, ident)| -> Arm {
            parse_quote! {
                Self::#ident => #value,
            }
        });
        let from_str_arms = enum_members.iter().map(|(value, ident)| -> Arm {
            parse_quote! {
                #value => Ok(Self::#ident),
            }
        });
        let docs = Self::doc_attrs(&enum_def.documentation);
        let type_name = name.to_string();

        self.output_items.push(parse_quote! {
            #(#docs)*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum #name {
                #(#variants),*
            }
        });
        self.output_items.push(parse_quote! {
            impl #name {
                /// The value as spelled in the schema.
                pub fn as_str(&self) -> &'static str {
                    match self {
                        #(#as_str_arms)*
                    }
                }
            }
        });
        self.output_items.push(parse_quote! {
            impl std::str::FromStr for #name {
                type Err = #error;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    match s {
                        #(#from_str_arms)*
                        _ => Err(#error {
                            type_name: #type_name,
                            value: s.to_string(),
                        }),
                    }
                }
            }
        });
    }

    type RecordValue = ();
    fn visit_record<'a>(&mut self, ctx: &mut GeneratorContext<'a>, record: &'a RecordDef) {
        if !ctx.visited_records.insert(record.ident.as_str()) {
            return;
        }

        let name = Self::type_ident(&record.display_name);
        let mut used = HashSet::new();
        let mut fields = Vec::with_capacity(record.fields.len() + 1);
        if let Some(base) = ctx.base_record(record) {
            // composition stands in for inheritance
            let base = Self::type_ident(&base.display_name);
            used.insert("base".to_string());
            fields.push(SynField {
                attrs: vec![],
                vis: parse_quote!(pub),
                ident: Some(Ident::new("base", Span::call_site())),
                colon_token: None,
                ty: parse_quote!(#base),
                mutability: FieldMutability::None,
            });
        }
        for field in &record.fields {
            let field = self.generate_field(ctx, record, &name, field, &mut used);
            fields.push(field);
        }

        let mut docs = Self::doc_attrs(&record.documentation);
        if record.is_abstract {
            docs.push(parse_quote!(#[doc = ""]));
            docs.push(parse_quote!(#[doc = " Abstract in the schema."]));
        }
        self.output_items.push(parse_quote! {
            #(#docs)*
            #[derive(Debug, Clone, PartialEq)]
            pub struct #name {
                #(#fields),*
            }
        });
    }

    type ElementValue = ();
    fn visit_element<'a>(&mut self, ctx: &mut GeneratorContext<'a>, element: &'a ElementBinding) {
        let type_ = match &element.root_record {
            Some(root) => Self::named_type_ident(ctx, root).to_string(),
            None => element.type_.clone(),
        };
        self.root_elements.push((element.ident.clone(), type_));
    }
}

fn cargo_manifest(ctx: &EmitContext) -> String {
    let package = ctx.namespace.unwrap_or("generated").to_kebab_case();
    format!(
        r#"[package]
name = "{package}"
version = "0.1.0"
edition = "2021"

[lib]
path = "lib.rs"

[dependencies]
"#
    )
}

pub fn generate(ctx: &EmitContext) -> Vec<OutputFile> {
    let mut gen_ctx = GeneratorContext::new(ctx.catalog);
    let mut visitor = RustVisitor::new();

    if !ctx.catalog.enums.is_empty() {
        visitor
            .output_items
            .extend(RustVisitor::unknown_variant_items());
    }
    for enum_def in &ctx.catalog.enums {
        visitor.visit_enum(&mut gen_ctx, enum_def);
    }
    for record in &ctx.catalog.records {
        visitor.visit_record(&mut gen_ctx, record);
    }
    for element in &ctx.catalog.elements {
        visitor.visit_element(&mut gen_ctx, element);
    }

    if !visitor.root_elements.is_empty() {
        let names = visitor.root_elements.iter().map(|(name, _)| name);
        let types = visitor.root_elements.iter().map(|(_, type_)| type_);
        visitor.output_items.push(parse_quote! {
            /// Top-level elements of the schema with their declared types.
            pub const ROOT_ELEMENTS: &[(&str, &str)] = &[#((#names, #types)),*];
        });
    }

    let items = match ctx.namespace {
        Some(namespace) => {
            let module = RustVisitor::field_ident(namespace);
            let items = visitor.output_items;
            vec![parse_quote! {
                pub mod #module {
                    #(#items)*
                }
            }]
        }
        None => visitor.output_items,
    };

    let doc_comment = concat!(
        "Generated by ",
        env!("CARGO_PKG_NAME"),
        " ",
        env!("CARGO_PKG_VERSION")
    );
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code)]),
        ],
        items,
    };
    vec![
        OutputFile::new("lib.rs", prettyplease::unparse(&root)),
        OutputFile::new("Cargo.toml", cargo_manifest(ctx)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use xsd_catalog::{parse_schema, Catalog};

    fn catalog(body: &str) -> Catalog {
        let xml = format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#);
        parse_schema(&xml).unwrap().catalog
    }

    fn lib_rs(catalog: &Catalog, namespace: &str) -> String {
        let files = generate(&EmitContext::new(catalog, namespace));
        files.into_iter().find(|f| f.name == "lib.rs").unwrap().contents
    }

    #[test]
    fn identifiers_follow_rust_conventions() {
        assert_eq!(RustVisitor::type_ident("purchaseOrder").to_string(), "PurchaseOrder");
        assert_eq!(RustVisitor::field_ident("textContent").to_string(), "text_content");
        assert_eq!(RustVisitor::field_ident("type").to_string(), "r#type");
        assert_eq!(RustVisitor::field_ident("self").to_string(), "self_");
        assert_eq!(RustVisitor::field_ident("_2nd").to_string(), "_2nd");
        assert_eq!(RustVisitor::string_variant_to_ident("red-hot").to_string(), "RedHot");
        assert_eq!(RustVisitor::string_variant_to_ident("42").to_string(), "_42");
        assert_eq!(RustVisitor::string_variant_to_ident("").to_string(), "Empty");
    }

    #[test]
    fn enums_round_trip_original_spelling() {
        let catalog = catalog(
            r#"<xs:simpleType name="ColorType"><xs:restriction base="xs:string">
                <xs:enumeration value="red-hot"/><xs:enumeration value="green"/>
            </xs:restriction></xs:simpleType>"#,
        );
        let code = lib_rs(&catalog, "");
        assert!(code.contains("pub struct UnknownVariant"));
        assert!(code.contains("pub enum Color {"));
        assert!(code.contains("RedHot,"));
        assert!(code.contains("Self::RedHot => \"red-hot\","));
        assert!(code.contains("\"red-hot\" => Ok(Self::RedHot),"));
        assert!(code.contains("impl std::str::FromStr for Color"));
    }

    #[test]
    fn records_map_cardinality_to_wrappers() {
        let catalog = catalog(
            r#"<xs:complexType name="Node"><xs:sequence>
                <xs:element name="value" type="xs:long"/>
                <xs:element name="label" type="xs:string" minOccurs="0"/>
                <xs:element name="children" type="Node" maxOccurs="unbounded"/>
                <xs:element name="next" type="Node" minOccurs="0"/>
                <xs:choice>
                    <xs:element name="a" type="xs:int"/>
                    <xs:element name="b" type="xs:string"/>
                </xs:choice>
            </xs:sequence>
            <xs:attribute name="value" type="xs:string"/></xs:complexType>"#,
        );
        let code = lib_rs(&catalog, "");
        assert!(code.contains("pub struct Node {"));
        assert!(code.contains("pub value: i64,"));
        assert!(code.contains("pub label: Option<String>,"));
        assert!(code.contains("pub children: Vec<Node>,"));
        assert!(code.contains("pub next: Option<std::boxed::Box<Node>>,"));
        assert!(code.contains("pub a_b: Option<NodeAB>,"));
        assert!(code.contains("pub enum NodeAB {"));
        assert!(code.contains("A(i32),"));
        assert!(code.contains("pub value_attr: Option<String>,"));
    }

    #[test]
    fn extension_becomes_base_field() {
        let catalog = catalog(
            r#"<xs:complexType name="Shape"/>
               <xs:complexType name="Circle"><xs:complexContent><xs:extension base="Shape">
                 <xs:sequence><xs:element name="r" type="xs:double"/></xs:sequence>
               </xs:extension></xs:complexContent></xs:complexType>"#,
        );
        let code = lib_rs(&catalog, "");
        assert!(code.contains("pub struct Circle {\n    pub base: Shape,\n    pub r: f64,\n}"));
    }

    #[test]
    fn namespace_wraps_items_in_module() {
        let catalog = catalog(r#"<xs:element name="note" type="xs:string"/>"#);
        let files = generate(&EmitContext::new(&catalog, "PurchaseOrders"));
        let code = &files[0].contents;
        assert!(code.contains("Generated by xsd-codegen"));
        assert!(code.contains("pub mod purchase_orders {"));
        assert!(code.contains("ROOT_ELEMENTS"));
        assert!(code.contains("(\"note\", \"xs:string\")"));
        assert_eq!(files[1].name, "Cargo.toml");
        assert!(files[1].contents.contains("name = \"purchase-orders\""));
    }

    #[test]
    fn inline_root_elements_name_their_struct() {
        let catalog = catalog(
            r#"<xs:element name="order"><xs:complexType><xs:sequence>
                <xs:element name="id" type="xs:int"/>
            </xs:sequence></xs:complexType></xs:element>"#,
        );
        let code = lib_rs(&catalog, "");
        assert!(code.contains("pub struct Order {"));
        assert!(code.contains("(\"order\", \"Order\")"));
    }
}
