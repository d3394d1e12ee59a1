//! Navigation helpers over the schema document.
//!
//! A construct matches `foo` when its local name is `foo` and it lives in the XSD namespace or in
//! no namespace at all, so `<xs:foo>`, `<xsd:foo>` and an unprefixed `<foo>` are all accepted.

use std::borrow::Cow;

use roxmltree::Node;

use crate::builtins::{lookup_builtin, XS_NAMESPACE};

pub(crate) fn is_xs(node: Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && matches!(node.tag_name().namespace(), None | Some(XS_NAMESPACE))
}

pub(crate) fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

pub(crate) fn first_xs_child<'a, 'input>(
    node: Node<'a, 'input>,
    local_name: &str,
) -> Option<Node<'a, 'input>> {
    element_children(node).find(|c| is_xs(*c, local_name))
}

/// The first child that is one of `local_names`, whichever comes first in document order.
pub(crate) fn first_xs_child_of<'a, 'input>(
    node: Node<'a, 'input>,
    local_names: &[&str],
) -> Option<Node<'a, 'input>> {
    element_children(node).find(|c| local_names.iter().any(|name| is_xs(*c, name)))
}

/// Attribute value, with an empty value treated as absent.
pub(crate) fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name).filter(|v| !v.is_empty())
}

/// Rewrites a reference to a built-in type into the `xs:` spelling the registry is seeded with,
/// whatever prefix the document binds the XSD namespace to.
pub(crate) fn canonical_type_name<'q>(node: Node, qname: &'q str) -> Cow<'q, str> {
    let (prefix, local_name) = match qname.split_once(':') {
        Some((prefix, local_name)) => (Some(prefix), local_name),
        None => (None, qname),
    };
    if prefix == Some("xs") {
        return Cow::Borrowed(qname);
    }
    let xs_spelling = format!("xs:{local_name}");
    if lookup_builtin(&xs_spelling).is_some()
        && node.lookup_namespace_uri(prefix) == Some(XS_NAMESPACE)
    {
        Cow::Owned(xs_spelling)
    } else {
        Cow::Borrowed(qname)
    }
}
