use roxmltree::Node;

use super::xml::first_xs_child;

fn trim(text: &str) -> &str {
    text.trim_matches([' ', '\t', '\n', '\r'])
}

/// Documentation of a construct: the text of its first `annotation/documentation`, or else the
/// comments directly preceding it (up to the previous element), in document order.
pub(crate) fn documentation(node: Node) -> String {
    let annotated = first_xs_child(node, "annotation")
        .and_then(|annotation| first_xs_child(annotation, "documentation"))
        .map(|doc_node| {
            doc_node
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<String>()
        });
    if let Some(text) = annotated {
        let text = trim(&text);
        if !text.is_empty() {
            return text.to_string();
        }
    }

    let mut comments = Vec::new();
    let mut sibling = node.prev_sibling();
    while let Some(current) = sibling {
        if current.is_element() {
            break;
        }
        if current.is_comment() {
            if let Some(text) = current.text().map(trim).filter(|t| !t.is_empty()) {
                comments.push(text);
            }
        }
        sibling = current.prev_sibling();
    }
    comments.reverse();
    comments.join("\n")
}

/// Appends `line` to `documentation` on a line of its own.
pub(crate) fn append_line(documentation: &mut String, line: &str) {
    if !documentation.is_empty() {
        documentation.push('\n');
    }
    documentation.push_str(line);
}

/// Annotates a documentation string with the `default` and `fixed` value constraints of `node`.
pub(crate) fn append_value_constraints(documentation: &mut String, node: Node) {
    if let Some(default) = node.attribute("default") {
        append_line(documentation, &format!("[default: {default}]"));
    }
    if let Some(fixed) = node.attribute("fixed") {
        append_line(documentation, &format!("[fixed: {fixed}]"));
    }
}
