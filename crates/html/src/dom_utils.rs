use crate::Node;

/// Appends the concatenated text of `node` and its descendants to `out`.
///
/// `<br>` contributes a `\n`; comments contribute nothing.
pub fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } => out.push_str(text),
        Node::Element { name, .. } if name.eq_ignore_ascii_case("br") => out.push('\n'),
        Node::Element { children, .. } | Node::Fragment { children } => {
            for c in children {
                collect_text(c, out);
            }
        }
        Node::Comment { .. } => {}
    }
}

pub fn text_content(node: &Node) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

/// Whether `node` is an element named `name` (ASCII case-insensitive).
pub fn is_element(node: &Node, name: &str) -> bool {
    node.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
}
