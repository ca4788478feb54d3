use crate::entities::{escape_attr_into, escape_text_into};
use crate::tokenizer::is_void_element;
use crate::types::Node;

/// Serializes `node` back to markup.
///
/// A `Fragment` serializes as the concatenation of its children. Void elements
/// are written without an end tag and valueless attributes without `=`.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Serializes a sequence of sibling nodes.
pub fn nodes_to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

enum Step<'a> {
    Open(&'a Node),
    Close(&'a str),
}

fn write_node(root: &Node, out: &mut String) {
    let mut stack = vec![Step::Open(root)];
    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Close(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
                continue;
            }
            Step::Open(node) => node,
        };
        match node {
            Node::Text { text } => escape_text_into(out, text),
            Node::Comment { text } => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Node::Fragment { children } => {
                stack.extend(children.iter().rev().map(Step::Open));
            }
            Node::Element {
                name,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attributes {
                    out.push(' ');
                    out.push_str(k);
                    if let Some(v) = v {
                        out.push_str("=\"");
                        escape_attr_into(out, v);
                        out.push('"');
                    }
                }
                out.push('>');
                if is_void_element(name) {
                    continue;
                }
                stack.push(Step::Close(name));
                stack.extend(children.iter().rev().map(Step::Open));
            }
        }
    }
}
