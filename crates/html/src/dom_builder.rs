use crate::types::{Node, Token, TokenStream};

/// Builds a fragment tree from a token stream.
///
/// Unbalanced end tags pop back to the nearest matching open element; end tags
/// without any matching open element are ignored. Elements left open at the end
/// of input are closed implicitly.
pub fn build_fragment(stream: &TokenStream) -> Node {
    let atoms = stream.atoms();
    let mut arena = NodeArena::new();
    let root_index = arena.push(ArenaNode::Fragment {
        children: Vec::new(),
    });

    let mut open_elements: Vec<usize> = Vec::new();

    for token in stream.tokens() {
        let parent_index = open_elements.last().copied().unwrap_or(root_index);
        match token {
            Token::Comment(c) => {
                arena.add_child(parent_index, ArenaNode::Comment { text: c.clone() });
            }
            Token::Text(txt) => {
                if !txt.is_empty() {
                    arena.add_child(parent_index, ArenaNode::Text { text: txt.clone() });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let attributes = attributes
                    .iter()
                    .map(|(k, v)| (atoms.resolve(*k).to_string(), v.clone()))
                    .collect();
                let new_index = arena.add_child(
                    parent_index,
                    ArenaNode::Element {
                        name: atoms.resolve(*name).to_string(),
                        attributes,
                        children: Vec::new(),
                    },
                );
                if !*self_closing {
                    open_elements.push(new_index);
                }
            }
            Token::EndTag(name) => {
                let target = atoms.resolve(*name);
                if open_elements
                    .iter()
                    .any(|&idx| arena.is_element_named(idx, target))
                {
                    while let Some(open_index) = open_elements.pop() {
                        if arena.is_element_named(open_index, target) {
                            break;
                        }
                    }
                }
            }
        }
    }

    arena.into_tree(root_index)
}

#[derive(Debug)]
enum ArenaNode {
    Fragment {
        children: Vec<usize>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<usize>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl ArenaNode {
    fn children(&self) -> &[usize] {
        match self {
            ArenaNode::Fragment { children } | ArenaNode::Element { children, .. } => children,
            ArenaNode::Text { .. } | ArenaNode::Comment { .. } => &[],
        }
    }
}

#[derive(Debug)]
struct NodeArena {
    nodes: Vec<ArenaNode>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent_index: usize, child: ArenaNode) -> usize {
        let child_index = self.push(child);
        if let ArenaNode::Fragment { children } | ArenaNode::Element { children, .. } =
            &mut self.nodes[parent_index]
        {
            children.push(child_index);
        }
        child_index
    }

    fn is_element_named(&self, node_index: usize, target: &str) -> bool {
        match &self.nodes[node_index] {
            ArenaNode::Element { name, .. } => name.eq_ignore_ascii_case(target),
            _ => false,
        }
    }

    fn into_tree(self, root_index: usize) -> Node {
        let mut nodes: Vec<Option<ArenaNode>> = self.nodes.into_iter().map(Some).collect();
        let mut built: Vec<Node> = Vec::with_capacity(nodes.len());

        // Iterative postorder: a node is built once all of its children sit, in
        // order, on top of `built`.
        let mut stack: Vec<(usize, bool)> = vec![(root_index, false)];
        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));
                if let Some(node) = &nodes[node_index] {
                    for &child_index in node.children().iter().rev() {
                        stack.push((child_index, false));
                    }
                }
                continue;
            }

            let Some(node) = nodes[node_index].take() else {
                continue;
            };
            let child_count = node.children().len();
            let children = built.split_off(built.len().saturating_sub(child_count));
            built.push(match node {
                ArenaNode::Fragment { .. } => Node::Fragment { children },
                ArenaNode::Element {
                    name, attributes, ..
                } => Node::Element {
                    name,
                    attributes,
                    children,
                },
                ArenaNode::Text { text } => Node::Text { text },
                ArenaNode::Comment { text } => Node::Comment { text },
            });
        }

        debug_assert_eq!(built.len(), 1, "fragment builder should build one root");
        built.pop().unwrap_or(Node::Fragment {
            children: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    #[test]
    fn builds_flat_fragment() {
        let tree = build_fragment(&tokenize("Hi <em data-id=\"1\">@A </em>!<br>x"));
        let children = tree.children();
        assert_eq!(children.len(), 5);
        assert_eq!(children[0], Node::text("Hi "));
        assert_eq!(children[1].name(), Some("em"));
        assert_eq!(children[1].attr("data-id"), Some("1"));
        assert_eq!(children[1].children(), &[Node::text("@A ")]);
        assert_eq!(children[2], Node::text("!"));
        assert_eq!(children[3].name(), Some("br"));
        assert_eq!(children[4], Node::text("x"));
    }

    #[test]
    fn stray_end_tag_is_ignored() {
        let tree = build_fragment(&tokenize("<span>a</em>b</span>c"));
        let children = tree.children();
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0].children(),
            &[Node::text("a"), Node::text("b")]
        );
        assert_eq!(children[1], Node::text("c"));
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 5_000;
        let src = format!("{}{}", "<span>".repeat(depth), "</span>".repeat(depth));
        let tree = build_fragment(&tokenize(&src));
        let mut current = &tree;
        let mut seen = 0usize;
        while let Some(child) = current.children().first() {
            seen += 1;
            current = child;
        }
        assert_eq!(seen, depth);
    }
}
