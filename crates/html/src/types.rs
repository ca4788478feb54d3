use std::collections::HashMap;

/// Interned tag/attribute name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtomId(u32);

/// Interning table for ASCII-lowercased tag and attribute names.
#[derive(Clone, Debug, Default)]
pub struct AtomTable {
    names: Vec<String>,
    index: HashMap<String, AtomId>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `name` after ASCII-lowercasing it; repeated names share one id.
    pub fn intern_ascii_lowercase(&mut self, name: &str) -> AtomId {
        let lowered = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        };
        if let Some(id) = self.index.get(&lowered) {
            return *id;
        }
        let id = AtomId(self.names.len() as u32);
        self.names.push(lowered.clone());
        self.index.insert(lowered, id);
        id
    }

    pub fn resolve(&self, id: AtomId) -> &str {
        self.names
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: AtomId,
        attributes: Vec<(AtomId, Option<String>)>,
        self_closing: bool,
    },
    EndTag(AtomId),
    Comment(String),
    /// Text with entities already decoded.
    Text(String),
}

/// Token list plus the atom table its names resolve against.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    atoms: AtomTable,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, atoms: AtomTable) -> Self {
        Self { tokens, atoms }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Resolves the value of attribute `name` on a start-tag attribute list.
    pub fn attribute<'a>(
        &'a self,
        attributes: &'a [(AtomId, Option<String>)],
        name: &str,
    ) -> Option<&'a str> {
        attributes
            .iter()
            .find(|(k, _)| self.atoms.resolve(*k) == name)
            .and_then(|(_, v)| v.as_deref())
    }
}

/// Markup tree. Parsed fragments always come back wrapped in a `Fragment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Fragment {
        children: Vec<Node>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn element(
        name: impl Into<String>,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    ) -> Self {
        Node::Element {
            name: name.into(),
            attributes,
            children,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Fragment { children } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Fragment { children } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Tag name for elements, `None` otherwise.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Value of attribute `key`; valueless attributes resolve to `""`.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_deref().unwrap_or("")),
            _ => None,
        }
    }

    /// Whether the element's `class` attribute contains `class` as a whole token.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }
}
