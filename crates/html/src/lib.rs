//! Markup model for editable surfaces: tokenizer, fragment builder and serializer.
pub mod dom_utils;

mod dom_builder;
mod entities;
mod serialize;
mod tokenizer;
mod types;

pub use crate::dom_builder::build_fragment;
pub use crate::entities::{decode_entities, escape_attr_into, escape_text_into};
pub use crate::serialize::{nodes_to_html, to_html};
pub use crate::tokenizer::tokenize;
pub use crate::types::{AtomId, AtomTable, Node, Token, TokenStream};

/// Tokenizes and builds `input` in one step.
pub fn parse_fragment(input: &str) -> Node {
    build_fragment(&tokenize(input))
}
