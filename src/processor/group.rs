//! Nested string arrays emitted verbatim as brace initializers.

use std::fmt::{self, Write};

use crate::model::{GroupTree, is_identifier};
use crate::parser::Node;

/// Accept only identifier strings at the leaves and arrays everywhere else,
/// with no array mixing string and array children. Leaves are printed
/// unquoted, so anything else rejects the whole group.
pub fn validate(node: &Node) -> Option<GroupTree> {
    match node {
        Node::String(s) if is_identifier(s) => Some(GroupTree::Leaf(s.clone())),
        Node::Array(items) => {
            let leaves = items.iter().filter(|n| matches!(n, Node::String(_))).count();
            if leaves != 0 && leaves != items.len() {
                return None;
            }
            items
                .iter()
                .map(validate)
                .collect::<Option<Vec<_>>>()
                .map(GroupTree::Branch)
        }
        _ => None,
    }
}

/// Array bounds of the generated declaration: the widest node seen at each
/// depth, plus one terminator slot on the innermost dimension.
pub fn dimensions(tree: &GroupTree) -> Vec<usize> {
    fn walk(tree: &GroupTree, depth: usize, dims: &mut Vec<usize>) {
        if let GroupTree::Branch(children) = tree {
            if dims.len() <= depth {
                dims.resize(depth + 1, 0);
            }
            dims[depth] = dims[depth].max(children.len());
            for child in children {
                walk(child, depth + 1, dims);
            }
        }
    }

    let mut dims = Vec::new();
    walk(tree, 0, &mut dims);
    if let Some(last) = dims.last_mut() {
        *last += 1;
    }
    dims
}

/// Brace-initializer text for the whole tree, starting at depth 0.
pub fn print(out: &mut String, tree: &GroupTree, depth: usize) -> fmt::Result {
    let indent = " ".repeat(depth * 4);
    match tree {
        GroupTree::Leaf(value) if depth == 0 => writeln!(out, "{indent}= {value};"),
        GroupTree::Leaf(value) => writeln!(out, "{indent}{value},"),
        GroupTree::Branch(children) => {
            writeln!(out, "{indent}{{")?;
            for child in children {
                print(out, child, depth + 1)?;
            }
            let close = if depth == 0 { ';' } else { ',' };
            writeln!(out, "{indent}}}{close}")
        }
    }
}
