//! Search, pruning, consolidation and merging of query trees.
//!
//! These operations let a caller combine a query from the request with one
//! imposed by the server, or strip clauses it handles elsewhere.
//!
//! # Examples
//!
//! ```
//! use rql_lang::{parse, Operation};
//!
//! let request = parse("Name=John&select(Name)").unwrap();
//! let policy = parse("Tenant=7&select(Id)").unwrap();
//! let merged = request.merge(&policy).unwrap();
//!
//! assert_eq!(merged.to_string(), "Name=\"John\"&Tenant=7&select(Name,Id)");
//! assert!(merged.contains(Operation::Select));
//! ```

use log::debug;

use crate::{
    ast::{Operation, Property, QueryNode},
    error::{Result, RqlError},
};

impl QueryNode {
    /// First node tagged `operation`, in pre-order.
    pub fn find(&self, operation: Operation) -> Option<&QueryNode> {
        if self.operation() == operation {
            return Some(self);
        }
        self.nodes().iter().find_map(|child| child.find(operation))
    }

    /// Every node tagged `operation`, in pre-order.
    pub fn find_all(&self, operation: Operation) -> Vec<&QueryNode> {
        let mut found = Vec::new();
        self.collect(operation, &mut found);
        found
    }

    fn collect<'a>(&'a self, operation: Operation, found: &mut Vec<&'a QueryNode>) {
        if self.operation() == operation {
            found.push(self);
        }
        for child in self.nodes() {
            child.collect(operation, found);
        }
    }

    pub fn contains(&self, operation: Operation) -> bool {
        self.find(operation).is_some()
    }

    /// Removes every node tagged `operation`.
    ///
    /// An `and`/`or` left empty becomes NOOP and one left with a single child
    /// is replaced by that child. Removing the root's own tag leaves NOOP.
    pub fn remove_all(&mut self, operation: Operation) {
        if self.operation() == operation {
            *self = QueryNode::Noop;
            return;
        }
        let Some(children) = self.nodes_mut() else {
            return;
        };
        children.retain(|child| child.operation() != operation);
        for child in children.iter_mut() {
            child.remove_all(operation);
        }
        children.retain(|child| !child.is_noop());
        self.collapse();
    }

    /// Replaces an empty `and`/`or` with NOOP and a single-child one with its child.
    fn collapse(&mut self) {
        let replacement = match self {
            QueryNode::And(children) | QueryNode::Or(children) => match children.len() {
                0 => Some(QueryNode::Noop),
                1 => children.pop(),
                _ => None,
            },
            _ => None,
        };
        if let Some(node) = replacement {
            *self = node;
        }
    }

    /// True when `path`, or a longer path it opens, is used anywhere in the
    /// tree. Segments compare without regard to case.
    pub fn references(&self, path: &Property) -> bool {
        self.references_with(path, false)
    }

    pub fn references_with(&self, path: &Property, case_sensitive: bool) -> bool {
        self.properties()
            .iter()
            .any(|property| property.starts_with(path, case_sensitive))
            || self
                .nodes()
                .iter()
                .any(|child| child.references_with(path, case_sensitive))
    }

    /// Folds scattered `select`, `sort`, `in` or `out` clauses into the first
    /// of their kind.
    ///
    /// Only clauses that are conjoined are combined: the root itself and the
    /// children of `and` nodes reached through other `and` nodes. Membership
    /// clauses are combined per operator and property.
    pub fn consolidate(&mut self, operation: Operation) -> Result<()> {
        if !matches!(
            operation,
            Operation::Select | Operation::Sort | Operation::In | Operation::Out
        ) {
            return Err(RqlError::shape(format!(
                "cannot consolidate {} nodes; only select, sort, in and out lists combine",
                operation
            )));
        }
        if let QueryNode::And(children) = self {
            if consolidate_siblings(children, operation) {
                self.collapse();
            }
        }
        Ok(())
    }

    /// Conjoins two trees.
    ///
    /// Shaping clauses are pulled out of both sides and unioned, the
    /// remaining conditions are joined with `and`, and the shaping clauses
    /// are appended as siblings. The result is validated like a parsed
    /// query, so two `limit` clauses still conflict.
    pub fn merge(&self, other: &QueryNode) -> Result<QueryNode> {
        if other.is_noop() {
            return Ok(self.clone());
        }
        if self.is_noop() {
            return Ok(other.clone());
        }

        let (left, left_clauses) = split_non_conditionals(self.clone());
        let (right, right_clauses) = split_non_conditionals(other.clone());

        let mut clauses: Vec<QueryNode> = Vec::new();
        for clause in left_clauses.into_iter().chain(right_clauses) {
            union_into(&mut clauses, clause);
        }

        let mut children = match conjoin(left, right) {
            QueryNode::Noop => Vec::new(),
            QueryNode::And(children) => children,
            node => vec![node],
        };
        children.extend(clauses);

        let mut merged = QueryNode::And(children);
        merged.collapse();
        debug!("merged query: {}", merged);
        merged.validate()?;
        Ok(merged)
    }

    /// The `select` clause, if any.
    pub fn extract_select(&self) -> Option<&QueryNode> {
        self.find(Operation::Select)
    }

    /// The `limit` clause, if any.
    pub fn extract_limit(&self) -> Option<&QueryNode> {
        self.find(Operation::Limit)
    }

    /// True when the `select` clause names `path`, a path under it, or a
    /// parent of it. False when there is no `select`.
    pub fn select_contains(&self, path: &Property) -> bool {
        match self.extract_select() {
            Some(QueryNode::Select(properties)) => properties
                .iter()
                .any(|p| p.starts_with(path, false) || path.starts_with(p, false)),
            _ => false,
        }
    }
}

/// Folds repeated list clauses along the `and` spine into the first of their
/// kind. Returns true when anything was folded.
fn consolidate_siblings(children: &mut Vec<QueryNode>, operation: Operation) -> bool {
    let mut merged = Vec::new();
    if !fold_spine(children, operation, &mut merged) {
        return false;
    }
    restore_spine(children, &mut merged);
    true
}

/// Drops every repeat of a list clause, absorbing it into `merged`, which
/// holds one accumulated copy per kind.
fn fold_spine(children: &mut Vec<QueryNode>, operation: Operation, merged: &mut Vec<QueryNode>) -> bool {
    let mut folded = false;
    let mut kept: Vec<QueryNode> = Vec::with_capacity(children.len());

    for mut child in children.drain(..) {
        if let QueryNode::And(nested) = &mut child {
            if fold_spine(nested, operation, merged) {
                folded = true;
                child.collapse();
                if child.is_noop() {
                    continue;
                }
            }
        } else if child.operation() == operation {
            if let Some(first) = merged.iter_mut().find(|m| same_list(m, &child)) {
                absorb(first, child);
                folded = true;
                continue;
            }
            merged.push(child.clone());
        }
        kept.push(child);
    }

    *children = kept;
    folded
}

/// Swaps the accumulated copies back in place of the clauses they started from.
fn restore_spine(children: &mut [QueryNode], merged: &mut Vec<QueryNode>) {
    for child in children.iter_mut() {
        if merged.is_empty() {
            return;
        }
        if let QueryNode::And(nested) = &mut *child {
            restore_spine(nested, merged);
        } else if let Some(i) = merged.iter().position(|m| same_list(m, &*child)) {
            *child = merged.swap_remove(i);
        }
    }
}

/// Two list clauses of one kind that fold together.
fn same_list(a: &QueryNode, b: &QueryNode) -> bool {
    match (a, b) {
        (QueryNode::Select(_), QueryNode::Select(_)) | (QueryNode::Sort(_), QueryNode::Sort(_)) => {
            true
        }
        (
            QueryNode::Membership {
                op: op_a,
                property: prop_a,
                ..
            },
            QueryNode::Membership {
                op: op_b,
                property: prop_b,
                ..
            },
        ) => op_a == op_b && prop_a == prop_b,
        _ => false,
    }
}

/// Appends the entries of `other` that `target` does not already hold.
fn absorb(target: &mut QueryNode, other: QueryNode) {
    match (target, other) {
        (QueryNode::Select(properties), QueryNode::Select(more)) => {
            for property in more {
                if !properties.contains(&property) {
                    properties.push(property);
                }
            }
        }
        (QueryNode::Sort(keys), QueryNode::Sort(more)) => {
            for key in more {
                if !keys.iter().any(|k| k.property == key.property) {
                    keys.push(key);
                }
            }
        }
        (QueryNode::Membership { values, .. }, QueryNode::Membership { values: more, .. }) => {
            for value in more {
                if !values.iter().any(|v| v.eq_ignore_case(&value)) {
                    values.push(value);
                }
            }
        }
        _ => {}
    }
}

fn union_into(clauses: &mut Vec<QueryNode>, clause: QueryNode) {
    match clauses.iter_mut().find(|c| same_list(c, &clause)) {
        Some(target) => absorb(target, clause),
        None => clauses.push(clause),
    }
}

/// Clauses pulled out of a tree when merging.
fn is_extractable(node: &QueryNode) -> bool {
    !node.is_conditional() && !node.is_noop()
}

/// Splits a tree into its conditional residue and its shaping clauses.
///
/// Shaping clauses are taken from the root, from the children of a root
/// `and` and of the `and` nodes nested under it, and from the direct
/// children of a root `or`. Membership lists are taken only at the root or
/// directly under a root `and`.
fn split_non_conditionals(node: QueryNode) -> (QueryNode, Vec<QueryNode>) {
    let mut extracted = Vec::new();
    let residue = match node {
        QueryNode::Membership { .. } => {
            extracted.push(node);
            QueryNode::Noop
        }
        node if is_extractable(&node) => {
            extracted.push(node);
            QueryNode::Noop
        }
        QueryNode::And(children) => {
            let mut kept = Vec::with_capacity(children.len());
            for child in children {
                match child {
                    QueryNode::Noop => {}
                    QueryNode::Membership { .. } => extracted.push(child),
                    QueryNode::And(_) => {
                        let nested = extract_nested(child, &mut extracted);
                        if !nested.is_noop() {
                            kept.push(nested);
                        }
                    }
                    child if is_extractable(&child) => extracted.push(child),
                    child => kept.push(child),
                }
            }
            let mut residue = QueryNode::And(kept);
            residue.collapse();
            residue
        }
        QueryNode::Or(children) => {
            let (clauses, kept): (Vec<_>, Vec<_>) = children.into_iter().partition(is_extractable);
            extracted.extend(clauses);
            let mut residue = QueryNode::Or(kept);
            residue.collapse();
            residue
        }
        node => node,
    };
    (residue, extracted)
}

/// Pulls shaping clauses out of an `and` nested under the root `and`.
fn extract_nested(node: QueryNode, extracted: &mut Vec<QueryNode>) -> QueryNode {
    let QueryNode::And(children) = node else {
        return node;
    };
    let mut kept = Vec::with_capacity(children.len());
    for child in children {
        match child {
            QueryNode::And(_) => {
                let nested = extract_nested(child, extracted);
                if !nested.is_noop() {
                    kept.push(nested);
                }
            }
            child if is_extractable(&child) => extracted.push(child),
            child => kept.push(child),
        }
    }
    let mut residue = QueryNode::And(kept);
    residue.collapse();
    residue
}

/// Joins two residues with `and`, extending an existing `and` instead of nesting.
fn conjoin(left: QueryNode, right: QueryNode) -> QueryNode {
    match (left, right) {
        (QueryNode::Noop, node) | (node, QueryNode::Noop) => node,
        (QueryNode::And(mut children), QueryNode::And(more)) => {
            children.extend(more);
            QueryNode::And(children)
        }
        (QueryNode::And(mut children), node) => {
            children.push(node);
            QueryNode::And(children)
        }
        (node, QueryNode::And(more)) => {
            let mut children = vec![node];
            children.extend(more);
            QueryNode::And(children)
        }
        (a, b) => QueryNode::And(vec![a, b]),
    }
}
