//! Whole-tree checks run once after parsing and again after merging.

use log::trace;

use crate::{
    ast::{Operation, Property, QueryNode},
    error::{Result, RqlError},
    options::ParseOptions,
};

/// Clause counts gathered in one walk. "Ungrouped" means outside any
/// `aggregate(...)`. A bare `count()` is counted wherever it appears.
#[derive(Debug, Default)]
struct Census<'a> {
    limit: usize,
    distinct: usize,
    one: usize,
    first: usize,
    values: usize,
    aggregate: usize,
    bare_count: usize,
    select: usize,
    ungrouped_functions: usize,
    targets: Vec<&'a Property>,
}

impl<'a> Census<'a> {
    fn visit(&mut self, node: &'a QueryNode, grouped: bool) -> Result<()> {
        match node {
            QueryNode::Limit(_) => self.limit += 1,
            QueryNode::Distinct => self.distinct += 1,
            QueryNode::One => self.one += 1,
            QueryNode::First => self.first += 1,
            QueryNode::Values(_) => self.values += 1,
            QueryNode::Select(_) => self.select += 1,
            QueryNode::Count(None) => self.bare_count += 1,
            QueryNode::Count(Some(property)) | QueryNode::Function { property, .. } => {
                if !grouped {
                    self.ungrouped_functions += 1;
                }
                if self.targets.iter().any(|t| *t == property) {
                    return Err(RqlError::semantic(format!(
                        "aggregate target {} is used by more than one function",
                        property
                    )));
                }
                self.targets.push(property);
            }
            QueryNode::Aggregate { functions, .. } => {
                self.aggregate += 1;
                for function in functions {
                    self.visit(function, true)?;
                }
            }
            QueryNode::And(nodes) | QueryNode::Or(nodes) => {
                for child in nodes {
                    self.visit(child, grouped)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check(&self) -> Result<()> {
        let singletons = [
            (self.limit, Operation::Limit),
            (self.distinct, Operation::Distinct),
            (self.one, Operation::One),
            (self.first, Operation::First),
            (self.values, Operation::Values),
            (self.aggregate, Operation::Aggregate),
            (self.bare_count, Operation::Count),
        ];
        for (count, operation) in singletons {
            if count > 1 {
                return Err(RqlError::semantic(format!(
                    "only one {} clause is allowed",
                    operation
                )));
            }
        }

        if self.select > 0 && self.values > 0 {
            return Err(RqlError::semantic("select and values cannot be combined"));
        }
        if self.aggregate > 0 && self.ungrouped_functions > 0 {
            return Err(RqlError::semantic(
                "aggregate functions must be inside aggregate when aggregate is present",
            ));
        }
        if self.limit > 0 && (self.ungrouped_functions + self.aggregate + self.bare_count) > 0 {
            return Err(RqlError::semantic(
                "limit cannot be combined with count, sum, min, max, mean or aggregate",
            ));
        }
        Ok(())
    }
}

impl QueryNode {
    /// Checks cross-clause rules: singleton clauses, mutually exclusive
    /// clauses and aggregate conflicts.
    pub fn validate(&self) -> Result<()> {
        let mut census = Census::default();
        census.visit(self, false)?;
        trace!("validation census {:?}", census);
        census.check()
    }
}

/// Validates a freshly parsed tree, then folds repeated top-level select and
/// sort clauses into one each.
pub(super) fn finish(mut node: QueryNode, options: &ParseOptions) -> Result<QueryNode> {
    node.validate()?;
    if options.consolidate {
        node.consolidate(Operation::Select)?;
        node.consolidate(Operation::Sort)?;
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use crate::{ParseOptions, parse_with};

    fn error(text: &str) -> String {
        parse_with(text, &ParseOptions::utc()).unwrap_err().to_string()
    }

    #[test]
    fn test_singletons() {
        assert_eq!(error("limit(1)&limit(2)"), "invalid query: only one limit clause is allowed");
        assert_eq!(error("distinct()&distinct()"), "invalid query: only one distinct clause is allowed");
        assert_eq!(error("count()&count()"), "invalid query: only one count clause is allowed");
        assert_eq!(
            error("aggregate(A,count(),count())"),
            "invalid query: only one count clause is allowed"
        );
        assert_eq!(
            error("aggregate(A,count())&count()"),
            "invalid query: only one count clause is allowed"
        );
    }

    #[test]
    fn test_exclusive_clauses() {
        assert!(error("select(A)&values(B)").contains("select and values"));
        assert!(error("limit(1,10)&sum(Price)").contains("limit cannot be combined"));
        assert!(error("limit(10)&aggregate(A,count())").contains("limit cannot be combined"));
    }

    #[test]
    fn test_duplicate_targets() {
        assert!(error("aggregate(Category,sum(Price))&sum(Price)").contains("Price"));
        assert!(error("sum(price)&max(PRICE)").contains("more than one function"));
        assert!(parse_with("aggregate(Category,sum(Price),max(Cost),count())", &ParseOptions::utc()).is_ok());
    }
}
