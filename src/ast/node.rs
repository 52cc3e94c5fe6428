use crate::{
    ast::{AggregateOp, CompareOp, MatchOp, MembershipOp, Operation, Property, SortProperty},
    error::{Result, RqlError},
    value::Value,
};

/// Paging clause: `limit(count)` or `limit(start,count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub start: Option<u64>,
    pub count: u64,
}

impl Limit {
    pub fn new(count: u64) -> Self {
        Limit { start: None, count }
    }

    pub fn page(start: u64, count: u64) -> Self {
        Limit {
            start: Some(start),
            count,
        }
    }
}

/// A compiled RQL query tree.
///
/// Each variant carries exactly the children its operation accepts, in
/// order: a comparison is one property and one value, a selection is a list
/// of properties, a conjunction is a list of nodes.
///
/// # Examples
///
/// ```text
/// Like(Lastname,T*)          -> Match { Like, Lastname, "T*" }
/// select(FirstName,LastName) -> Select [FirstName, LastName]
/// Name=John&Age>30           -> And [Compare(Eq), Compare(Gt)]
/// ```
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// Empty query
    Noop,

    Limit(Limit),

    /// Projection (`select(A,B)`)
    Select(Vec<Property>),

    /// Ordering (`sort(+A,-B)`)
    Sort(Vec<SortProperty>),

    And(Vec<QueryNode>),

    Or(Vec<QueryNode>),

    /// `eq ne lt le gt ge`
    Compare {
        op: CompareOp,
        property: Property,
        value: Value,
    },

    /// `like contains excludes`
    Match {
        op: MatchOp,
        property: Property,
        pattern: Value,
    },

    /// `in out`
    Membership {
        op: MembershipOp,
        property: Property,
        values: Vec<Value>,
    },

    Distinct,
    First,
    One,

    /// `count()` or `count(property)`
    Count(Option<Property>),

    /// `values(property)`
    Values(Property),

    /// `sum min max mean`
    Function { op: AggregateOp, property: Property },

    /// Grouping properties followed by the aggregate functions applied per group
    ///
    /// # Example
    /// ```text
    /// aggregate(Category,sum(Price),count())
    /// ```
    Aggregate {
        groups: Vec<Property>,
        functions: Vec<QueryNode>,
    },
}

/// Anything that can be appended to a node with [`QueryNode::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(QueryNode),
    Property(Property),
    Sort(SortProperty),
    Value(Value),
}

impl Child {
    fn describe(&self) -> String {
        match self {
            Child::Node(node) => format!("{} node", node.operation()),
            Child::Property(p) => format!("property {}", p),
            Child::Sort(s) => format!("sort property {}", s.property),
            Child::Value(v) => format!("{} value", v.type_name()),
        }
    }
}

impl From<QueryNode> for Child {
    fn from(node: QueryNode) -> Self {
        Child::Node(node)
    }
}

impl From<Property> for Child {
    fn from(property: Property) -> Self {
        Child::Property(property)
    }
}

impl From<SortProperty> for Child {
    fn from(sort: SortProperty) -> Self {
        Child::Sort(sort)
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        Child::Value(value)
    }
}

impl QueryNode {
    pub fn compare(op: CompareOp, property: impl Into<Property>, value: impl Into<Value>) -> Self {
        QueryNode::Compare {
            op,
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn matching(op: MatchOp, property: impl Into<Property>, pattern: impl Into<Value>) -> Self {
        QueryNode::Match {
            op,
            property: property.into(),
            pattern: pattern.into(),
        }
    }

    pub fn membership(op: MembershipOp, property: impl Into<Property>, values: Vec<Value>) -> Self {
        QueryNode::Membership {
            op,
            property: property.into(),
            values,
        }
    }

    pub fn function(op: AggregateOp, property: impl Into<Property>) -> Self {
        QueryNode::Function {
            op,
            property: property.into(),
        }
    }

    /// Builds an aggregate, checking that every function is an aggregate leaf.
    pub fn aggregate(groups: Vec<Property>, functions: Vec<QueryNode>) -> Result<Self> {
        let mut node = QueryNode::Aggregate {
            groups,
            functions: Vec::with_capacity(functions.len()),
        };
        for function in functions {
            node.add(Child::Node(function))?;
        }
        Ok(node)
    }

    pub fn operation(&self) -> Operation {
        match self {
            QueryNode::Noop => Operation::Noop,
            QueryNode::Limit(_) => Operation::Limit,
            QueryNode::Select(_) => Operation::Select,
            QueryNode::Sort(_) => Operation::Sort,
            QueryNode::And(_) => Operation::And,
            QueryNode::Or(_) => Operation::Or,
            QueryNode::Compare { op, .. } => op.operation(),
            QueryNode::Match { op, .. } => op.operation(),
            QueryNode::Membership { op, .. } => op.operation(),
            QueryNode::Distinct => Operation::Distinct,
            QueryNode::First => Operation::First,
            QueryNode::One => Operation::One,
            QueryNode::Count(_) => Operation::Count,
            QueryNode::Values(_) => Operation::Values,
            QueryNode::Function { op, .. } => op.operation(),
            QueryNode::Aggregate { .. } => Operation::Aggregate,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, QueryNode::Noop)
    }

    /// Boolean predicates, as opposed to shaping and paging clauses.
    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            QueryNode::And(_)
                | QueryNode::Or(_)
                | QueryNode::Compare { .. }
                | QueryNode::Match { .. }
                | QueryNode::Membership { .. }
        )
    }

    /// `sum min max mean` and `count(property)`.
    pub fn is_aggregate_leaf(&self) -> bool {
        matches!(self, QueryNode::Function { .. } | QueryNode::Count(Some(_)))
    }

    /// Nested child nodes, in order.
    pub fn nodes(&self) -> &[QueryNode] {
        match self {
            QueryNode::And(nodes) | QueryNode::Or(nodes) => nodes,
            QueryNode::Aggregate { functions, .. } => functions,
            _ => &[],
        }
    }

    pub(crate) fn nodes_mut(&mut self) -> Option<&mut Vec<QueryNode>> {
        match self {
            QueryNode::And(nodes) | QueryNode::Or(nodes) => Some(nodes),
            QueryNode::Aggregate { functions, .. } => Some(functions),
            _ => None,
        }
    }

    /// Ordered children as they would be appended with [`QueryNode::add`].
    pub fn children(&self) -> Vec<Child> {
        match self {
            QueryNode::Noop | QueryNode::Distinct | QueryNode::First | QueryNode::One => Vec::new(),
            QueryNode::Limit(limit) => {
                let mut values: Vec<Child> = limit.start.map(Value::U64).into_iter().map(Child::Value).collect();
                values.push(Child::Value(Value::U64(limit.count)));
                values
            }
            QueryNode::Select(properties) => properties.iter().cloned().map(Child::Property).collect(),
            QueryNode::Sort(keys) => keys.iter().cloned().map(Child::Sort).collect(),
            QueryNode::And(nodes) | QueryNode::Or(nodes) => nodes.iter().cloned().map(Child::Node).collect(),
            QueryNode::Compare { property, value, .. } => {
                vec![Child::Property(property.clone()), Child::Value(value.clone())]
            }
            QueryNode::Match { property, pattern, .. } => {
                vec![Child::Property(property.clone()), Child::Value(pattern.clone())]
            }
            QueryNode::Membership { property, values, .. } => std::iter::once(Child::Property(property.clone()))
                .chain(values.iter().cloned().map(Child::Value))
                .collect(),
            QueryNode::Count(property) => property.iter().cloned().map(Child::Property).collect(),
            QueryNode::Values(property) | QueryNode::Function { property, .. } => {
                vec![Child::Property(property.clone())]
            }
            QueryNode::Aggregate { groups, functions } => groups
                .iter()
                .cloned()
                .map(Child::Property)
                .chain(functions.iter().cloned().map(Child::Node))
                .collect(),
        }
    }

    /// Properties held directly by this node, not by nested nodes.
    pub fn properties(&self) -> Vec<&Property> {
        match self {
            QueryNode::Select(properties) => properties.iter().collect(),
            QueryNode::Sort(keys) => keys.iter().map(|k| &k.property).collect(),
            QueryNode::Compare { property, .. }
            | QueryNode::Match { property, .. }
            | QueryNode::Membership { property, .. }
            | QueryNode::Values(property)
            | QueryNode::Function { property, .. }
            | QueryNode::Count(Some(property)) => vec![property],
            QueryNode::Aggregate { groups, .. } => groups.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Appends a child, enforcing the node's shape.
    pub fn add(&mut self, child: impl Into<Child>) -> Result<()> {
        let child = child.into();
        let operation = self.operation();
        match (self, child) {
            (QueryNode::Select(properties), Child::Property(p)) => properties.push(p),
            (QueryNode::Sort(keys), Child::Sort(key)) => keys.push(key),
            (QueryNode::And(nodes) | QueryNode::Or(nodes), Child::Node(node)) => nodes.push(node),
            (QueryNode::Membership { values, .. }, Child::Value(v)) => values.push(v),
            (QueryNode::Count(target @ None), Child::Property(p)) => *target = Some(p),
            (QueryNode::Count(Some(_)), Child::Property(_)) => {
                return Err(RqlError::shape("count accepts at most one property"));
            }
            (QueryNode::Limit(limit), Child::Value(v)) => {
                if limit.start.is_some() {
                    return Err(RqlError::shape("limit accepts at most two values"));
                }
                let n = limit_argument(&v)?;
                *limit = Limit::page(limit.count, n);
            }
            (QueryNode::Aggregate { groups, functions }, Child::Property(p)) => {
                if !functions.is_empty() {
                    return Err(RqlError::shape(format!(
                        "aggregate property {} may not follow a function",
                        p
                    )));
                }
                groups.push(p);
            }
            (QueryNode::Aggregate { functions, .. }, Child::Node(node)) => {
                if !matches!(node, QueryNode::Function { .. } | QueryNode::Count(_)) {
                    return Err(RqlError::shape(format!(
                        "aggregate accepts only sum, min, max, mean or count, not {}",
                        node.operation()
                    )));
                }
                functions.push(node);
            }
            (
                QueryNode::Compare { .. } | QueryNode::Match { .. },
                child,
            ) => {
                return Err(RqlError::shape(format!(
                    "{} already has its property and value, cannot add {}",
                    operation,
                    child.describe()
                )));
            }
            (_, child) => {
                return Err(RqlError::shape(format!(
                    "{} does not accept a {}",
                    operation,
                    child.describe()
                )));
            }
        }
        Ok(())
    }

    /// Replaces this node with a deep copy of `other`.
    pub fn copy_from(&mut self, other: &QueryNode) {
        *self = other.clone();
    }
}

/// Validates a `limit` argument and narrows it to u64.
pub(crate) fn limit_argument(value: &Value) -> Result<u64> {
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| {
            RqlError::shape(format!(
                "limit expects a non-negative integer, got {} value",
                value.type_name()
            ))
        })
}

impl PartialEq for QueryNode {
    fn eq(&self, other: &Self) -> bool {
        use QueryNode::*;
        match (self, other) {
            (Noop, Noop) | (Distinct, Distinct) | (First, First) | (One, One) => true,
            (QueryNode::Limit(a), QueryNode::Limit(b)) => a == b,
            (Select(a), Select(b)) => a == b,
            (Sort(a), Sort(b)) => a == b,
            (And(a), And(b)) | (Or(a), Or(b)) => a == b,
            (
                Compare {
                    op: o1,
                    property: p1,
                    value: v1,
                },
                Compare {
                    op: o2,
                    property: p2,
                    value: v2,
                },
            ) => o1 == o2 && p1 == p2 && v1.eq_ignore_case(v2),
            (
                Match {
                    op: o1,
                    property: p1,
                    pattern: v1,
                },
                Match {
                    op: o2,
                    property: p2,
                    pattern: v2,
                },
            ) => o1 == o2 && p1 == p2 && v1.eq_ignore_case(v2),
            (
                Membership {
                    op: o1,
                    property: p1,
                    values: v1,
                },
                Membership {
                    op: o2,
                    property: p2,
                    values: v2,
                },
            ) => {
                o1 == o2
                    && p1 == p2
                    && v1.len() == v2.len()
                    && v1.iter().zip(v2).all(|(a, b)| a.eq_ignore_case(b))
            }
            (Count(a), Count(b)) => a == b,
            (Values(a), Values(b)) => a == b,
            (Function { op: o1, property: p1 }, Function { op: o2, property: p2 }) => {
                o1 == o2 && p1 == p2
            }
            (
                Aggregate {
                    groups: g1,
                    functions: f1,
                },
                Aggregate {
                    groups: g2,
                    functions: f2,
                },
            ) => g1 == g2 && f1 == f2,
            _ => false,
        }
    }
}
