use std::fmt;

/// Tag of a query node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Noop,
    Limit,
    Select,
    Sort,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    Contains,
    Excludes,
    In,
    Out,
    Distinct,
    First,
    One,
    Count,
    Values,
    Sum,
    Min,
    Max,
    Mean,
    Aggregate,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        use Operation::*;
        match self {
            Noop => "noop",
            Limit => "limit",
            Select => "select",
            Sort => "sort",
            And => "and",
            Or => "or",
            Eq => "eq",
            Ne => "ne",
            Lt => "lt",
            Le => "le",
            Gt => "gt",
            Ge => "ge",
            Like => "like",
            Contains => "contains",
            Excludes => "excludes",
            In => "in",
            Out => "out",
            Distinct => "distinct",
            First => "first",
            One => "one",
            Count => "count",
            Values => "values",
            Sum => "sum",
            Min => "min",
            Max => "max",
            Mean => "mean",
            Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal (`=`, `eq`)
    Eq,
    /// Not equal (`!=`, `ne`)
    Ne,
    /// Less than (`<`, `lt`)
    Lt,
    /// Less than or equal (`<=`, `le`)
    Le,
    /// Greater than (`>`, `gt`)
    Gt,
    /// Greater than or equal (`>=`, `ge`)
    Ge,
}

impl CompareOp {
    /// Infix spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            CompareOp::Eq => Operation::Eq,
            CompareOp::Ne => Operation::Ne,
            CompareOp::Lt => Operation::Lt,
            CompareOp::Le => Operation::Le,
            CompareOp::Gt => Operation::Gt,
            CompareOp::Ge => Operation::Ge,
        }
    }
}

/// Pattern operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOp {
    /// Wildcard match (`like(Name,"T*")`)
    Like,
    Contains,
    Excludes,
}

impl MatchOp {
    pub fn operation(&self) -> Operation {
        match self {
            MatchOp::Like => Operation::Like,
            MatchOp::Contains => Operation::Contains,
            MatchOp::Excludes => Operation::Excludes,
        }
    }
}

/// Set membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipOp {
    In,
    Out,
}

impl MembershipOp {
    pub fn operation(&self) -> Operation {
        match self {
            MembershipOp::In => Operation::In,
            MembershipOp::Out => Operation::Out,
        }
    }
}

/// Aggregate functions over one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    Sum,
    Min,
    Max,
    Mean,
}

impl AggregateOp {
    pub fn operation(&self) -> Operation {
        match self {
            AggregateOp::Sum => Operation::Sum,
            AggregateOp::Min => Operation::Min,
            AggregateOp::Max => Operation::Max,
            AggregateOp::Mean => Operation::Mean,
        }
    }
}
