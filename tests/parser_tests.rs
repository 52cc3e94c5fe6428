// tests/parser_tests.rs

use pretty_assertions::assert_eq;
use rql_lang::{
    AggregateOp, CompareOp, Limit, MatchOp, MembershipOp, Operation, ParseOptions, Property,
    QueryNode, RqlError, SortOrder, SortProperty, Value, parse_with,
};

fn parse(text: &str) -> QueryNode {
    parse_with(text, &ParseOptions::utc())
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", text, e))
}

fn parse_err(text: &str) -> RqlError {
    match parse_with(text, &ParseOptions::utc()) {
        Ok(node) => panic!("{:?} should not parse, got {:?}", text, node),
        Err(e) => e,
    }
}

fn eq(property: &str, value: impl Into<Value>) -> QueryNode {
    QueryNode::compare(CompareOp::Eq, property, value)
}

// ============================================================================
// Empty input and prefixes
// ============================================================================

#[test]
fn test_empty_query_is_noop() {
    assert_eq!(parse(""), QueryNode::Noop);
    assert_eq!(parse("?"), QueryNode::Noop);
    assert_eq!(parse("RQL="), QueryNode::Noop);
}

#[test]
fn test_prefixes_and_percent_decoding() {
    assert_eq!(parse("?rql=Name=John"), eq("Name", "John"));
    assert_eq!(parse("?Name=John"), eq("Name", "John"));
    assert_eq!(parse("Name=%22John%20Smith%22"), eq("Name", "John Smith"));
    assert_eq!(parse("%3FRQL%3DName%3DJohn"), eq("Name", "John"));
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_infix_and_functional_forms_agree() {
    let pairs = [
        ("Age=30", "eq(Age,30)"),
        ("Age!=30", "ne(Age,30)"),
        ("Age<30", "lt(Age,30)"),
        ("Age<=30", "le(Age,30)"),
        ("Age>30", "gt(Age,30)"),
        ("Age>=30", "ge(Age,30)"),
        ("Age=ge=30", "GE(Age,30)"),
    ];
    for (infix, functional) in pairs {
        assert_eq!(parse(infix), parse(functional), "{} vs {}", infix, functional);
    }
}

#[test]
fn test_typed_comparison() {
    assert_eq!(
        parse("Id=int8:-104"),
        QueryNode::compare(CompareOp::Eq, "Id", Value::I8(-104))
    );
    assert_eq!(
        parse("Price>=9.99m"),
        QueryNode::compare(
            CompareOp::Ge,
            "Price",
            Value::Decimal(rust_decimal::Decimal::new(999, 2))
        )
    );
}

#[test]
fn test_comparison_values() {
    assert_eq!(parse("Name=John"), eq("Name", "John"));
    assert_eq!(parse("Name=\"John Smith\""), eq("Name", "John Smith"));
    assert_eq!(parse("Name=null"), eq("Name", Value::Null));
    assert_eq!(parse("Active=true"), eq("Active", true));
    assert_eq!(parse("Path=a/b/c"), eq("Path", "a/b/c"));
    assert_eq!(parse("Code=-abc"), eq("Code", "-abc"));
    assert_eq!(parse("Code=-1abc"), eq("Code", "-1abc"));
    assert_eq!(parse("Code=+1-1"), eq("Code", "+1-1"));
}

#[test]
fn test_sort_direction_before_digit_word() {
    assert_eq!(
        parse("sort(-1abc,+2x)"),
        QueryNode::Sort(vec![SortProperty::descending("1abc"), SortProperty::ascending("2x")])
    );
}

#[test]
fn test_text_values_compare_case_insensitively() {
    assert_eq!(parse("Name=john"), eq("Name", "JOHN"));
    assert_ne!(parse("Name=john"), eq("Name", "jane"));
}

// ============================================================================
// Property paths
// ============================================================================

#[test]
fn test_property_spellings() {
    let expected = eq("Address.City", "Boston");
    assert_eq!(parse("Address.City=Boston"), expected);
    assert_eq!(parse("Address/City=Boston"), expected);
    assert_eq!(parse("(Address,City)=Boston"), expected);
    assert_eq!(parse("eq((Address,City),Boston)"), expected);
}

#[test]
fn test_compound_property_with_slashes() {
    let expected = eq("Order.Address.City", "Boston");
    assert_eq!(parse("(Order/Address,City)=Boston"), expected);
    assert_eq!(parse("(Order.Address,City)=Boston"), expected);
    assert_eq!(parse("(Order/Address/City)=Boston"), expected);
    assert_eq!(parse("(Items/0/Name=x)"), parse("Items/0/Name=x"));
}

#[test]
fn test_numeric_path_segment() {
    match parse("Items/0/Name=x") {
        QueryNode::Compare { property, .. } => {
            assert_eq!(property.segments(), &["Items", "0", "Name"]);
        }
        other => panic!("expected comparison, got {:?}", other),
    }
}

#[test]
fn test_properties_compare_case_insensitively() {
    assert_eq!(parse("NAME=x"), eq("name", "x"));
}

// ============================================================================
// Conjunction, disjunction and groups
// ============================================================================

#[test]
fn test_and_or_lists() {
    assert_eq!(
        parse("A=1&B=2&C=3"),
        QueryNode::And(vec![eq("A", 1), eq("B", 2), eq("C", 3)])
    );
    assert_eq!(parse("A=1|B=2"), QueryNode::Or(vec![eq("A", 1), eq("B", 2)]));
    assert_eq!(parse("and(A=1,B=2)"), parse("A=1&B=2"));
    assert_eq!(parse("or(eq(A,1),eq(B,2))"), parse("A=1|B=2"));
}

#[test]
fn test_groups() {
    assert_eq!(
        parse("(A=1|B=2)&C=3"),
        QueryNode::And(vec![QueryNode::Or(vec![eq("A", 1), eq("B", 2)]), eq("C", 3)])
    );
    assert_eq!(parse("((A=1))"), eq("A", 1));
}

#[test]
fn test_mixed_joiners_need_parentheses() {
    let err = parse_err("A=1&B=2|C=3");
    assert!(matches!(err, RqlError::Syntax { position: 7, .. }));
    assert!(err.to_string().contains("group mixed & and | with parentheses"));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_like_function() {
    assert_eq!(
        parse("Like(Lastname,T*)"),
        QueryNode::matching(MatchOp::Like, "Lastname", "T*")
    );
    assert_eq!(
        parse("like(Initial,'T')"),
        QueryNode::matching(MatchOp::Like, "Initial", Value::Char('T'))
    );
}

#[test]
fn test_contains_and_excludes() {
    assert_eq!(
        parse("contains(Tags,5)"),
        QueryNode::matching(MatchOp::Contains, "Tags", 5)
    );
    assert_eq!(
        parse("excludes(Tags,old)"),
        QueryNode::matching(MatchOp::Excludes, "Tags", "old")
    );
}

#[test]
fn test_membership() {
    assert_eq!(
        parse("in(Status,open,closed)"),
        QueryNode::membership(MembershipOp::In, "Status", vec!["open".into(), "closed".into()])
    );
    assert_eq!(
        parse("out(Id,1,2L)"),
        QueryNode::membership(MembershipOp::Out, "Id", vec![Value::I32(1), Value::I64(2)])
    );
}

#[test]
fn test_limit() {
    assert_eq!(parse("limit(1)"), QueryNode::Limit(Limit::new(1)));
    assert_eq!(parse("limit(50,25)"), QueryNode::Limit(Limit::page(50, 25)));
    assert_eq!(parse("limit(byte:5)"), QueryNode::Limit(Limit::new(5)));
}

#[test]
fn test_select_and_sort() {
    assert_eq!(
        parse("select(FirstName,LastName)"),
        QueryNode::Select(vec![Property::parse("FirstName"), Property::parse("LastName")])
    );
    assert_eq!(
        parse("sort(LastName,-FirstName)"),
        QueryNode::Sort(vec![
            SortProperty::new(SortOrder::Ascending, "LastName"),
            SortProperty::new(SortOrder::Descending, "FirstName"),
        ])
    );
    assert_eq!(parse("sort(+Age)"), QueryNode::Sort(vec![SortProperty::ascending("Age")]));
}

#[test]
fn test_shaping_singletons() {
    assert_eq!(parse("distinct()"), QueryNode::Distinct);
    assert_eq!(parse("first()"), QueryNode::First);
    assert_eq!(parse("one()"), QueryNode::One);
    assert_eq!(parse("values(Name)"), QueryNode::Values(Property::parse("Name")));
    assert_eq!(parse("count()"), QueryNode::Count(None));
    assert_eq!(parse("count(Name)"), QueryNode::Count(Some(Property::parse("Name"))));
}

#[test]
fn test_aggregate_functions() {
    assert_eq!(parse("sum(Price)"), QueryNode::function(AggregateOp::Sum, "Price"));
    assert_eq!(parse("min(Price)"), QueryNode::function(AggregateOp::Min, "Price"));
    assert_eq!(parse("max(Price)"), QueryNode::function(AggregateOp::Max, "Price"));
    assert_eq!(parse("mean(Price)"), QueryNode::function(AggregateOp::Mean, "Price"));
}

#[test]
fn test_aggregate() {
    let node = parse("aggregate(Category,Region,sum(Price),count())");
    assert_eq!(
        node,
        QueryNode::Aggregate {
            groups: vec![Property::parse("Category"), Property::parse("Region")],
            functions: vec![
                QueryNode::function(AggregateOp::Sum, "Price"),
                QueryNode::Count(None),
            ],
        }
    );
}

#[test]
fn test_reserved_words_as_properties() {
    assert_eq!(parse("count=5"), eq("count", 5));
    assert_eq!(parse("sort=asc&limit=10"), QueryNode::And(vec![eq("sort", "asc"), eq("limit", 10)]));
}

#[test]
fn test_full_query() {
    let node = parse("?Name=John&Age>30&select(Name,Age)&sort(-Age)&limit(0,25)");
    assert_eq!(node.operation(), Operation::And);
    assert_eq!(node.nodes().len(), 5);
    assert_eq!(node.nodes()[4], QueryNode::Limit(Limit::page(0, 25)));
}

// ============================================================================
// Consolidation at parse time
// ============================================================================

#[test]
fn test_repeated_select_and_sort_fold() {
    assert_eq!(
        parse("select(A)&select(B,A)"),
        QueryNode::Select(vec![Property::parse("A"), Property::parse("B")])
    );
    assert_eq!(
        parse("Name=x&sort(A)&sort(-B)"),
        QueryNode::And(vec![
            eq("Name", "x"),
            QueryNode::Sort(vec![SortProperty::ascending("A"), SortProperty::descending("B")]),
        ])
    );
}

#[test]
fn test_consolidation_can_be_disabled() {
    let options = ParseOptions::utc().with_consolidate(false);
    let node = parse_with("select(A)&select(B)", &options).unwrap();
    assert_eq!(node.find_all(Operation::Select).len(), 2);
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn test_unterminated_function_names_property() {
    let err = parse_err("like(");
    assert_eq!(
        err,
        RqlError::syntax(5, "unexpected end of input expecting PROPERTY")
    );
}

#[test]
fn test_missing_closing_paren() {
    assert_eq!(
        parse_err("select(A"),
        RqlError::syntax(8, "unexpected end of input expecting closing )")
    );
    assert_eq!(
        parse_err("(A=1"),
        RqlError::syntax(4, "unexpected end of input expecting closing )")
    );
}

#[test]
fn test_trailing_tokens() {
    assert_eq!(
        parse_err("Name=John)"),
        RqlError::syntax(9, "unexpected ')' expecting & or | or end of input")
    );
}

#[test]
fn test_missing_operator_or_value() {
    assert_eq!(
        parse_err("Name"),
        RqlError::syntax(4, "unexpected end of input expecting = != < <= > or >=")
    );
    assert_eq!(
        parse_err("Name="),
        RqlError::syntax(5, "unexpected end of input expecting VALUE")
    );
    assert_eq!(
        parse_err("=5"),
        RqlError::syntax(0, "unexpected '=' expecting PROPERTY")
    );
}

#[test]
fn test_argument_errors() {
    assert_eq!(parse_err("in(Id)"), RqlError::syntax(5, "unexpected ')' expecting ,"));
    assert_eq!(parse_err("select()"), RqlError::syntax(7, "unexpected ')' expecting PROPERTY"));
    assert!(parse_err("limit(-1)").to_string().contains("non-negative integer"));
    assert!(parse_err("limit(1.5)").to_string().contains("got double value"));
    assert!(parse_err("limit(1,2,3)").to_string().contains("expecting closing )"));
    assert!(parse_err("like(Name,5)").to_string().contains("like expects a string pattern"));
    assert!(parse_err("aggregate(sum(A),B)").to_string().contains("may not follow a function"));
    assert!(parse_err("aggregate(A,eq(B,1))").to_string().contains("expecting PROPERTY or an aggregate function"));
}

#[test]
fn test_lexical_errors_surface() {
    assert!(matches!(parse_err("Name=\"open"), RqlError::Lex { position: 5, .. }));
    assert!(matches!(parse_err("Id=byte:999"), RqlError::Lex { .. }));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_singleton_clauses() {
    for query in [
        "limit(1)&limit(2)",
        "distinct()&distinct()",
        "first()&first()",
        "one()&one()",
        "values(A)&values(B)",
        "count()&count()",
        "aggregate(A,count(),count())",
        "aggregate(A,sum(B))&aggregate(C,sum(D))",
    ] {
        assert!(
            matches!(parse_err(query), RqlError::Semantic(ref m) if m.starts_with("only one")),
            "{}",
            query
        );
    }
}

#[test]
fn test_exclusive_clauses() {
    assert_eq!(
        parse_err("select(A)&values(B)"),
        RqlError::semantic("select and values cannot be combined")
    );
    assert_eq!(
        parse_err("limit(1,10)&sum(Price)"),
        RqlError::semantic("limit cannot be combined with count, sum, min, max, mean or aggregate")
    );
    assert_eq!(
        parse_err("aggregate(Category,count())&max(Price)"),
        RqlError::semantic("aggregate functions must be inside aggregate when aggregate is present")
    );
}

#[test]
fn test_duplicate_aggregate_target() {
    assert_eq!(
        parse_err("aggregate(Category,sum(Price))&sum(Price)"),
        RqlError::semantic("aggregate target Price is used by more than one function")
    );
    assert!(parse_with("sum(Price)&max(Cost)&count()", &ParseOptions::utc()).is_ok());
}
