//! # RQL - Query Tree
//!
//! This module defines the tokens and the query tree of RQL, the resource
//! query language embedded in URL query strings to filter, sort, page,
//! project and aggregate a collection.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[property]** - Property paths and sort keys
//! - **[operators]** - Operation tags and operator families
//! - **[node]** - The query tree and its shape rules
//!
//! ## Quick Start
//!
//! ```text
//! ?Name=John&Age>30&select(Name,Age)&sort(-Age)&limit(0,25)
//! ```
//!
//! This query keeps people named John older than 30, projects two fields,
//! orders by descending age and returns the first page of 25.
//!
//! ## Core Concepts
//!
//! ### Conditional and non-conditional clauses
//!
//! Conditional clauses are boolean predicates (`eq`, `lt`, `like`, `in`,
//! `and`, `or`, ...). Non-conditional clauses shape the response (`select`,
//! `sort`, `limit`, `distinct`, `first`, `one`, `values`, the aggregate
//! functions and `aggregate`).
//!
//! ### Two surface syntaxes
//!
//! Every clause has a functional form (`eq(Name,John)`), and comparisons plus
//! conjunctions also have an infix form (`Name=John&Age>30`). Both compile to
//! the same tree.
//!
//! ### Typed literals
//!
//! Values keep the type they were written with: `Id=5` is an int32,
//! `Id=5L` an int64, `Id=int8:-104` an int8, `Price=9.99m` a decimal.
//!
//! ## Examples
//!
//! ### Grouping
//!
//! ```text
//! (Status=open|Status=pending)&Owner=me
//! ```
//!
//! ### Aggregation
//!
//! ```text
//! aggregate(Category,sum(Price),count())
//! ```
pub mod node;
pub mod operators;
pub mod property;
pub mod tokens;

pub use node::{Child, Limit, QueryNode};
pub use operators::{AggregateOp, CompareOp, MatchOp, MembershipOp, Operation};
pub use property::{Property, SortOrder, SortProperty};
pub use tokens::{Function, Symbol, Token};
