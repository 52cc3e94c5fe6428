//! Checks property paths in a query against a declared member list.

use regex::Regex;

use crate::{
    ast::{Property, QueryNode},
    error::{Result, RqlError},
};

const MEMBER_PATH: &str = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$";

/// Member paths a query may reference, e.g. the fields of a resource type.
///
/// Declaring `Address.City` also admits `Address`. A path that continues
/// past a declared leaf, such as `Id.Value` when only `Id` is declared, is
/// unknown.
#[derive(Debug, Clone, Default)]
pub struct MemberSet {
    members: Vec<Property>,
}

impl MemberSet {
    pub fn from_paths<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pattern = Regex::new(MEMBER_PATH)
            .map_err(|e| RqlError::semantic(format!("invalid member pattern: {e}")))?;
        let mut members = Vec::new();
        for path in paths {
            let path = path.as_ref().trim();
            if !pattern.is_match(path) {
                return Err(RqlError::semantic(format!("invalid member path '{}'", path)));
            }
            members.push(Property::parse(path));
        }
        Ok(MemberSet { members })
    }

    pub fn is_valid(&self, path: &Property) -> bool {
        self.members.iter().any(|member| member.starts_with(path, false))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl QueryNode {
    /// Fails with the first property path, in pre-order, that `members` does
    /// not declare.
    pub fn validate_members(&self, members: &MemberSet) -> Result<()> {
        if let Some(unknown) = self.properties().into_iter().find(|p| !members.is_valid(p)) {
            return Err(RqlError::semantic(format!("unknown member '{}'", unknown)));
        }
        self.nodes()
            .iter()
            .try_for_each(|child| child.validate_members(members))
    }
}
