//! Label and annotation selector expressions.
//!
//! The syntax is the Kubernetes label selector string: a comma-separated
//! conjunction of requirements, each one of
//!
//! - `key=value` or `key==value`
//! - `key!=value` (also matches when the key is absent)
//! - `key in (a,b)` and `key notin (a,b)`
//! - `key` (key exists) and `!key` (key does not exist)

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Requirement is a single constraint on one key of a string map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

impl Requirement {
    pub fn matches(&self, map: &BTreeMap<&str, &str>) -> bool {
        let value = map.get(self.key.as_str()).copied();
        match self.operator {
            Operator::Equals | Operator::In => {
                value.map_or(false, |v| self.values.iter().any(|want| want == v))
            }
            Operator::NotEquals | Operator::NotIn => {
                value.map_or(true, |v| self.values.iter().all(|want| want != v))
            }
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, self.values.join("")),
            Operator::NotEquals => write!(f, "{}!={}", self.key, self.values.join("")),
            Operator::In => write!(f, "{} in ({})", self.key, self.values.join(",")),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, self.values.join(",")),
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

/// Requirements is a conjunction; an empty set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    requirements: Vec<Requirement>,
}

impl Requirements {
    /// Parses a selector expression. The empty string parses to an empty set.
    pub fn parse(expr: &str) -> Result<Self> {
        let mut requirements = Vec::new();
        if expr.trim().is_empty() {
            return Ok(Requirements { requirements });
        }
        for term in split_terms(expr)? {
            requirements.push(parse_term(term.trim(), expr)?);
        }
        Ok(Requirements { requirements })
    }

    pub fn matches(&self, map: &BTreeMap<&str, &str>) -> bool {
        self.requirements.iter().all(|r| r.matches(map))
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }
}

/// Splits on commas outside of parentheses.
fn split_terms(expr: &str) -> Result<Vec<&str>> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid(expr, "unbalanced parentheses"))?;
            }
            ',' if depth == 0 => {
                terms.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid(expr, "unbalanced parentheses"));
    }
    terms.push(&expr[start..]);
    Ok(terms)
}

fn parse_term(term: &str, expr: &str) -> Result<Requirement> {
    if term.is_empty() {
        return Err(invalid(expr, "empty requirement"));
    }

    if let Some(key) = term.strip_prefix('!') {
        return requirement(key.trim(), Operator::DoesNotExist, Vec::new(), expr);
    }

    if let Some(open) = term.find('(') {
        let mut head = term[..open].split_whitespace();
        let (key, op) = match (head.next(), head.next(), head.next()) {
            (Some(key), Some(op), None) => (key, op),
            _ => return Err(invalid(expr, format!("malformed set requirement {:?}", term))),
        };
        let operator = match op {
            "in" => Operator::In,
            "notin" => Operator::NotIn,
            other => return Err(invalid(expr, format!("unknown operator {:?}", other))),
        };
        let body = term[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| invalid(expr, format!("malformed set requirement {:?}", term)))?;
        let values: Vec<String> = body.split(',').map(|v| v.trim().to_string()).collect();
        if values.iter().any(|v| !valid_value(v)) {
            return Err(invalid(expr, format!("invalid value in {:?}", term)));
        }
        return requirement(key, operator, values, expr);
    }

    let (key, operator, value) = if let Some((k, v)) = term.split_once("!=") {
        (k, Operator::NotEquals, Some(v))
    } else if let Some((k, v)) = term.split_once("==") {
        (k, Operator::Equals, Some(v))
    } else if let Some((k, v)) = term.split_once('=') {
        (k, Operator::Equals, Some(v))
    } else {
        (term, Operator::Exists, None)
    };

    let values = match value {
        Some(v) => {
            let v = v.trim();
            if !valid_value(v) {
                return Err(invalid(expr, format!("invalid value {:?}", v)));
            }
            vec![v.to_string()]
        }
        None => Vec::new(),
    };
    requirement(key.trim(), operator, values, expr)
}

fn requirement(
    key: &str,
    operator: Operator,
    values: Vec<String>,
    expr: &str,
) -> Result<Requirement> {
    if key.is_empty() || key.contains(|c: char| c.is_whitespace() || "!=(),".contains(c)) {
        return Err(invalid(expr, format!("invalid key {:?}", key)));
    }
    Ok(Requirement {
        key: key.to_string(),
        operator,
        values,
    })
}

fn valid_value(value: &str) -> bool {
    !value.contains(|c: char| c.is_whitespace() || "!=(),".contains(c))
}

fn invalid(expr: &str, message: impl fmt::Display) -> Error {
    Error::invalid_selector(format!("{:?}: {}", expr, message))
}
