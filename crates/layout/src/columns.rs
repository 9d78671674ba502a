// Column width tokens
//
// A table's widths are stored as comma-joined `name:width` tokens in
// depth-first order. Anonymous leaves store an empty name (`:40.0`);
// anonymous group headers store nothing, but their children do.
//
// Restoring matches named tokens by name and hands the anonymous widths,
// in order, to the anonymous leaves. Reordering anonymous columns between
// save and restore therefore mismatches their widths.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::error::{LayoutError, Result};
use crate::tree::non_blank;

/// A table column, possibly grouping sub-columns under a shared header
pub trait ColumnNode {
    fn id(&self) -> Option<&str>;

    fn width(&self) -> f64;

    /// Preferred width, applied on restore
    fn set_width(&mut self, width: f64);

    fn sub_columns(&self) -> Vec<&dyn ColumnNode>;

    fn sub_columns_mut(&mut self) -> Vec<&mut dyn ColumnNode>;

    fn is_leaf(&self) -> bool {
        self.sub_columns().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnWidthToken {
    /// Empty for anonymous columns
    pub name: String,
    pub width: f64,
}

impl ColumnWidthToken {
    pub fn new(name: impl Into<String>, width: f64) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl fmt::Display for ColumnWidthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.name, self.width)
    }
}

impl FromStr for ColumnWidthToken {
    type Err = LayoutError;

    fn from_str(token: &str) -> Result<Self> {
        let (name, width) = token
            .rsplit_once(':')
            .ok_or_else(|| LayoutError::MalformedToken {
                token: token.to_string(),
            })?;
        let width = parse_number(width)?;
        Ok(Self::new(name.trim(), width))
    }
}

pub(crate) fn parse_number(value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| LayoutError::InvalidNumber {
            value: value.to_string(),
        })
}

/// Tokens for a column list, depth-first
pub fn collect_tokens(columns: &[&dyn ColumnNode]) -> Vec<ColumnWidthToken> {
    let mut tokens = Vec::new();
    collect_into(columns, &mut tokens);
    tokens
}

// Column ids are matched trimmed, the same way tokens parse back
fn column_name(column: &dyn ColumnNode) -> Option<&str> {
    non_blank(column.id()).map(str::trim)
}

fn collect_into(columns: &[&dyn ColumnNode], tokens: &mut Vec<ColumnWidthToken>) {
    for column in columns {
        let subs = column.sub_columns();
        if !subs.is_empty() {
            collect_into(&subs, tokens);
            if column_name(*column).is_none() {
                continue;
            }
        }
        let name = column_name(*column).unwrap_or("");
        tokens.push(ColumnWidthToken::new(name, column.width()));
    }
}

pub fn format_tokens(tokens: &[ColumnWidthToken]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a stored token list. Blank input is an empty list.
pub fn parse_tokens(value: &str) -> Result<Vec<ColumnWidthToken>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value.split(',').map(str::parse).collect()
}

/// Applies saved widths back onto a live column list
#[derive(Debug, Default)]
pub struct ColumnWidthReconciler {
    named: HashMap<String, f64>,
    anonymous: VecDeque<f64>,
}

impl ColumnWidthReconciler {
    pub fn new(tokens: impl IntoIterator<Item = ColumnWidthToken>) -> Self {
        let mut reconciler = Self::default();
        for token in tokens {
            if token.is_anonymous() {
                reconciler.anonymous.push_back(token.width);
            } else {
                reconciler.named.insert(token.name, token.width);
            }
        }
        reconciler
    }

    /// Set the width of every column that has a saved value. Returns how many were set.
    ///
    /// Named columns look up their own width; anonymous leaves take the next
    /// anonymous width while any remain. Anonymous groups never take one.
    pub fn apply(&mut self, columns: Vec<&mut dyn ColumnNode>) -> usize {
        let mut applied = 0;
        for column in columns {
            let width = match column_name(&*column) {
                Some(name) => self.named.get(name).copied(),
                None if column.is_leaf() => self.anonymous.pop_front(),
                None => None,
            };
            if let Some(width) = width {
                column.set_width(width);
                applied += 1;
            }
            applied += self.apply(column.sub_columns_mut());
        }
        applied
    }

    /// Anonymous widths not yet handed out
    pub fn remaining_anonymous(&self) -> usize {
        self.anonymous.len()
    }
}
