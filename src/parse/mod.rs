//! Parser for the textual rule-set format.
//!
//! One rule per line, round-trippable with the `Display` of
//! [`RuleSet`][crate::rule::RuleSet]:
//!
//! ```text
//! (outlook = sunny) and (humidity <= 70) => [1]
//! (outlook = rainy and windy = true) => [0]
//! => [2]
//! ```
//!
//! Whitespace around tokens is insignificant and the two parenthesization
//! styles above are both accepted. A left-hand side without conditions is a
//! default rule. Attribute names are resolved by exact match against the
//! target dataset, discrete values against the attribute's domain, continuous
//! values parse as numbers and the class index must be within the class
//! domain. Anything else is a fatal parse error.

use crate::common::*;
use crate::data::Instances;
use crate::rule::{Antecedent, ContinuousAntd, DiscreteAntd, Rule, RuleSet};

/// Operators of the condition grammar, longest first so that `<=`, `>=` and
/// `!=` win over `=`.
const OPS: [&str; 4] = ["!=", "<=", ">=", "="];

/// Parses a rule set against a dataset header.
pub fn rules(src: &str, data: &Instances) -> Res<RuleSet> {
    let mut rules = Vec::new();
    for (offset, line) in src.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rules.push(rule(line, offset + 1, data)?)
    }
    Ok(RuleSet::new(rules))
}

/// Parses one rule line.
fn rule(line: &str, line_no: usize, data: &Instances) -> Res<Rule> {
    let (lhs, rhs) = match line.split_once("=>") {
        Some(pair) => pair,
        None => bail!(err("expected `=>` in rule", line.trim(), line_no)),
    };

    let consequent = consequent(rhs, line_no, data)?;
    let mut antecedents = Vec::new();
    for cond in conditions(lhs, line_no)? {
        antecedents.push(antecedent(&cond, line_no, data)?)
    }
    Ok(Rule::with_antecedents(consequent, antecedents))
}

/// Parses the `[class]` right-hand side of a rule.
fn consequent(rhs: &str, line_no: usize, data: &Instances) -> Res<ClsIdx> {
    let rhs = rhs.trim();
    let inner = match rhs.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => inner.trim(),
        None => bail!(err("expected a bracketed class index", rhs, line_no)),
    };
    let class = match inner.parse::<usize>() {
        Ok(class) => class,
        Err(_) => bail!(err("expected a non-negative class index", inner, line_no)),
    };
    if class >= data.num_classes() {
        bail!(err(
            format!(
                "class index out of range, the dataset has {} classes",
                data.num_classes()
            ),
            inner,
            line_no
        ))
    }
    Ok(class.into())
}

/// Splits the left-hand side of a rule into condition strings.
///
/// Accepts conditions individually parenthesized, grouped under a single pair
/// of parentheses, or bare, joined by the keyword `and`. Runs of whitespace
/// are collapsed first, so names and labels may contain single spaces.
fn conditions(lhs: &str, line_no: usize) -> Res<Vec<String>> {
    let flat: String = lhs
        .chars()
        .map(|c| if c == '(' || c == ')' { ' ' } else { c })
        .collect();
    let flat = flat.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return Ok(Vec::new());
    }

    let mut conds = Vec::new();
    for cond in flat.split(" and ") {
        let cond = cond.trim();
        if cond.is_empty() {
            bail!(err("empty condition", lhs.trim(), line_no))
        }
        conds.push(cond.to_string())
    }
    Ok(conds)
}

/// Parses one `name op value` condition against the dataset header.
fn antecedent(cond: &str, line_no: usize, data: &Instances) -> Res<Antecedent> {
    let (at, op) = match OPS
        .iter()
        .filter_map(|op| cond.find(*op).map(|at| (at, *op)))
        .min_by_key(|&(at, op)| (at, ::std::cmp::Reverse(op.len())))
    {
        Some(found) => found,
        None => bail!(err("expected an operator in condition", cond, line_no)),
    };
    let name = cond[..at].trim();
    let value = cond[at + op.len()..].trim();
    if name.is_empty() {
        bail!(err("missing attribute name in condition", cond, line_no))
    }
    if value.is_empty() {
        bail!(err("missing value in condition", cond, line_no))
    }

    let attr = match data.attr_by_name(name) {
        Some(attr) => attr,
        None => bail!(err("unknown attribute", name, line_no)),
    };

    match (attr.is_discrete(), op) {
        (true, "=") | (true, "!=") => {
            let val = match attr.index_of(value) {
                Some(val) => val,
                None => bail!(err(
                    format!("unknown value for discrete attribute `{}`", name),
                    value,
                    line_no
                )),
            };
            Ok(Antecedent::Discrete(DiscreteAntd::with_value(
                attr.clone(),
                val,
                op == "!=",
            )))
        }
        (false, "<=") | (false, ">=") => {
            let threshold = match value.parse::<f64>() {
                Ok(threshold) => threshold,
                Err(_) => bail!(err(
                    format!("expected a number for continuous attribute `{}`", name),
                    value,
                    line_no
                )),
            };
            let dir = if op == "<=" { 0 } else { 1 };
            Ok(Antecedent::Continuous(ContinuousAntd::with_threshold(
                attr.clone(),
                dir,
                threshold,
            )))
        }
        (true, _) => bail!(err(
            format!("threshold test on discrete attribute `{}`", name),
            op,
            line_no
        )),
        (false, _) => bail!(err(
            format!("equality test on continuous attribute `{}`", name),
            op,
            line_no
        )),
    }
}

/// Parse error constructor.
fn err<S1, S2>(msg: S1, token: S2, line: usize) -> Error
where
    S1: Into<String>,
    S2: Into<String>,
{
    ErrorKind::Parse(ParseErrorData::new(msg, token, line)).into()
}
