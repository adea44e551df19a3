// In-process evaluation of a Filter against JSON rows, used by the memory store.
// Semantics follow the SQL rendering in filter_where.rs.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::filter::Filter;
use super::types::{Condition, FilterOp, FilterWhereInfo, SortDirection};

impl Condition {
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        match self {
            Condition::Field(info) => field_matches(info, row),
            Condition::And(inner) => inner.iter().all(|c| c.matches(row)),
            Condition::Or(inner) => inner.iter().any(|c| c.matches(row)),
            Condition::Not(inner) => !inner.matches(row),
        }
    }
}

impl Filter {
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Filter, order and page a set of rows
    pub fn apply<'a, I>(&self, rows: I) -> Vec<Map<String, Value>>
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let mut selected: Vec<Map<String, Value>> = rows.into_iter().filter(|r| self.matches(r)).cloned().collect();

        let order = self.effective_order();
        selected.sort_by(|a, b| {
            for info in &order {
                let ord = compare_values(a.get(&info.column), b.get(&info.column));
                let ord = match info.sort {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let iter = selected.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit.max(0) as usize).collect(),
            None => iter.collect(),
        }
    }

    pub fn count<'a, I>(&self, rows: I) -> i64
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        rows.into_iter().filter(|r| self.matches(r)).count() as i64
    }
}

fn field_matches(info: &FilterWhereInfo, row: &Map<String, Value>) -> bool {
    let actual = row.get(&info.column).unwrap_or(&Value::Null);
    match info.operator {
        FilterOp::Eq => values_equal(actual, &info.data),
        FilterOp::Neq => !values_equal(actual, &info.data),
        // SQL comparisons against NULL are never true
        FilterOp::Gt => !actual.is_null() && compare_values(Some(actual), Some(&info.data)) == Ordering::Greater,
        FilterOp::Gte => !actual.is_null() && compare_values(Some(actual), Some(&info.data)) != Ordering::Less,
        FilterOp::Lt => !actual.is_null() && compare_values(Some(actual), Some(&info.data)) == Ordering::Less,
        FilterOp::Lte => !actual.is_null() && compare_values(Some(actual), Some(&info.data)) != Ordering::Greater,
        FilterOp::Like => like_matches(actual, &info.data, false),
        FilterOp::ILike => like_matches(actual, &info.data, true),
        FilterOp::In => match &info.data {
            Value::Array(values) => values.iter().any(|v| values_equal(actual, v)),
            other => values_equal(actual, other),
        },
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        // Numeric columns may be stored as strings (decimals) and compared with numbers
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.parse::<f64>().ok() == n.as_f64()
        }
        _ => a == b,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        // Postgres sorts NULLs last in ascending order
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().unwrap_or(0.0).partial_cmp(&y.as_f64().unwrap_or(0.0)).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => {
            if let (Ok(dx), Ok(dy)) = (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                return dx.cmp(&dy);
            }
            if let (Ok(nx), Ok(ny)) = (x.parse::<f64>(), y.parse::<f64>()) {
                return nx.partial_cmp(&ny).unwrap_or(Ordering::Equal);
            }
            x.cmp(y)
        }
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn like_matches(actual: &Value, pattern: &Value, case_insensitive: bool) -> bool {
    let (Value::String(text), Value::String(pattern)) = (actual, pattern) else {
        return false;
    };
    if case_insensitive {
        wildcard_match(&text.to_lowercase(), &pattern.to_lowercase())
    } else {
        wildcard_match(text, pattern)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LikeToken {
    Any,
    One,
    Literal(char),
}

/// SQL LIKE: `%` matches any run, `_` matches one character, a backslash escapes the next one
fn wildcard_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::Any,
            '_' => LikeToken::One,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            c => LikeToken::Literal(c),
        });
    }

    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(LikeToken::Any) => {
                star = Some((p, t));
                p += 1;
            }
            Some(LikeToken::One) => {
                t += 1;
                p += 1;
            }
            Some(&LikeToken::Literal(c)) if c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|&tok| tok == LikeToken::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterData;
    use serde_json::json;

    fn row(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn wildcard_semantics() {
        assert!(wildcard_match("sunset at sea", "%sea%"));
        assert!(wildcard_match("cat", "c_t"));
        assert!(!wildcard_match("cart", "c_t"));
        assert!(wildcard_match("", "%"));
        assert!(!wildcard_match("dog", "%cat%"));
        assert!(wildcard_match("50% off", "%50\\%%"));
        assert!(!wildcard_match("500 off", "%50\\%%"));
        assert!(!wildcard_match("plain", "%\\_%"));
        assert!(wildcard_match("snake_case", "%e\\_c%"));
        assert!(wildcard_match("a\\b", "a\\\\b"));
    }

    #[test]
    fn evaluates_nested_conditions() {
        let mut filter = Filter::new("posts").unwrap();
        filter
            .assign(FilterData::new().with_where(json!({
                "$or": [{ "title": { "$ilike": "%SEA%" } }, { "owner_id": { "$in": [9] } }]
            })))
            .unwrap();
        assert!(filter.matches(&row(json!({ "title": "At sea", "owner_id": 1 }))));
        assert!(filter.matches(&row(json!({ "title": "Hills", "owner_id": 9 }))));
        assert!(!filter.matches(&row(json!({ "title": "Hills", "owner_id": 1 }))));
    }

    #[test]
    fn applies_order_and_page() {
        let rows = vec![
            row(json!({ "id": 1, "created_at": "2024-01-01T00:00:00Z" })),
            row(json!({ "id": 2, "created_at": "2024-01-03T00:00:00Z" })),
            row(json!({ "id": 3, "created_at": "2024-01-02T00:00:00.5Z" })),
        ];
        let mut filter = Filter::new("posts").unwrap();
        filter.assign(FilterData::new().with_page(2, 0)).unwrap();
        let ids: Vec<i64> = filter.apply(&rows).iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(filter.count(&rows), 3);
    }

    #[test]
    fn null_equality_matches_missing_and_null() {
        let mut filter = Filter::new("products").unwrap();
        filter.assign(FilterData::new().with_where(json!({ "category_id": null }))).unwrap();
        assert!(filter.matches(&row(json!({ "category_id": null }))));
        assert!(!filter.matches(&row(json!({ "category_id": 4 }))));
    }
}
