use serde_json::Value;

use super::error::FilterError;
use super::types::{Condition, FilterOp, FilterWhereInfo};

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Parse a JSON where document into a condition list (implicit AND)
    pub fn parse(where_data: &Value) -> Result<Vec<Condition>, FilterError> {
        match where_data {
            Value::Null => Ok(vec![]),
            Value::Object(obj) => {
                let mut conditions = Vec::new();
                for (key, value) in obj {
                    if key.starts_with('$') {
                        conditions.push(Self::parse_logical_operator(key, value)?);
                    } else {
                        validate_column(key)?;
                        conditions.extend(Self::parse_field_condition(key, value)?);
                    }
                }
                Ok(conditions)
            }
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn parse_logical_operator(op: &str, value: &Value) -> Result<Condition, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                let mut branches = Vec::new();
                for v in arr {
                    branches.push(Condition::And(Self::parse(v)?));
                }
                Ok(if op == "$and" { Condition::And(branches) } else { Condition::Or(branches) })
            }
            "$not" => Ok(Condition::Not(Box::new(Condition::And(Self::parse(value)?)))),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(field: &str, value: &Value) -> Result<Vec<Condition>, FilterError> {
        let mut out = Vec::new();
        match value {
            Value::Object(obj) => {
                for (op_key, op_val) in obj {
                    let operator = FilterOp::from_key(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                    if operator == FilterOp::In && !op_val.is_array() {
                        return Err(FilterError::InvalidOperatorData("$in requires array".to_string()));
                    }
                    out.push(Condition::Field(FilterWhereInfo {
                        column: field.to_string(),
                        operator,
                        data: op_val.clone(),
                    }));
                }
            }
            // Implicit equality: { field: value }
            _ => out.push(Condition::Field(FilterWhereInfo {
                column: field.to_string(),
                operator: FilterOp::Eq,
                data: value.clone(),
            })),
        }
        Ok(out)
    }

    /// Render conditions as a SQL predicate, collecting bind parameters
    pub fn generate(conditions: &[Condition], starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build_all(conditions, " AND ");
        (sql, filter_where.param_values)
    }

    fn build_all(&mut self, conditions: &[Condition], joiner: &str) -> String {
        if conditions.is_empty() {
            // Empty AND is true, empty OR is false
            return if joiner == " AND " { "1=1".to_string() } else { "1=0".to_string() };
        }
        conditions
            .iter()
            .map(|c| self.build_condition(c))
            .collect::<Vec<_>>()
            .join(joiner)
    }

    fn build_condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Field(info) => self.build_sql_condition(info),
            Condition::And(inner) => format!("({})", self.build_all(inner, " AND ")),
            Condition::Or(inner) => format!("({})", self.build_all(inner, " OR ")),
            Condition::Not(inner) => format!("NOT ({})", self.build_condition(inner)),
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    format!("{} IS NULL", quoted_column)
                } else {
                    format!("{} = {}", quoted_column, self.param(condition.data.clone()))
                }
            }
            FilterOp::Neq => {
                if condition.data.is_null() {
                    format!("{} IS NOT NULL", quoted_column)
                } else {
                    format!("{} <> {}", quoted_column, self.param(condition.data.clone()))
                }
            }
            FilterOp::Gt => format!("{} > {}", quoted_column, self.param(condition.data.clone())),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(condition.data.clone())),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.param(condition.data.clone())),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.param(condition.data.clone())),
            FilterOp::Like => format!("{} LIKE {}", quoted_column, self.param(condition.data.clone())),
            FilterOp::ILike => format!("{} ILIKE {}", quoted_column, self.param(condition.data.clone())),
            FilterOp::In => match &condition.data {
                Value::Array(values) if values.is_empty() => "1=0".to_string(),
                Value::Array(values) => {
                    let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                    format!("{} IN ({})", quoted_column, params.join(", "))
                }
                other => format!("{} = {}", quoted_column, self.param(other.clone())),
            },
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Column and table identifiers are interpolated into SQL, so keep them to [A-Za-z_][A-Za-z0-9_]*
pub fn validate_column(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)))
    }
}
