//! Query builder (equality filters, ordering, limit)

use serde_json::Value;
use std::cmp::Ordering;

/// `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.column).unwrap_or(&Value::Null) == &self.value
    }

    /// PostgREST operand text (`eq.<value>`)
    pub fn operand(&self) -> String {
        match &self.value {
            Value::Null => "is.null".to_string(),
            Value::String(s) => format!("eq.{s}"),
            other => format!("eq.{other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Select query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Filter, sort and truncate an in-memory row set
    pub fn apply(&self, rows: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut out: Vec<Value> = rows.into_iter().filter(|r| self.matches(r)).collect();
        if let Some(order) = &self.order {
            out.sort_by(|a, b| {
                let ord = compare(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }

    /// Query-string pairs for the REST API (filters + order + limit)
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (f.column.clone(), f.operand()))
            .collect();
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".into(), format!("{}.{dir}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".into(), limit.to_string()));
        }
        params
    }
}

/// Nulls sort first; numbers numerically; everything else as text
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_params() {
        let query = Query::new()
            .eq("user_id", "u-1")
            .eq("is_active", true)
            .eq("sheet_id", Value::Null)
            .order_by("created_at", false)
            .limit(10);
        assert_eq!(
            query.to_params(),
            vec![
                ("user_id".to_string(), "eq.u-1".to_string()),
                ("is_active".to_string(), "eq.true".to_string()),
                ("sheet_id".to_string(), "is.null".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply() {
        let rows = vec![
            json!({"id": "a", "n": 2, "kind": "x"}),
            json!({"id": "b", "n": 10, "kind": "x"}),
            json!({"id": "c", "n": 1, "kind": "y"}),
        ];
        let out = Query::new().eq("kind", "x").order_by("n", false).apply(rows.clone());
        let ids: Vec<_> = out.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let out = Query::new().order_by("n", true).limit(1).apply(rows);
        assert_eq!(out[0]["id"], "c");
    }

    #[test]
    fn test_missing_column_matches_null() {
        let query = Query::new().eq("sheet_id", Value::Null);
        assert!(query.matches(&json!({"id": "a"})));
        assert!(!query.matches(&json!({"id": "a", "sheet_id": "s"})));
    }
}
