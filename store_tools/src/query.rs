use std::fmt::{Display, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Is,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Is => "is",
        }
    }
}

/// A single `column, operator, value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn new<V: Display>(column: &str, op: FilterOp, value: V) -> Self {
        Self { column: column.to_string(), op, value: value.to_string() }
    }

    pub fn eq<V: Display>(column: &str, value: V) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn neq<V: Display>(column: &str, value: V) -> Self {
        Self::new(column, FilterOp::Neq, value)
    }

    pub fn lt<V: Display>(column: &str, value: V) -> Self {
        Self::new(column, FilterOp::Lt, value)
    }

    pub fn gte<V: Display>(column: &str, value: V) -> Self {
        Self::new(column, FilterOp::Gte, value)
    }

    pub fn is_null(column: &str) -> Self {
        Self::new(column, FilterOp::Is, "null")
    }

    /// Matches any of `values`. Each value is quoted, so values containing commas or parentheses are safe.
    pub fn in_list<V: Display>(column: &str, values: &[V]) -> Self {
        let mut list = String::from("(");
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                list.push(',');
            }
            let escaped = v.to_string().replace('\\', "\\\\").replace('"', "\\\"");
            let _ = write!(list, "\"{escaped}\"");
        }
        list.push(')');
        Self { column: column.to_string(), op: FilterOp::In, value: list }
    }

    pub fn to_param(&self) -> (String, String) {
        (self.column.clone(), format!("{}.{}", self.op.as_str(), self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Describes the rows (and columns) a `get` call should return.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    limit: Option<u64>,
    select: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq<V: Display>(self, column: &str, value: V) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);
        params.push(("select".to_string(), self.select.clone().unwrap_or_else(|| "*".to_string())));
        params.extend(self.filters.iter().map(Filter::to_param));
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(col, dir)| match dir {
                    Direction::Asc => format!("{col}.asc"),
                    Direction::Desc => format!("{col}.desc"),
                })
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn query_params() {
        let q = Query::new()
            .eq("tenant_id", "t1")
            .filter(Filter::neq("payment_status", "payment_pending"))
            .order_by("created_at", Direction::Desc)
            .limit(50);
        let params = q.to_params();
        assert_eq!(params, vec![
            ("select".to_string(), "*".to_string()),
            ("tenant_id".to_string(), "eq.t1".to_string()),
            ("payment_status".to_string(), "neq.payment_pending".to_string()),
            ("order".to_string(), "created_at.desc".to_string()),
            ("limit".to_string(), "50".to_string()),
        ]);
    }

    #[test]
    fn in_list_quotes_values() {
        let f = Filter::in_list("order_id", &["a", "b,c", "d\"e"]);
        assert_eq!(f.to_param().1, r#"in.("a","b,c","d\"e")"#);
    }

    #[test]
    fn is_null() {
        assert_eq!(Filter::is_null("payment_reference").to_param().1, "is.null");
    }
}
