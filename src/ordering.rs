//! Translates the `ordering` query parameter into an SQL `ORDER BY` clause.
//!
//! Clients name fields, optionally prefixed with `-` for descending order,
//! separated by commas, e.g. `?ordering=-amount,date`. Only whitelisted
//! fields are turned into SQL and unknown fields are ignored.

/// The fields a list endpoint can be ordered by.
#[derive(Debug, Clone, Copy)]
pub struct OrderingSpec {
    /// Pairs of (query parameter field name, SQL column expression).
    pub fields: &'static [(&'static str, &'static str)],
    /// The ordering used when the client does not ask for a valid one.
    pub default: &'static str,
    /// Appended to every clause so that rows with equal keys come back in a stable order.
    pub tiebreaker: &'static str,
}

impl OrderingSpec {
    /// Build the body of an `ORDER BY` clause from the raw `ordering` parameter.
    pub fn order_by(&self, raw_ordering: Option<&str>) -> String {
        let terms: Vec<String> = raw_ordering
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|term| {
                let (field, direction) = match term.strip_prefix('-') {
                    Some(field) => (field, "DESC"),
                    None => (term, "ASC"),
                };

                self.fields
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, column)| format!("{column} {direction}"))
            })
            .collect();

        let ordering = if terms.is_empty() {
            self.default.to_owned()
        } else {
            terms.join(", ")
        };

        format!("{ordering}, {}", self.tiebreaker)
    }
}
