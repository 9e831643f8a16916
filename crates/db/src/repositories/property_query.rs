//! Query plan for the filtered property listing.
//!
//! Typed [`PropertyCondition`]s are rendered into a conjunctive `WHERE`
//! clause with positional placeholders, and their values are kept in a typed
//! bind list. The count and page queries share the same plan.

use estate_core::filter::PropertyCondition;
use estate_core::pagination::PageRequest;
use estate_core::sort::PropertySort;
use estate_core::types::{DbId, Money, Year};
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// Columns selected for a listing row. `img` is the lateral image join.
const LIST_COLUMNS: &str = "\
    p.id, p.name, p.address, p.price, p.code_internal, p.year, p.owner_id, \
    img.file_url AS image_url";

/// One enabled image per property: the one with the lowest id.
const IMAGE_JOIN: &str = "\
    LEFT JOIN LATERAL ( \
        SELECT i.file_url FROM property_images i \
        WHERE i.property_id = p.id AND i.enabled \
        ORDER BY i.id ASC LIMIT 1 \
    ) img ON TRUE";

/// Typed bind value for a rendered condition.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    BigInt(DbId),
    SmallInt(Year),
    Text(String),
    Money(Money),
}

/// A rendered listing predicate plus its bind values.
#[derive(Debug, Clone)]
pub struct PropertyQuery {
    where_clause: String,
    bind_values: Vec<BindValue>,
    next_bind_idx: u32,
}

impl PropertyQuery {
    /// Fold `conditions` into a conjunctive `WHERE` clause.
    ///
    /// The clause is empty when there are no conditions, otherwise it starts
    /// with `WHERE `.
    pub fn new(conditions: &[PropertyCondition]) -> Self {
        let mut clauses: Vec<String> = Vec::with_capacity(conditions.len());
        let mut bind_values: Vec<BindValue> = Vec::with_capacity(conditions.len());
        let mut bind_idx = 1u32;

        for condition in conditions {
            let (clause, value) = match condition {
                PropertyCondition::TextMatch(pattern) => (
                    format!(
                        "(p.name ILIKE ${bind_idx} OR p.address ILIKE ${bind_idx} \
                         OR p.code_internal ILIKE ${bind_idx})"
                    ),
                    BindValue::Text(pattern.clone()),
                ),
                PropertyCondition::OwnerIs(id) => {
                    (format!("p.owner_id = ${bind_idx}"), BindValue::BigInt(*id))
                }
                PropertyCondition::PriceAtLeast(min) => {
                    (format!("p.price >= ${bind_idx}"), BindValue::Money(*min))
                }
                PropertyCondition::PriceAtMost(max) => {
                    (format!("p.price <= ${bind_idx}"), BindValue::Money(*max))
                }
                PropertyCondition::YearIs(year) => {
                    (format!("p.year = ${bind_idx}"), BindValue::SmallInt(*year))
                }
            };
            clauses.push(clause);
            bind_values.push(value);
            bind_idx += 1;
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        Self {
            where_clause,
            bind_values,
            next_bind_idx: bind_idx,
        }
    }

    pub fn where_clause(&self) -> &str {
        &self.where_clause
    }

    /// Number of conditions in the plan.
    pub fn condition_count(&self) -> usize {
        self.bind_values.len()
    }

    /// SQL counting all matching rows, ignoring pagination.
    pub fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*)::BIGINT FROM properties p {}",
            self.where_clause
        )
    }

    /// SQL selecting one page of listing rows.
    ///
    /// The limit and offset take the two placeholders after the conditions.
    pub fn page_sql(&self, sort: PropertySort) -> String {
        let limit_idx = self.next_bind_idx;
        let offset_idx = limit_idx + 1;
        format!(
            "SELECT {LIST_COLUMNS} FROM properties p {IMAGE_JOIN} {} \
             ORDER BY {} LIMIT ${limit_idx} OFFSET ${offset_idx}",
            self.where_clause,
            order_by(sort),
        )
    }

    /// Bind condition values, then limit and offset, to a page query.
    pub fn bind_page<'q, O>(
        &'q self,
        q: QueryAs<'q, Postgres, O, PgArguments>,
        page: PageRequest,
    ) -> QueryAs<'q, Postgres, O, PgArguments> {
        bind_values(q, &self.bind_values)
            .bind(page.limit())
            .bind(page.offset())
    }

    /// Bind condition values to a count query.
    pub fn bind_count<'q>(
        &'q self,
        q: QueryScalar<'q, Postgres, i64, PgArguments>,
    ) -> QueryScalar<'q, Postgres, i64, PgArguments> {
        bind_values_scalar(q, &self.bind_values)
    }
}

/// `ORDER BY` expression for a sort token. Always total via `p.id`.
fn order_by(sort: PropertySort) -> &'static str {
    match sort {
        PropertySort::IdDesc => "p.id DESC",
        PropertySort::IdAsc => "p.id ASC",
        PropertySort::PriceAsc => "p.price ASC, p.id DESC",
        PropertySort::PriceDesc => "p.price DESC, p.id DESC",
        PropertySort::YearAsc => "p.year ASC, p.id DESC",
        PropertySort::YearDesc => "p.year DESC, p.id DESC",
        PropertySort::NameAsc => "p.name ASC, p.id DESC",
    }
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::SmallInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Money(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_values_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    bind_values: &'q [BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::SmallInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Money(v) => q = q.bind(*v),
        }
    }
    q
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use estate_core::filter::PropertyFilter;

    use super::*;

    #[test]
    fn no_conditions_no_where() {
        let plan = PropertyQuery::new(&[]);
        assert_eq!(plan.where_clause(), "");
        assert_eq!(plan.condition_count(), 0);
        assert!(plan
            .page_sql(PropertySort::IdDesc)
            .ends_with("ORDER BY p.id DESC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn conditions_are_conjunctive_and_numbered() {
        let filter = PropertyFilter {
            text: Some("azul".into()),
            owner_id: Some(4),
            min_price: Some(Money::new(1, 0)),
            max_price: Some(Money::new(9, 0)),
            year: Some(2000),
        };
        let plan = PropertyQuery::new(&filter.conditions());
        assert_eq!(
            plan.where_clause(),
            "WHERE (p.name ILIKE $1 OR p.address ILIKE $1 OR p.code_internal ILIKE $1) \
             AND p.owner_id = $2 AND p.price >= $3 AND p.price <= $4 AND p.year = $5"
        );
        assert!(plan
            .page_sql(PropertySort::IdDesc)
            .ends_with("LIMIT $6 OFFSET $7"));
    }

    #[test]
    fn values_never_enter_sql() {
        let filter = PropertyFilter {
            text: Some("'; DROP TABLE properties; --".into()),
            ..Default::default()
        };
        let plan = PropertyQuery::new(&filter.conditions());
        assert!(!plan.count_sql().contains("DROP"));
        assert!(!plan.page_sql(PropertySort::IdDesc).contains("DROP"));
        assert_eq!(
            plan.bind_values,
            vec![BindValue::Text("%'; DROP TABLE properties; --%".into())]
        );
    }

    #[test]
    fn count_sql_has_no_pagination() {
        let plan = PropertyQuery::new(&PropertyFilter::for_owner(1).conditions());
        let sql = plan.count_sql();
        assert!(sql.contains("WHERE p.owner_id = $1"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn page_sql_joins_lowest_enabled_image() {
        let sql = PropertyQuery::new(&[]).page_sql(PropertySort::IdDesc);
        assert!(sql.contains("LEFT JOIN LATERAL"));
        assert!(sql.contains("i.enabled"));
        assert!(sql.contains("ORDER BY i.id ASC LIMIT 1"));
    }

    #[test]
    fn non_id_sorts_tie_break_on_id() {
        for sort in [
            PropertySort::PriceAsc,
            PropertySort::PriceDesc,
            PropertySort::YearAsc,
            PropertySort::YearDesc,
            PropertySort::NameAsc,
        ] {
            assert!(order_by(sort).ends_with("p.id DESC"), "{sort}");
        }
    }
}
