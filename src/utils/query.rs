//! Composición dinámica de filtros SQL
//!
//! Cada filtro es opcional: un valor ausente no agrega condición. Los nombres
//! de columna son siempre literales del código, nunca entrada del usuario.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::utils::pagination::PageRequest;

pub struct WhereClause<'q, 'args> {
    builder: &'q mut QueryBuilder<'args, Postgres>,
    has_condition: bool,
}

impl<'q, 'args> WhereClause<'q, 'args> {
    pub fn new(builder: &'q mut QueryBuilder<'args, Postgres>) -> Self {
        Self {
            builder,
            has_condition: false,
        }
    }

    fn next_condition(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        if self.has_condition {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_condition = true;
        }
        &mut *self.builder
    }

    /// `column = value`
    pub fn eq<T>(&mut self, column: &'static str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        if let Some(value) = value {
            self.next_condition()
                .push(column)
                .push(" = ")
                .push_bind(value);
        }
        self
    }

    /// `column ILIKE '%value%'`, con los comodines del usuario escapados.
    pub fn contains(&mut self, column: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            let pattern = format!("%{}%", escape_like(value));
            self.next_condition()
                .push(column)
                .push(" ILIKE ")
                .push_bind(pattern);
        }
        self
    }

    /// Rango inclusivo; cada extremo es opcional.
    pub fn between<T>(&mut self, column: &'static str, from: Option<T>, to: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        if let Some(from) = from {
            self.next_condition()
                .push(column)
                .push(" >= ")
                .push_bind(from);
        }
        if let Some(to) = to {
            self.next_condition()
                .push(column)
                .push(" <= ")
                .push_bind(to);
        }
        self
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Agrega `ORDER BY ... LIMIT ... OFFSET ...` al final de la consulta.
pub fn push_page(builder: &mut QueryBuilder<'_, Postgres>, order_by: &'static str, page: PageRequest) {
    builder
        .push(" ORDER BY ")
        .push(order_by)
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_adds_nothing() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM pets");
        WhereClause::new(&mut qb)
            .eq::<i32>("owner_id", None)
            .contains("name", None)
            .between::<i32>("age", None, None);
        assert_eq!(qb.sql(), "SELECT * FROM pets");
    }

    #[test]
    fn test_filters_are_joined_with_and() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM pets");
        WhereClause::new(&mut qb)
            .eq("owner_id", Some(3))
            .contains("name", Some("fir"))
            .between("age", Some(2), Some(12));
        assert_eq!(
            qb.sql(),
            "SELECT * FROM pets WHERE owner_id = $1 AND name ILIKE $2 AND age >= $3 AND age <= $4"
        );
    }

    #[test]
    fn test_blank_substring_is_ignored() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM persons");
        WhereClause::new(&mut qb).contains("email", Some("   "));
        assert_eq!(qb.sql(), "SELECT * FROM persons");
    }

    #[test]
    fn test_open_range() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM appointments");
        WhereClause::new(&mut qb).between("scheduled_at", None, Some(5));
        assert_eq!(qb.sql(), "SELECT * FROM appointments WHERE scheduled_at <= $1");
    }

    #[test]
    fn test_push_page() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM pets");
        WhereClause::new(&mut qb).eq("species_id", Some(1));
        push_page(&mut qb, "id DESC", PageRequest::new(Some(3), Some(20)).unwrap());
        assert_eq!(
            qb.sql(),
            "SELECT * FROM pets WHERE species_id = $1 ORDER BY id DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
