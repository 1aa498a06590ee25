//! Paginación de listados
//!
//! Todos los endpoints de listado devuelven el mismo sobre
//! `{data, meta, links}`; este módulo calcula los metadatos y los enlaces.

use serde::Serialize;

use crate::utils::errors::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Página solicitada, ya validada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Result<Self, AppError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);

        if page < 1 {
            return Err(AppError::BadRequest("page debe ser mayor o igual a 1".to_string()));
        }
        if per_page < 1 {
            return Err(AppError::BadRequest("per_page debe ser mayor o igual a 1".to_string()));
        }

        Ok(Self { page, per_page })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub total: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub last_page: i64,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Sobre de respuesta paginada
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
    pub links: PaginationLinks,
}

impl<T> Paginated<T> {
    /// `base_path` es la ruta del listado, p. ej. `/api/pets`.
    pub fn new(data: Vec<T>, total: i64, page: PageRequest, base_path: &str) -> Self {
        let last_page = if total <= 0 {
            0
        } else {
            (total - 1) / page.per_page + 1
        };

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = page.offset().saturating_add(1);
            (Some(from), Some(from.saturating_add(data.len() as i64 - 1)))
        };

        let link = |p: i64| format!("{}?page={}&per_page={}", base_path, p, page.per_page);

        let links = PaginationLinks {
            first: link(1),
            last: link(last_page.max(1)),
            prev: (page.page > 1).then(|| link((page.page - 1).min(last_page.max(1)))),
            next: (page.page < last_page).then(|| link(page.page + 1)),
        };

        Self {
            data,
            meta: PaginationMeta {
                total,
                per_page: page.per_page,
                current_page: page.page,
                last_page,
                from,
                to,
            },
            links,
        }
    }

    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let page = PageRequest::new(None, None).unwrap();
        assert_eq!(page, PageRequest { page: 1, per_page: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_request_rejects_zero() {
        assert!(matches!(PageRequest::new(Some(0), None), Err(AppError::BadRequest(_))));
        assert!(matches!(PageRequest::new(None, Some(0)), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_meta_middle_page() {
        let page = PageRequest::new(Some(2), Some(10)).unwrap();
        let result = Paginated::new((11..=20).collect::<Vec<i64>>(), 35, page, "/api/pets");

        assert_eq!(result.meta.last_page, 4);
        assert_eq!(result.meta.from, Some(11));
        assert_eq!(result.meta.to, Some(20));
        assert_eq!(result.links.first, "/api/pets?page=1&per_page=10");
        assert_eq!(result.links.last, "/api/pets?page=4&per_page=10");
        assert_eq!(result.links.prev.as_deref(), Some("/api/pets?page=1&per_page=10"));
        assert_eq!(result.links.next.as_deref(), Some("/api/pets?page=3&per_page=10"));
    }

    #[test]
    fn test_meta_last_partial_page() {
        let page = PageRequest::new(Some(4), Some(10)).unwrap();
        let result = Paginated::new(vec![1, 2, 3, 4, 5], 35, page, "/api/pets");

        assert_eq!(result.meta.from, Some(31));
        assert_eq!(result.meta.to, Some(35));
        assert!(result.links.next.is_none());
    }

    #[test]
    fn test_meta_empty_result() {
        let page = PageRequest::new(None, Some(5)).unwrap();
        let result: Paginated<i64> = Paginated::new(vec![], 0, page, "/api/persons");

        assert_eq!(result.meta.total, 0);
        assert_eq!(result.meta.last_page, 0);
        assert_eq!(result.meta.from, None);
        assert_eq!(result.meta.to, None);
        assert!(result.links.prev.is_none());
        assert!(result.links.next.is_none());
        assert_eq!(result.links.last, "/api/persons?page=1&per_page=5");
    }

    #[test]
    fn test_last_page_is_ceiling() {
        for (total, per_page, expected) in [(1, 1, 1), (10, 10, 1), (11, 10, 2), (99, 7, 15)] {
            let page = PageRequest::new(Some(1), Some(per_page)).unwrap();
            let result: Paginated<i64> = Paginated::new(vec![0], total, page, "/x");
            assert_eq!(result.meta.last_page, expected, "total={} per_page={}", total, per_page);
        }
    }

    #[test]
    fn test_huge_per_page_does_not_overflow() {
        let page = PageRequest::new(Some(1), Some(i64::MAX)).unwrap();
        let result = Paginated::new(vec![1, 2, 3], 3, page, "/api/pets");

        assert_eq!(result.meta.last_page, 1);
        assert_eq!(result.meta.from, Some(1));
        assert_eq!(result.meta.to, Some(3));
        assert!(result.links.next.is_none());
        assert_eq!(result.links.last, format!("/api/pets?page=1&per_page={}", i64::MAX));
    }

    #[test]
    fn test_huge_page_number_keeps_offset_bounded() {
        let page = PageRequest::new(Some(i64::MAX), Some(i64::MAX)).unwrap();
        assert_eq!(page.offset(), i64::MAX);

        let result: Paginated<i64> = Paginated::new(vec![], 3, page, "/api/pets");
        assert_eq!(result.meta.last_page, 1);
        assert_eq!(result.meta.from, None);
        assert!(result.links.next.is_none());
    }

    #[test]
    fn test_prev_link_past_last_page_points_to_last_page() {
        let page = PageRequest::new(Some(50), Some(10)).unwrap();
        let result: Paginated<i64> = Paginated::new(vec![], 35, page, "/api/pets");

        assert_eq!(result.meta.last_page, 4);
        assert_eq!(result.links.prev.as_deref(), Some("/api/pets?page=4&per_page=10"));
        assert!(result.links.next.is_none());
    }

    #[test]
    fn test_prev_link_past_end_of_empty_listing() {
        let page = PageRequest::new(Some(3), Some(10)).unwrap();
        let result: Paginated<i64> = Paginated::new(vec![], 0, page, "/api/pets");

        assert_eq!(result.links.prev.as_deref(), Some("/api/pets?page=1&per_page=10"));
    }
}
