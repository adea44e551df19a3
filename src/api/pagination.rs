use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, size: u32) -> Result<Self, ApiError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(ApiError::not_found("Invalid page."));
        }
        Ok(Self { page, size: size.max(1) })
    }

    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.size as i64
    }
}

/// Paginated list payload
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Pages past the end are an error, except the first page of an empty list
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> Result<Self, ApiError> {
        if request.page > 1 && request.offset() >= count {
            return Err(ApiError::not_found("Invalid page."));
        }
        let next = (request.offset() + (results.len() as i64) < count).then_some(request.page + 1);
        let previous = (request.page > 1).then_some(request.page - 1);
        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_page_links_both_ways() {
        let request = PageRequest::new(Some(2), 10).unwrap();
        assert_eq!((request.limit(), request.offset()), (10, 10));
        let page = Page::new(request, 25, vec![0; 10]).unwrap();
        assert_eq!((page.next, page.previous), (Some(3), Some(1)));
    }

    #[test]
    fn last_and_empty_pages() {
        let page = Page::new(PageRequest::new(Some(3), 10).unwrap(), 25, vec![0; 5]).unwrap();
        assert_eq!((page.next, page.previous), (None, Some(2)));

        let page = Page::<i32>::new(PageRequest::new(None, 10).unwrap(), 0, vec![]).unwrap();
        assert_eq!((page.count, page.next, page.previous), (0, None, None));
    }

    #[test]
    fn out_of_range_pages_are_not_found() {
        assert!(PageRequest::new(Some(0), 10).is_err());
        assert!(Page::<i32>::new(PageRequest::new(Some(4), 10).unwrap(), 25, vec![]).is_err());
    }
}
