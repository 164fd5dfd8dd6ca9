use serde::{Deserialize, Deserializer, Serialize};

/// One page of a list endpoint.
///
/// List endpoints answer `{"results": [...], "count": n, "num_pages": n,
/// "current_page": n}`; some deployments return a bare array instead, which
/// is read as a single page holding everything.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u64,
    pub num_pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    /// Total pages for the page size the list was requested with
    pub fn total_pages(&self, page_size: u32) -> u64 {
        total_pages(self.count, page_size)
    }
}

/// Search and paging shared by the list endpoints
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            search: None,
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn search(mut self, query: Option<String>) -> Self {
        self.search = query.filter(|q| !q.trim().is_empty());
        self
    }

    /// Query parameters in the order the list pages send them
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref q) = self.search {
            params.push(("search", q.clone()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("page_size", self.page_size.to_string()));
        params
    }
}

/// ceil(count / page_size), never less than one
pub fn total_pages(count: u64, page_size: u32) -> u64 {
    let size = u64::from(page_size.max(1));
    count.div_ceil(size).max(1)
}

impl<'de, T> Deserialize<'de> for Page<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope<T> {
            #[serde(default = "Vec::new")]
            results: Vec<T>,
            count: Option<u64>,
            num_pages: Option<u64>,
            current_page: Option<u64>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Paged(Envelope<T>),
            Bare(Vec<T>),
        }

        Ok(match Raw::<T>::deserialize(deserializer)? {
            Raw::Paged(env) => {
                let count = env.count.unwrap_or(env.results.len() as u64);
                Page {
                    count,
                    num_pages: env.num_pages.unwrap_or(1),
                    current_page: env.current_page.unwrap_or(1),
                    results: env.results,
                }
            }
            Raw::Bare(results) => Page {
                count: results.len() as u64,
                num_pages: 1,
                current_page: 1,
                results,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paginated() {
        let json = r#"{"results": [1, 2, 3], "count": 23, "num_pages": 3, "current_page": 2}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.results, vec![1, 2, 3]);
        assert_eq!(page.count, 23);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages(10), 3);
    }

    #[test]
    fn test_parse_bare_array() {
        let page: Page<u32> = serde_json::from_str("[4, 5]").unwrap();
        assert_eq!(page.results, vec![4, 5]);
        assert_eq!(page.count, 2);
        assert_eq!(page.num_pages, 1);
    }

    #[test]
    fn test_missing_count_uses_results_len() {
        let page: Page<u32> = serde_json::from_str(r#"{"results": [1]}"#).unwrap();
        assert_eq!(page.count, 1);
    }

    #[test]
    fn test_list_query_params() {
        let query = ListQuery::new(2, 10).search(Some("lamp".into()));
        assert_eq!(
            query.params(),
            vec![("search", "lamp".to_string()), ("page", "2".to_string()), ("page_size", "10".to_string())]
        );

        let blank = ListQuery::new(0, 10).search(Some("  ".into()));
        assert_eq!(blank.search, None);
        assert_eq!(blank.page, 1);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }
}
