use serde::{Deserialize, Serialize};

/// Catalog search the harvester walks page by page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// Section root, without trailing slash
    #[serde(default = "default_root_url")]
    pub root_url: String,
    /// Fixed filter: region, listing category and sort order
    #[serde(default = "default_query")]
    pub query: String,
    /// Listings per catalog page; a stored batch of this size counts as complete
    #[serde(default = "default_page_size")]
    pub expected_page_size: usize,
}

impl CatalogQuery {
    /// Index URL for a 1-based page number.
    ///
    /// Page 1 has no page segment. Later pages carry the number twice, as a
    /// path segment and again as the `_p` parameter.
    pub fn page_url(&self, page: u32) -> String {
        let root = self.root_url.trim_end_matches('/');
        if page <= 1 {
            format!("{}/?{}", root, self.query)
        } else {
            format!("{}/{}/?{}&_p={}", root, page, self.query, page)
        }
    }
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            query: default_query(),
            expected_page_size: default_page_size(),
        }
    }
}

fn default_root_url() -> String {
    "https://ekaterinburg.russianrealty.ru/Продажа-вторичных-квартир".to_string()
}

fn default_query() -> String {
    "c=1&r=67&l=905&a=100&p=100&n=0&f=1&z=DATEADD&zt=DESC".to_string()
}

fn default_page_size() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> CatalogQuery {
        CatalogQuery {
            root_url: "https://realty.test/flats/".to_string(),
            query: "r=67&zt=DESC".to_string(),
            expected_page_size: 20,
        }
    }

    #[test]
    fn first_page_has_no_page_segment() {
        assert_eq!(query().page_url(1), "https://realty.test/flats/?r=67&zt=DESC");
    }

    #[test]
    fn later_pages_embed_number_twice() {
        assert_eq!(
            query().page_url(7),
            "https://realty.test/flats/7/?r=67&zt=DESC&_p=7"
        );
    }
}
