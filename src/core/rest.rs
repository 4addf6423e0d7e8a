use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

use crate::core::error::{Result, WpError};
use crate::core::mapping::{decode, RestCategory, RestPage, RestPost, RestSettings, RestThemeMods};
use crate::core::source::{ContentSource, Transport};
use crate::models::{
    Category, Page, PageInfo, PageList, Post, PostList, PostQuery, SiteInfo, Total,
};
use crate::utils::endpoint_url;

/// REST 接口 `per_page` 的上限
pub const REST_MAX_PER_PAGE: usize = 100;

const API_ROOT: &str = "wp-json/wp/v2/";

/// 读取数字类型的响应头
fn header_count(headers: &HeaderMap, name: &str) -> Option<usize> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// WordPress REST 客户端
///
/// 把 `/wp-json/wp/v2/*` 的响应整理成与 GraphQL 相同的实体。
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// 拼出 `/wp-json/wp/v2/{route}` 地址
    fn route(&self, route: &str) -> Result<Url> {
        endpoint_url(&self.base_url, &format!("{}{}", API_ROOT, route)).map_err(|source| {
            WpError::InvalidUrl {
                url: self.base_url.to_string(),
                source,
            }
        })
    }

    async fn send(&self, url: &Url) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        self.http.get(url.clone()).send().await.map_err(|e| {
            error!("REST request failed: {}", e);
            WpError::Request(e)
        })
    }

    /// GET 并解析 JSON，状态非 2xx 时返回错误
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<(T, HeaderMap)> {
        let response = self.send(&url).await?;
        let status = response.status();
        if !status.is_success() {
            error!("REST {} fetch failed: {}", context, status.as_u16());
            return Err(WpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let headers = response.headers().clone();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read REST {} response: {}", context, e);
            WpError::Request(e)
        })?;
        let value = decode(&format!("REST {}", context), &text)?;
        Ok((value, headers))
    }

    /// 把分类别名解析成 ID，REST 的 `categories` 参数只接受 ID
    async fn category_id(&self, slug: &str) -> Result<Option<u64>> {
        let mut url = self.route("categories")?;
        url.query_pairs_mut().append_pair("slug", slug);
        let (categories, _) = self.get_json::<Vec<RestCategory>>(url, "categories").await?;
        Ok(categories.first().map(|c| c.id))
    }
}

#[async_trait]
impl ContentSource for RestClient {
    fn transport(&self) -> Transport {
        Transport::Rest
    }

    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostList> {
        let per_page = query.per_page.clamp(1, REST_MAX_PER_PAGE);
        let mut url = self.route("posts")?;
        url.query_pairs_mut()
            .append_pair("page", &query.page.max(1).to_string())
            .append_pair("per_page", &per_page.to_string())
            .append_pair("_embed", "1");

        if let Some(slug) = &query.category {
            match self.category_id(slug).await? {
                Some(id) => {
                    url.query_pairs_mut()
                        .append_pair("categories", &id.to_string());
                }
                None => {
                    debug!("Unknown category {}, no posts to fetch", slug);
                    return Ok(PostList {
                        items: Vec::new(),
                        total: Total::Exact(0),
                        page_info: Some(PageInfo::default()),
                    });
                }
            }
        }

        let (raw, headers) = self.get_json::<Vec<RestPost>>(url, "posts").await?;
        let items: Vec<Post> = raw.into_iter().map(Post::from).collect();
        let total = header_count(&headers, "x-wp-total").unwrap_or(items.len());
        let has_next_page = header_count(&headers, "x-wp-totalpages")
            .map(|pages| query.page.max(1) < pages)
            .unwrap_or(false);

        Ok(PostList {
            items,
            total: Total::Exact(total),
            page_info: Some(PageInfo {
                has_next_page,
                end_cursor: None,
            }),
        })
    }

    async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let mut url = self.route("posts")?;
        url.query_pairs_mut()
            .append_pair("slug", slug)
            .append_pair("_embed", "1");
        let (raw, _) = self.get_json::<Vec<RestPost>>(url, "post").await?;
        Ok(raw.into_iter().next().map(Post::from))
    }

    async fn fetch_pages(&self) -> Result<PageList> {
        let mut url = self.route("pages")?;
        url.query_pairs_mut()
            .append_pair("per_page", &REST_MAX_PER_PAGE.to_string())
            .append_pair("_embed", "1");
        let (raw, headers) = self.get_json::<Vec<RestPage>>(url, "pages").await?;
        let items: Vec<Page> = raw.into_iter().map(Page::from).collect();
        let total = header_count(&headers, "x-wp-total").unwrap_or(items.len());
        Ok(PageList {
            items,
            total: Total::Exact(total),
        })
    }

    async fn fetch_page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        let mut url = self.route("pages")?;
        url.query_pairs_mut()
            .append_pair("slug", slug)
            .append_pair("_embed", "1");
        let (raw, _) = self.get_json::<Vec<RestPage>>(url, "page").await?;
        Ok(raw.into_iter().next().map(Page::from))
    }

    async fn fetch_categories(&self, limit: usize) -> Result<Vec<Category>> {
        let mut url = self.route("categories")?;
        url.query_pairs_mut()
            .append_pair("per_page", &limit.clamp(1, REST_MAX_PER_PAGE).to_string());
        let (raw, _) = self
            .get_json::<Vec<RestCategory>>(url, "categories")
            .await?;
        Ok(raw.into_iter().map(Category::from).collect())
    }

    async fn fetch_site_info(&self) -> Result<SiteInfo> {
        let url = self.route("settings")?;
        let (settings, _) = self.get_json::<RestSettings>(url, "settings").await?;
        let defaults = SiteInfo::default();
        Ok(SiteInfo {
            title: settings
                .title
                .or(settings.name)
                .filter(|t| !t.is_empty())
                .unwrap_or(defaults.title),
            description: settings.description.unwrap_or_default(),
            url: settings.url.unwrap_or_default(),
            logo: None,
        })
    }

    async fn fetch_site_logo(&self) -> Result<Option<String>> {
        let url = self.route("theme-mods")?;
        let response = self.send(&url).await?;
        // 标准 WordPress 没有这个路由，404 视为未设置 Logo
        if response.status() == StatusCode::NOT_FOUND {
            debug!("theme-mods route not found, no logo configured");
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!("REST theme-mods fetch failed: {}", status);
            return Err(WpError::Status {
                status,
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| {
            error!("Failed to read REST theme-mods response: {}", e);
            WpError::Request(e)
        })?;
        let mods: RestThemeMods = decode("REST theme-mods", &text)?;
        Ok(mods.logo())
    }
}
