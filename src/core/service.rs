use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::core::error::{Result, WpError};
use crate::core::graphql::GraphqlClient;
use crate::core::rest::RestClient;
use crate::core::source::{ContentSource, Transport};
use crate::models::{
    Category, Config, ContactForm, MenuItem, OrderResult, Page, PageList, Post, PostList,
    PostQuery, ProductList, ProductQuery, SiteInfo, SiteSettings, SubmitFormResult,
};

/// 首页"精选文章"使用的分类
pub const FEATURED_CATEGORY: &str = "featured";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// WordPress 访问层
///
/// 内容查询走构造时选定的 [`ContentSource`]（GraphQL 或 REST），
/// 菜单、主题设置、表单、订单和商品只有 GraphQL 接口，始终走 GraphQL。
/// 每次调用都是独立的一次请求，不做缓存和重试。
#[derive(Clone)]
pub struct WordPress {
    config: Config,
    graphql: GraphqlClient,
    content: Arc<dyn ContentSource>,
}

impl WordPress {
    /// 按配置创建访问层
    pub fn new(config: Config) -> Result<Self> {
        let base_url = Url::parse(&config.wp_url).map_err(|source| WpError::InvalidUrl {
            url: config.wp_url.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        let graphql = GraphqlClient::new(http.clone(), base_url.clone())?;
        let content: Arc<dyn ContentSource> = if config.use_graphql {
            Arc::new(graphql.clone())
        } else {
            Arc::new(RestClient::new(http, base_url))
        };

        info!(
            "WordPress access layer ready: {} via {}",
            config.wp_url,
            content.transport()
        );
        Ok(Self {
            config,
            graphql,
            content,
        })
    }

    /// 使用自定义内容来源，GraphQL 专有操作仍然按配置地址发送
    pub fn with_source(config: Config, content: Arc<dyn ContentSource>) -> Result<Self> {
        let mut service = Self::new(config)?;
        service.content = content;
        Ok(service)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 当前内容查询使用的传输方式
    pub fn transport(&self) -> Transport {
        self.content.transport()
    }

    /// 每页文章数
    pub fn posts_per_page(&self) -> usize {
        self.config.posts_per_page
    }

    /// 分页获取文章，`category_slug` 为空表示全部分类
    pub async fn fetch_posts(&self, page: usize, category_slug: &str) -> Result<PostList> {
        let query = PostQuery::new(page, self.config.posts_per_page).in_category(category_slug);
        debug!(
            "Fetching posts page {} (category: {:?})",
            query.page, query.category
        );
        self.content.fetch_posts(&query).await
    }

    /// 最新文章
    pub async fn fetch_recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let list = self.content.fetch_posts(&PostQuery::new(1, limit)).await?;
        Ok(list.items)
    }

    /// 精选分类下的文章
    pub async fn fetch_featured_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let query = PostQuery::new(1, limit).in_category(FEATURED_CATEGORY);
        let list = self.content.fetch_posts(&query).await?;
        Ok(list.items)
    }

    pub async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.content.fetch_post_by_slug(slug).await
    }

    pub async fn fetch_pages(&self) -> Result<PageList> {
        self.content.fetch_pages().await
    }

    pub async fn fetch_page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        self.content.fetch_page_by_slug(slug).await
    }

    pub async fn fetch_categories(&self, limit: usize) -> Result<Vec<Category>> {
        self.content.fetch_categories(limit).await
    }

    /// 站点信息，失败时返回错误；需要占位值时调用方使用 `SiteInfo::default()`
    pub async fn fetch_site_info(&self) -> Result<SiteInfo> {
        self.content.fetch_site_info().await
    }

    pub async fn fetch_site_logo(&self) -> Result<Option<String>> {
        self.content.fetch_site_logo().await
    }

    pub async fn fetch_menu(&self, location: &str) -> Result<Vec<MenuItem>> {
        self.graphql.fetch_menu(location).await
    }

    pub async fn fetch_site_settings(&self) -> Result<Option<SiteSettings>> {
        self.graphql.fetch_site_settings().await
    }

    pub async fn fetch_contact_form(&self, form_id: u64) -> Result<Option<ContactForm>> {
        self.graphql.fetch_contact_form(form_id).await
    }

    /// 提交联系表单；这是有副作用的操作，不要重复调用
    pub async fn submit_contact_form<I, K, V>(
        &self,
        form_id: u64,
        form_data: I,
    ) -> Result<SubmitFormResult>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.graphql.submit_contact_form(form_id, form_data).await
    }

    /// 创建订单；这是有副作用的操作，不要重复调用
    pub async fn create_order(&self, input: Value) -> Result<OrderResult> {
        self.graphql.create_order(input).await
    }

    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductList> {
        self.graphql.get_products(query).await
    }

    /// 发送任意 GraphQL 请求，返回 `data`
    pub async fn graphql_request(&self, query: &str, variables: Value) -> Result<Value> {
        self.graphql.request(query, variables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_transport_from_config() {
        let rest = WordPress::new(Config::default()).unwrap();
        assert_eq!(rest.transport(), Transport::Rest);

        let graphql = WordPress::new(Config {
            use_graphql: true,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(graphql.transport(), Transport::Graphql);
    }

    #[test]
    fn rejects_malformed_base_url() {
        let err = WordPress::new(Config {
            wp_url: "not a url".into(),
            ..Config::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, WpError::InvalidUrl { .. }));
    }
}
