use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::Result;
use crate::models::{Category, Page, PageList, Post, PostList, PostQuery, SiteInfo};

/// 传输方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Graphql,
    Rest,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Graphql => write!(f, "graphql"),
            Transport::Rest => write!(f, "rest"),
        }
    }
}

/// 内容来源，GraphQL 和 REST 各有一个实现
///
/// 两个实现返回同样的实体类型，调用方不需要关心数据走的是哪条通道。
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// 当前实现使用的传输方式
    fn transport(&self) -> Transport;

    /// 分页获取文章，可按分类过滤
    ///
    /// GraphQL 只能沿游标向后翻，靠后的页会发出多次请求（每次最多 100 条）；
    /// 超过 [`MAX_CURSOR_WINDOW`](crate::core::graphql::MAX_CURSOR_WINDOW) 条的页直接返回
    /// [`WpError::PageOutOfRange`](crate::core::WpError::PageOutOfRange)。
    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostList>;

    /// 按别名获取文章，不存在时返回 `None`
    async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// 获取所有页面
    async fn fetch_pages(&self) -> Result<PageList>;

    /// 按别名获取页面，不存在时返回 `None`
    async fn fetch_page_by_slug(&self, slug: &str) -> Result<Option<Page>>;

    /// 获取分类列表
    async fn fetch_categories(&self, limit: usize) -> Result<Vec<Category>>;

    /// 获取站点标题、描述和地址
    async fn fetch_site_info(&self) -> Result<SiteInfo>;

    /// 获取站点 Logo 地址，未设置时返回 `None`
    async fn fetch_site_logo(&self) -> Result<Option<String>>;
}
