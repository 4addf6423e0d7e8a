use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 联系表单提交成功时后端返回的状态
pub const MAIL_SENT: &str = "mail_sent";

/// 提交失败且后端没有给出消息时使用的默认消息
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to send message";

/// 特色图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// 图片地址
    pub source_url: String,
    /// 替代文本
    pub alt_text: String,
}

/// 文章上挂载的分类或标签引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRef {
    pub name: String,
    pub slug: String,
}

/// 博客文章
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// 文章 ID（REST 的数字 ID 会转成字符串）
    pub id: String,
    /// 文章标题
    pub title: String,
    /// 文章摘要（HTML）
    pub excerpt: String,
    /// 文章内容（HTML）
    pub content: String,
    /// 发布时间，WordPress 站点本地时间，不带时区
    pub date: String,
    /// 文章别名
    pub slug: String,
    /// 特色图片
    pub featured_image: Option<Image>,
    /// 文章分类，保持后端顺序
    pub categories: Vec<TermRef>,
    /// 作者名称
    pub author: Option<String>,
    /// 文章标签
    pub tags: Vec<TermRef>,
}

impl Post {
    /// 解析发布时间
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        parse_wp_date(&self.date)
    }
}

/// 页面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub date: String,
    pub featured_image: Option<Image>,
}

/// 分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// 该分类下的文章数量
    pub count: u64,
}

/// 菜单项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub url: String,
    pub path: String,
    /// 子菜单，只有一层
    pub children: Vec<MenuItem>,
}

/// 站点基本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub url: String,
    pub logo: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "YourSite".to_string(),
            description: String::new(),
            url: String::new(),
            logo: None,
        }
    }
}

/// 社交媒体链接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// 主题选项中的站点设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub logo: Option<Image>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub social_media: Vec<SocialLink>,
    pub company_address: Option<String>,
}

/// 表单字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub field_name: String,
    pub field_type: String,
    pub required: bool,
    pub options: Vec<String>,
    pub placeholder: Option<String>,
}

/// 联系表单定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub form_id: u64,
    pub title: String,
    pub form_fields: Vec<FormField>,
}

/// 联系表单提交结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormResult {
    pub client_mutation_id: Option<String>,
    pub status: String,
    pub message: String,
}

impl SubmitFormResult {
    /// 是否发送成功
    pub fn is_sent(&self) -> bool {
        self.status == MAIL_SENT
    }

    /// 请求本身失败时给调用方展示的结果
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            client_mutation_id: None,
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// 商品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
    pub regular_price: Option<String>,
    pub sale_price: Option<String>,
    pub stock_status: Option<String>,
    pub image: Option<Image>,
}

/// 订单摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: Option<String>,
    pub status: Option<String>,
    pub total: Option<String>,
}

/// 创建订单的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub client_mutation_id: Option<String>,
    pub order: Option<Order>,
}

/// 游标分页信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// 列表总数
///
/// GraphQL 接口不返回真实总数，只能知道"至少还有更多"，
/// 这种情况用 `AtLeast` 表示，避免把下限当成精确值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Total {
    Exact(usize),
    AtLeast(usize),
}

impl Total {
    /// 数值（下限时返回下限）
    pub fn value(&self) -> usize {
        match self {
            Total::Exact(n) | Total::AtLeast(n) => *n,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Total::Exact(_))
    }
}

/// 文章列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostList {
    pub items: Vec<Post>,
    pub total: Total,
    pub page_info: Option<PageInfo>,
}

impl PostList {
    /// 按每页数量计算总页数
    pub fn total_pages(&self, per_page: usize) -> usize {
        if per_page == 0 {
            return 0;
        }
        self.total.value().div_ceil(per_page)
    }
}

/// 页面列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageList {
    pub items: Vec<Page>,
    pub total: Total,
}

/// 商品列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub items: Vec<Product>,
    pub total: usize,
}

/// 文章查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// 页码，从 1 开始
    pub page: usize,
    /// 每页数量
    pub per_page: usize,
    /// 分类别名，`None` 表示不过滤
    pub category: Option<String>,
}

impl PostQuery {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            category: None,
        }
    }

    /// 空字符串视为不过滤
    pub fn in_category(mut self, slug: &str) -> Self {
        let slug = slug.trim();
        self.category = if slug.is_empty() {
            None
        } else {
            Some(slug.to_string())
        };
        self
    }

    /// 跳过的条目数
    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page.max(1))
    }

    /// 从第一条到本页最后一条的窗口大小，溢出时取 `usize::MAX`
    pub fn window(&self) -> usize {
        self.page.max(1).saturating_mul(self.per_page.max(1))
    }
}

/// 商品查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub first: usize,
    pub category: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            first: 12,
            category: None,
        }
    }
}

/// 解析 WordPress 日期，兼容带或不带时区的格式
pub fn parse_wp_date(date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(date)
                .ok()
                .map(|d| d.naive_local())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_query_treats_page_zero_as_first_page() {
        let query = PostQuery::new(0, 6);
        assert_eq!(query.page, 1);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.window(), 6);
    }

    #[test]
    fn post_query_window_grows_with_page() {
        let query = PostQuery::new(3, 6).in_category("news");
        assert_eq!(query.offset(), 12);
        assert_eq!(query.window(), 18);
        assert_eq!(query.category.as_deref(), Some("news"));
    }

    #[test]
    fn post_query_window_saturates() {
        let query = PostQuery::new(usize::MAX, 6);
        assert_eq!(query.window(), usize::MAX);
        assert_eq!(query.offset(), usize::MAX);

        let query = PostQuery::new(usize::MAX / 2, usize::MAX / 2);
        assert_eq!(query.window(), usize::MAX);
    }

    #[test]
    fn blank_category_means_no_filter() {
        assert_eq!(PostQuery::new(1, 6).in_category("  ").category, None);
    }

    #[test]
    fn total_pages_rounds_up() {
        let list = PostList {
            items: Vec::new(),
            total: Total::Exact(13),
            page_info: None,
        };
        assert_eq!(list.total_pages(6), 3);
        assert_eq!(list.total_pages(0), 0);
    }

    #[test]
    fn total_serializes_with_kind() {
        let json = serde_json::to_value(Total::AtLeast(7)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "atLeast", "value": 7}));
    }

    #[test]
    fn site_info_default_matches_placeholder_site() {
        let info = SiteInfo::default();
        assert_eq!(info.title, "YourSite");
        assert!(info.description.is_empty());
        assert!(info.logo.is_none());
    }

    #[test]
    fn submit_result_success_only_on_mail_sent() {
        let ok = SubmitFormResult {
            client_mutation_id: Some("contact-3".into()),
            status: MAIL_SENT.into(),
            message: "Thanks".into(),
        };
        assert!(ok.is_sent());
        assert!(!SubmitFormResult::failed("boom").is_sent());
    }

    #[test]
    fn parses_wordpress_dates() {
        let date = parse_wp_date("2024-03-01T10:15:00").unwrap();
        assert_eq!(date.to_string(), "2024-03-01 10:15:00");
        assert!(parse_wp_date("2024-03-01T10:15:00+02:00").is_some());
        assert!(parse_wp_date("yesterday").is_none());
    }
}
