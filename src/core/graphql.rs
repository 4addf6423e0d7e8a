use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::core::error::{Result, WpError};
use crate::core::mapping::{
    decode, decode_value, GqlCategory, GqlContactForm, GqlMenuItem, GqlOrderPayload, GqlPage,
    GqlPost, GqlProduct, GqlSiteSettings, GqlSubmitResult, Nodes,
};
use crate::core::queries::{self, with_post_fields};
use crate::core::source::{ContentSource, Transport};
use crate::models::{
    Category, ContactForm, MenuItem, OrderResult, Page, PageInfo, PageList, Post, PostList,
    PostQuery, Product, ProductList, ProductQuery, SiteInfo, SiteSettings, SubmitFormResult, Total,
};
use crate::utils::endpoint_url;

/// WPGraphQL 单次查询 `first` 的上限
pub const GRAPHQL_MAX_FIRST: usize = 100;

/// 页面列表一次取的数量
const PAGES_FIRST: usize = 100;

/// 文章分页最多沿游标向后取的条目数，即最多 100 次请求
pub const MAX_CURSOR_WINDOW: usize = 100 * GRAPHQL_MAX_FIRST;

/// GraphQL 响应信封 `{ data, errors? }`
#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<Value>,
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlPageInfo {
    has_next_page: Option<bool>,
    end_cursor: Option<String>,
}

impl From<GqlPageInfo> for PageInfo {
    fn from(info: GqlPageInfo) -> Self {
        PageInfo {
            has_next_page: info.has_next_page.unwrap_or(false),
            end_cursor: info.end_cursor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<T> {
    #[serde(default)]
    page_info: Option<GqlPageInfo>,
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PostsData {
    posts: Option<Connection<GqlPost>>,
}

#[derive(Debug, Deserialize)]
struct PostData {
    post: Option<GqlPost>,
}

#[derive(Debug, Deserialize)]
struct PagesData {
    pages: Option<Connection<GqlPage>>,
}

#[derive(Debug, Deserialize)]
struct PageData {
    page: Option<GqlPage>,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    categories: Option<Nodes<GqlCategory>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteInfoData {
    general_settings: Option<GeneralSettings>,
}

#[derive(Debug, Deserialize)]
struct GeneralSettings {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteLogoData {
    theme_mods: Option<ThemeMods>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeMods {
    custom_logo: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuData {
    menu_items: Option<Nodes<GqlMenuItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteSettingsData {
    theme_options: Option<ThemeOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOptions {
    site_settings: Option<GqlSiteSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactFormData {
    contact_form: Option<GqlContactForm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitFormData {
    submit_form: Option<GqlSubmitResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderData {
    create_order: Option<GqlOrderPayload>,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Option<Nodes<GqlProduct>>,
}

/// 空字符串按缺省处理
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// 取出查询的操作名，只用于日志
fn operation_name(query: &str) -> &str {
    query
        .split_whitespace()
        .skip_while(|word| *word != "query" && *word != "mutation")
        .nth(1)
        .map(|name| name.split(['(', '{']).next().unwrap_or(name))
        .filter(|name| !name.is_empty())
        .unwrap_or("anonymous")
}

/// GraphQL 客户端
///
/// 所有 GraphQL 请求都经过 [`GraphqlClient::request`]，
/// 内容查询之外还提供菜单、表单、订单等只有 GraphQL 才有的操作。
/// 除了文章分页，每个操作只发一次请求；文章的第 `p` 页需要取回前
/// `p * per_page` 条，可能分成多次请求。
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    base_url: Url,
    endpoint: Url,
}

impl GraphqlClient {
    /// 创建客户端，接口地址为 `{base}/graphql`
    pub fn new(http: reqwest::Client, base_url: Url) -> Result<Self> {
        let endpoint = endpoint_url(&base_url, "graphql").map_err(|source| WpError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            base_url,
            endpoint,
        })
    }

    /// GraphQL 接口地址
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// 发送 GraphQL 请求并返回 `data` 字段
    ///
    /// HTTP 状态非 2xx，或响应里带有非空的 `errors`，都会返回错误。
    pub async fn request(&self, query: &str, variables: Value) -> Result<Value> {
        let operation = operation_name(query);
        debug!("POST {} ({})", self.endpoint, operation);

        let body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("API request failed: {}", e);
                WpError::Request(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("GraphQL request failed: {} ({})", status.as_u16(), operation);
            return Err(WpError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let text = response.text().await.map_err(|e| {
            error!("Failed to read GraphQL response: {}", e);
            WpError::Request(e)
        })?;
        let envelope: Envelope = decode("GraphQL response", &text)?;

        if let Some(first) = envelope.errors.unwrap_or_default().into_iter().next() {
            error!("GraphQL Error: {} ({})", first.message, operation);
            return Err(WpError::Graphql {
                message: first.message,
            });
        }

        match envelope.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => {
                error!("GraphQL response for {} has no data", operation);
                Err(WpError::MissingData)
            }
        }
    }

    /// 发送请求并把 `data` 解析成指定类型
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let data = self.request(query, variables).await?;
        decode_value(operation_name(query), data)
    }

    /// 按位置获取菜单，位置名会转成大写
    pub async fn fetch_menu(&self, location: &str) -> Result<Vec<MenuItem>> {
        let data: MenuData = self
            .query(
                queries::MENU_QUERY,
                json!({ "location": location.to_uppercase() }),
            )
            .await?;
        Ok(data
            .menu_items
            .map(|c| c.nodes.into_iter().map(MenuItem::from).collect())
            .unwrap_or_default())
    }

    /// 主题选项中的站点设置
    pub async fn fetch_site_settings(&self) -> Result<Option<SiteSettings>> {
        let data: SiteSettingsData = self
            .query(queries::SITE_SETTINGS_QUERY, json!({}))
            .await?;
        Ok(data
            .theme_options
            .and_then(|o| o.site_settings)
            .map(SiteSettings::from))
    }

    /// 获取联系表单定义
    pub async fn fetch_contact_form(&self, form_id: u64) -> Result<Option<ContactForm>> {
        let data: ContactFormData = self
            .query(
                queries::CONTACT_FORM_QUERY,
                json!({ "id": form_id.to_string() }),
            )
            .await?;
        Ok(data.contact_form.map(ContactForm::from))
    }

    /// 提交联系表单
    ///
    /// 字段按调用方给出的顺序转成 `{key, value}` 列表。
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
        let data: Vec<Value> = form_data
            .into_iter()
            .map(|(key, value)| json!({ "key": key.into(), "value": value.into() }))
            .collect();
        info!("Submitting contact form {} ({} fields)", form_id, data.len());

        let variables = json!({
            "input": {
                "clientMutationId": format!("contact-{}", form_id),
                "formId": form_id,
                "data": data,
            }
        });

        let data: SubmitFormData = self
            .query(queries::SUBMIT_FORM_MUTATION, variables)
            .await?;
        let result = data
            .submit_form
            .map(SubmitFormResult::from)
            .ok_or(WpError::MissingData)?;

        if !result.is_sent() {
            info!(
                "Contact form {} was not sent: {} ({})",
                form_id, result.message, result.status
            );
        }
        Ok(result)
    }

    /// 创建订单
    pub async fn create_order(&self, input: Value) -> Result<OrderResult> {
        let data: CreateOrderData = self
            .query(queries::CREATE_ORDER_MUTATION, json!({ "input": input }))
            .await?;
        data.create_order
            .map(OrderResult::from)
            .ok_or(WpError::MissingData)
    }

    /// 获取商品列表
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductList> {
        let data: ProductsData = self
            .query(
                queries::PRODUCTS_QUERY,
                json!({ "first": query.first, "category": query.category }),
            )
            .await?;
        let items: Vec<Product> = data
            .products
            .map(|c| c.nodes.into_iter().map(Product::from).collect())
            .unwrap_or_default();
        Ok(ProductList {
            total: items.len(),
            items,
        })
    }
}

#[async_trait]
impl ContentSource for GraphqlClient {
    fn transport(&self) -> Transport {
        Transport::Graphql
    }

    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostList> {
        let text = match query.category {
            Some(_) => with_post_fields(queries::POSTS_BY_CATEGORY_QUERY),
            None => with_post_fields(queries::POSTS_QUERY),
        };

        // 游标分页无法直接跳页，取到本页末尾再截掉前面的部分
        let window = query.window();
        if window > MAX_CURSOR_WINDOW {
            error!(
                "Posts page {} is out of range ({} per page)",
                query.page, query.per_page
            );
            return Err(WpError::PageOutOfRange {
                page: query.page,
                per_page: query.per_page,
                limit: MAX_CURSOR_WINDOW,
            });
        }
        let mut nodes: Vec<GqlPost> = Vec::with_capacity(window.min(GRAPHQL_MAX_FIRST));
        let mut after: Option<String> = None;
        let mut page_info = PageInfo::default();

        loop {
            let first = (window - nodes.len()).min(GRAPHQL_MAX_FIRST);
            let mut variables = json!({ "first": first, "after": after });
            if let Some(category) = &query.category {
                variables["category"] = json!(category);
            }

            let data: PostsData = self.query(&text, variables).await?;
            let Some(connection) = data.posts else {
                break;
            };
            let fetched = connection.nodes.len();
            nodes.extend(connection.nodes);
            page_info = connection.page_info.unwrap_or_default().into();

            if !page_info.has_next_page || fetched == 0 || nodes.len() >= window {
                break;
            }
            after = page_info.end_cursor.clone();
            if after.is_none() {
                break;
            }
        }

        let total = if page_info.has_next_page {
            Total::AtLeast(nodes.len() + 1)
        } else {
            Total::Exact(nodes.len())
        };
        let items = nodes
            .into_iter()
            .skip(query.offset())
            .take(query.per_page)
            .map(Post::from)
            .collect();

        Ok(PostList {
            items,
            total,
            page_info: Some(page_info),
        })
    }

    async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let data: PostData = self
            .query(
                &with_post_fields(queries::POST_BY_SLUG_QUERY),
                json!({ "slug": slug }),
            )
            .await?;
        Ok(data.post.map(Post::from))
    }

    async fn fetch_pages(&self) -> Result<PageList> {
        let data: PagesData = self
            .query(queries::PAGES_QUERY, json!({ "first": PAGES_FIRST }))
            .await?;
        let (items, has_next) = match data.pages {
            Some(connection) => (
                connection
                    .nodes
                    .into_iter()
                    .map(Page::from)
                    .collect::<Vec<_>>(),
                connection
                    .page_info
                    .and_then(|p| p.has_next_page)
                    .unwrap_or(false),
            ),
            None => (Vec::new(), false),
        };
        let total = if has_next {
            Total::AtLeast(items.len() + 1)
        } else {
            Total::Exact(items.len())
        };
        Ok(PageList { items, total })
    }

    async fn fetch_page_by_slug(&self, slug: &str) -> Result<Option<Page>> {
        let data: PageData = self
            .query(queries::PAGE_BY_SLUG_QUERY, json!({ "slug": slug }))
            .await?;
        Ok(data.page.map(Page::from))
    }

    async fn fetch_categories(&self, limit: usize) -> Result<Vec<Category>> {
        let data: CategoriesData = self
            .query(queries::CATEGORIES_QUERY, json!({ "first": limit }))
            .await?;
        Ok(data
            .categories
            .map(|c| c.nodes.into_iter().map(Category::from).collect())
            .unwrap_or_default())
    }

    async fn fetch_site_info(&self) -> Result<SiteInfo> {
        let data: SiteInfoData = self.query(queries::SITE_INFO_QUERY, json!({})).await?;
        let defaults = SiteInfo::default();
        Ok(match data.general_settings {
            Some(settings) => SiteInfo {
                title: non_empty(settings.title).unwrap_or(defaults.title),
                description: settings.description.unwrap_or_default(),
                url: settings.url.unwrap_or_default(),
                logo: None,
            },
            None => defaults,
        })
    }

    async fn fetch_site_logo(&self) -> Result<Option<String>> {
        let data: SiteLogoData = self.query(queries::SITE_LOGO_QUERY, json!({})).await?;
        let logo = match data.theme_mods.and_then(|m| m.custom_logo) {
            Some(Value::String(s)) if !s.is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return Ok(None),
        };
        Ok(Some(format!(
            "{}/wp-content/uploads/{}",
            self.base_url.as_str().trim_end_matches('/'),
            logo
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_name_reads_first_definition() {
        assert_eq!(operation_name(queries::POSTS_QUERY), "Posts");
        assert_eq!(operation_name(queries::SUBMIT_FORM_MUTATION), "SubmitContactForm");
        assert_eq!(operation_name("query SiteInfo { generalSettings { title } }"), "SiteInfo");
        assert_eq!(operation_name("{ viewer { id } }"), "anonymous");
    }

    #[test]
    fn endpoint_is_graphql_under_base() {
        let client = GraphqlClient::new(
            reqwest::Client::new(),
            Url::parse("https://cms.example.com/wp").unwrap(),
        )
        .unwrap();
        assert_eq!(client.endpoint().as_str(), "https://cms.example.com/wp/graphql");
    }
}
