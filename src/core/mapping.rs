//! 线上数据结构到统一实体的映射。
//!
//! GraphQL 和 REST 返回的 JSON 形状不同，这里为每种实体各写一个小的转换，
//! 让两个传输实现都产出同样的 `models` 类型。

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::core::error::{Result, WpError};
use crate::models::types::SUBMIT_FAILED_MESSAGE;
use crate::models::{
    Category, ContactForm, FormField, Image, MenuItem, Order, OrderResult, Page, Post, Product,
    SiteSettings, SocialLink, SubmitFormResult, TermRef,
};

/// 解析响应体，失败时记录日志
pub(crate) fn decode<T: DeserializeOwned>(context: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| {
        error!("Failed to decode {}: {}", context, source);
        WpError::Decode {
            context: context.to_string(),
            source,
        }
    })
}

/// 从已解析的 JSON 值中取出目标类型
pub(crate) fn decode_value<T: DeserializeOwned>(context: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| {
        error!("Failed to decode {}: {}", context, source);
        WpError::Decode {
            context: context.to_string(),
            source,
        }
    })
}

// ---------------------------------------------------------------------------
// GraphQL
// ---------------------------------------------------------------------------

/// `{ nodes: [...] }` 连接
#[derive(Debug, Deserialize)]
pub(crate) struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

/// `{ node: {...} }` 边
#[derive(Debug, Deserialize)]
pub(crate) struct Node<T> {
    pub node: Option<T>,
}

fn nodes_or_empty<T>(conn: Option<Nodes<T>>) -> Vec<T> {
    conn.map(|c| c.nodes).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlImage {
    pub source_url: Option<String>,
    pub alt_text: Option<String>,
}

impl GqlImage {
    fn into_image(self) -> Option<Image> {
        Some(Image {
            source_url: self.source_url.filter(|u| !u.is_empty())?,
            alt_text: self.alt_text.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GqlTerm {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl From<GqlTerm> for TermRef {
    fn from(term: GqlTerm) -> Self {
        TermRef {
            name: term.name.unwrap_or_default(),
            slug: term.slug.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GqlAuthor {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlPost {
    pub id: String,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
    pub featured_image: Option<Node<GqlImage>>,
    pub categories: Option<Nodes<GqlTerm>>,
    pub tags: Option<Nodes<GqlTerm>>,
    pub author: Option<Node<GqlAuthor>>,
}

impl From<GqlPost> for Post {
    fn from(post: GqlPost) -> Self {
        Post {
            id: post.id,
            title: post.title.unwrap_or_default(),
            excerpt: post.excerpt.unwrap_or_default(),
            content: post.content.unwrap_or_default(),
            date: post.date.unwrap_or_default(),
            slug: post.slug.unwrap_or_default(),
            featured_image: post
                .featured_image
                .and_then(|edge| edge.node)
                .and_then(GqlImage::into_image),
            categories: nodes_or_empty(post.categories)
                .into_iter()
                .map(TermRef::from)
                .collect(),
            author: post
                .author
                .and_then(|edge| edge.node)
                .and_then(|a| a.name),
            tags: nodes_or_empty(post.tags).into_iter().map(TermRef::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlPage {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub featured_image: Option<Node<GqlImage>>,
}

impl From<GqlPage> for Page {
    fn from(page: GqlPage) -> Self {
        Page {
            id: page.id,
            title: page.title.unwrap_or_default(),
            content: page.content.unwrap_or_default(),
            slug: page.slug.unwrap_or_default(),
            date: page.date.unwrap_or_default(),
            featured_image: page
                .featured_image
                .and_then(|edge| edge.node)
                .and_then(GqlImage::into_image),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GqlCategory {
    pub id: String,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub count: Option<u64>,
}

impl From<GqlCategory> for Category {
    fn from(cat: GqlCategory) -> Self {
        Category {
            id: cat.id,
            name: cat.name.unwrap_or_default(),
            slug: cat.slug.unwrap_or_default(),
            count: cat.count.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlMenuItem {
    pub id: String,
    pub label: Option<String>,
    pub url: Option<String>,
    pub path: Option<String>,
    pub child_items: Option<Nodes<GqlMenuItem>>,
}

impl From<GqlMenuItem> for MenuItem {
    fn from(item: GqlMenuItem) -> Self {
        MenuItem {
            id: item.id,
            label: item.label.unwrap_or_default(),
            url: item.url.unwrap_or_default(),
            path: item.path.unwrap_or_default(),
            children: nodes_or_empty(item.child_items)
                .into_iter()
                .map(MenuItem::from)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GqlSocialLink {
    pub platform: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlSiteSettings {
    pub logo: Option<GqlImage>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub social_media: Option<Vec<GqlSocialLink>>,
    pub company_address: Option<String>,
}

impl From<GqlSiteSettings> for SiteSettings {
    fn from(settings: GqlSiteSettings) -> Self {
        SiteSettings {
            logo: settings.logo.and_then(GqlImage::into_image),
            phone_number: settings.phone_number,
            email: settings.email,
            social_media: settings
                .social_media
                .unwrap_or_default()
                .into_iter()
                .filter_map(|link| {
                    Some(SocialLink {
                        platform: link.platform?,
                        url: link.url?,
                    })
                })
                .collect(),
            company_address: settings.company_address,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlFormField {
    pub field_name: String,
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Value>,
    pub placeholder: Option<String>,
}

impl From<GqlFormField> for FormField {
    fn from(field: GqlFormField) -> Self {
        FormField {
            field_name: field.field_name,
            field_type: field.field_type.unwrap_or_else(|| "text".to_string()),
            required: field.required.unwrap_or(false),
            options: field.options.map(options_list).unwrap_or_default(),
            placeholder: field.placeholder.filter(|p| !p.is_empty()),
        }
    }
}

/// 表单选项可能是字符串、数组或 null
fn options_list(value: Value) -> Vec<String> {
    match value {
        Value::String(s) if s.is_empty() => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlContactForm {
    pub form_id: Value,
    pub title: Option<String>,
    pub form_fields: Option<Vec<GqlFormField>>,
}

impl From<GqlContactForm> for ContactForm {
    fn from(form: GqlContactForm) -> Self {
        let form_id = match &form.form_id {
            Value::Number(n) => n.as_u64().unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };
        ContactForm {
            form_id,
            title: form.title.unwrap_or_default(),
            form_fields: form
                .form_fields
                .unwrap_or_default()
                .into_iter()
                .map(FormField::from)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlSubmitResult {
    pub client_mutation_id: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl From<GqlSubmitResult> for SubmitFormResult {
    fn from(result: GqlSubmitResult) -> Self {
        let status = result
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "error".to_string());
        let mut message = result.message.unwrap_or_default();
        if status != crate::models::types::MAIL_SENT && message.trim().is_empty() {
            message = SUBMIT_FAILED_MESSAGE.to_string();
        }
        SubmitFormResult {
            client_mutation_id: result.client_mutation_id,
            status,
            message,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlProduct {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub regular_price: Option<String>,
    pub sale_price: Option<String>,
    pub stock_status: Option<String>,
    pub image: Option<GqlImage>,
}

impl From<GqlProduct> for Product {
    fn from(p: GqlProduct) -> Self {
        Product {
            id: p.id,
            name: p.name.unwrap_or_default(),
            description: p.description,
            price: p.price,
            regular_price: p.regular_price,
            sale_price: p.sale_price,
            stock_status: p.stock_status,
            image: p.image.and_then(GqlImage::into_image),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlOrder {
    pub id: String,
    pub order_number: Option<Value>,
    pub status: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GqlOrderPayload {
    pub client_mutation_id: Option<String>,
    pub order: Option<GqlOrder>,
}

impl From<GqlOrderPayload> for OrderResult {
    fn from(payload: GqlOrderPayload) -> Self {
        OrderResult {
            client_mutation_id: payload.client_mutation_id,
            order: payload.order.map(|o| Order {
                id: o.id,
                order_number: o.order_number.map(|n| match n {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
                status: o.status,
                total: o.total,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// REST
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestMedia {
    pub source_url: Option<String>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestTerm {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub taxonomy: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestAuthor {
    pub name: Option<String>,
}

/// `_embed=1` 时附带的关联资源
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Embedded {
    #[serde(rename = "wp:featuredmedia", default)]
    pub featured_media: Vec<RestMedia>,
    #[serde(rename = "wp:term", default)]
    pub terms: Vec<Vec<RestTerm>>,
    #[serde(default)]
    pub author: Vec<RestAuthor>,
}

impl Embedded {
    fn featured_image(&mut self) -> Option<Image> {
        let media = self.featured_media.drain(..).next()?;
        Some(Image {
            source_url: media.source_url.filter(|u| !u.is_empty())?,
            alt_text: media.alt_text.unwrap_or_default(),
        })
    }

    fn terms_in(&self, taxonomy: &str) -> Vec<TermRef> {
        self.terms
            .iter()
            .flatten()
            .filter(|t| t.taxonomy == taxonomy)
            .map(|t| TermRef {
                name: t.name.clone(),
                slug: t.slug.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestPost {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub excerpt: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(rename = "_embedded")]
    pub embedded: Option<Embedded>,
}

impl From<RestPost> for Post {
    fn from(post: RestPost) -> Self {
        let mut embedded = post.embedded.unwrap_or_default();
        let author = std::mem::take(&mut embedded.author)
            .into_iter()
            .next()
            .and_then(|a| a.name);
        Post {
            id: post.id.to_string(),
            title: post.title.rendered,
            excerpt: post.excerpt.rendered,
            content: post.content.rendered,
            date: post.date,
            slug: post.slug,
            featured_image: embedded.featured_image(),
            categories: embedded.terms_in("category"),
            author,
            tags: embedded.terms_in("post_tag"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestPage {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub content: Rendered,
    #[serde(rename = "_embedded")]
    pub embedded: Option<Embedded>,
}

impl From<RestPage> for Page {
    fn from(page: RestPage) -> Self {
        Page {
            id: page.id.to_string(),
            title: page.title.rendered,
            content: page.content.rendered,
            slug: page.slug,
            date: page.date,
            featured_image: page.embedded.unwrap_or_default().featured_image(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub count: u64,
}

impl From<RestCategory> for Category {
    fn from(cat: RestCategory) -> Self {
        Category {
            id: cat.id.to_string(),
            name: cat.name,
            slug: cat.slug,
            count: cat.count,
        }
    }
}

/// `/wp/v2/settings` 用 `title`，站点根索引用 `name`
#[derive(Debug, Deserialize)]
pub(crate) struct RestSettings {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RestThemeMods {
    pub custom_logo: Option<Value>,
}

impl RestThemeMods {
    pub fn logo(self) -> Option<String> {
        match self.custom_logo? {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}
