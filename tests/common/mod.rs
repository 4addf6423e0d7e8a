//! 测试用的假 WordPress，同时提供 GraphQL 和 REST 两种接口。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use wp_headless::models::Config;
use wp_headless::WordPress;

#[derive(Debug, Clone)]
pub struct FixturePost {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub date: String,
    pub category: (u64, String, String),
    pub tag: (String, String),
    pub author: String,
    pub image: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct FixturePage {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub date: String,
}

/// 假站点的数据和行为开关
pub struct FakeWordPress {
    pub posts: Vec<FixturePost>,
    pub pages: Vec<FixturePage>,
    /// 所有路由都返回这个状态码
    pub fail_status: Option<u16>,
    /// GraphQL 返回 `errors`
    pub graphql_error: Option<String>,
    pub submit_status: String,
    pub submit_message: String,
    /// `None` 时 `theme-mods` 路由返回 404
    pub custom_logo: Option<String>,
    pub graphql_calls: Mutex<Vec<Value>>,
    pub rest_calls: Mutex<Vec<String>>,
}

const CATEGORIES: [(u64, &str, &str); 2] = [(2, "Featured", "featured"), (3, "News", "news")];

pub fn make_posts(count: usize) -> Vec<FixturePost> {
    (1..=count as u64)
        .map(|i| {
            let (cat_id, cat_name, cat_slug) = if i <= 2 { CATEGORIES[0] } else { CATEGORIES[1] };
            FixturePost {
                id: i,
                title: format!("Post {}", i),
                slug: format!("post-{}", i),
                excerpt: format!("<p>Excerpt {}</p>", i),
                content: format!("<p>Content of post {}</p>", i),
                date: format!("2024-01-{:02}T10:00:00", (i % 28) + 1),
                category: (cat_id, cat_name.to_string(), cat_slug.to_string()),
                tag: ("Rust".to_string(), "rust".to_string()),
                author: "Ada".to_string(),
                image: (i % 2 == 1).then(|| {
                    (
                        format!("https://cdn.fake.test/post-{}.jpg", i),
                        format!("Cover {}", i),
                    )
                }),
            }
        })
        .collect()
}

fn default_pages() -> Vec<FixturePage> {
    vec![
        FixturePage {
            id: 10,
            title: "About Us".to_string(),
            slug: "about".to_string(),
            content: "<p>We build things.</p>".to_string(),
            date: "2023-05-01T09:00:00".to_string(),
        },
        FixturePage {
            id: 11,
            title: "Services".to_string(),
            slug: "services".to_string(),
            content: "<p>What we offer.</p>".to_string(),
            date: "2023-05-02T09:00:00".to_string(),
        },
    ]
}

impl Default for FakeWordPress {
    fn default() -> Self {
        Self {
            posts: make_posts(6),
            pages: default_pages(),
            fail_status: None,
            graphql_error: None,
            submit_status: "mail_sent".to_string(),
            submit_message: "Thank you for your message.".to_string(),
            custom_logo: Some("2024/01/logo.png".to_string()),
            graphql_calls: Mutex::new(Vec::new()),
            rest_calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeWordPress {
    pub fn with_posts(count: usize) -> Self {
        Self {
            posts: make_posts(count),
            ..Self::default()
        }
    }

    /// 在随机端口启动，返回站点地址
    pub async fn spawn(self) -> (String, Arc<Self>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let fake = Arc::new(self);

        let app = Router::new()
            .route("/graphql", post(graphql))
            .route("/wp-json/wp/v2/posts", get(rest_posts))
            .route("/wp-json/wp/v2/pages", get(rest_pages))
            .route("/wp-json/wp/v2/categories", get(rest_categories))
            .route("/wp-json/wp/v2/settings", get(rest_settings))
            .route("/wp-json/wp/v2/theme-mods", get(rest_theme_mods))
            .with_state(fake.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), fake)
    }

    pub fn graphql_calls(&self) -> Vec<Value> {
        self.graphql_calls.lock().unwrap().clone()
    }

    pub fn rest_calls(&self) -> Vec<String> {
        self.rest_calls.lock().unwrap().clone()
    }

    fn category_count(&self, slug: &str) -> usize {
        self.posts.iter().filter(|p| p.category.2 == slug).count()
    }
}

/// 指向假站点的访问层
pub fn wordpress(base_url: &str, use_graphql: bool, posts_per_page: usize) -> WordPress {
    WordPress::new(Config {
        wp_url: base_url.to_string(),
        use_graphql,
        posts_per_page,
        timeout_secs: Some(10),
    })
    .unwrap()
}

fn gql_post(post: &FixturePost) -> Value {
    json!({
        "id": format!("cG9zdDo{}", post.id),
        "title": post.title,
        "excerpt": post.excerpt,
        "content": post.content,
        "date": post.date,
        "slug": post.slug,
        "featuredImage": post.image.as_ref().map(|(url, alt)| json!({
            "node": {"sourceUrl": url, "altText": alt}
        })),
        "categories": {"nodes": [{"name": post.category.1, "slug": post.category.2}]},
        "tags": {"nodes": [{"name": post.tag.0, "slug": post.tag.1}]},
        "author": {"node": {"name": post.author}}
    })
}

fn rest_post(post: &FixturePost) -> Value {
    let media: Vec<Value> = post
        .image
        .iter()
        .map(|(url, alt)| json!({"id": 900 + post.id, "source_url": url, "alt_text": alt}))
        .collect();
    json!({
        "id": post.id,
        "date": post.date,
        "slug": post.slug,
        "status": "publish",
        "title": {"rendered": post.title},
        "excerpt": {"rendered": post.excerpt, "protected": false},
        "content": {"rendered": post.content, "protected": false},
        "_embedded": {
            "author": [{"id": 1, "name": post.author}],
            "wp:featuredmedia": media,
            "wp:term": [
                [{"id": post.category.0, "name": post.category.1, "slug": post.category.2, "taxonomy": "category"}],
                [{"id": 50, "name": post.tag.0, "slug": post.tag.1, "taxonomy": "post_tag"}]
            ]
        }
    })
}

fn gql_page(page: &FixturePage) -> Value {
    json!({
        "id": format!("cGFnZTo{}", page.id),
        "title": page.title,
        "content": page.content,
        "slug": page.slug,
        "date": page.date,
        "featuredImage": null
    })
}

fn rest_page(page: &FixturePage) -> Value {
    json!({
        "id": page.id,
        "date": page.date,
        "slug": page.slug,
        "title": {"rendered": page.title},
        "content": {"rendered": page.content, "protected": false}
    })
}

fn failure(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    (status, Json(json!({"code": "fake_failure", "message": "forced failure"}))).into_response()
}

fn cursor_start(after: &Value) -> usize {
    after
        .as_str()
        .and_then(|c| c.strip_prefix("cursor:"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

async fn graphql(State(fake): State<Arc<FakeWordPress>>, Json(body): Json<Value>) -> Response {
    fake.graphql_calls.lock().unwrap().push(body.clone());

    if let Some(status) = fake.fail_status {
        return failure(status);
    }
    if let Some(message) = &fake.graphql_error {
        return Json(json!({"data": null, "errors": [{"message": message}]})).into_response();
    }

    let query = body["query"].as_str().unwrap_or_default();
    let vars = &body["variables"];

    let data = if query.contains("query Posts(") || query.contains("query PostsByCategory(") {
        let filtered: Vec<&FixturePost> = match vars["category"].as_str() {
            Some(cat) => fake.posts.iter().filter(|p| p.category.2 == cat).collect(),
            None => fake.posts.iter().collect(),
        };
        let first = vars["first"].as_u64().unwrap_or(10).min(100) as usize;
        let start = cursor_start(&vars["after"]).min(filtered.len());
        let end = (start + first).min(filtered.len());
        json!({
            "posts": {
                "pageInfo": {
                    "hasNextPage": end < filtered.len(),
                    "endCursor": format!("cursor:{}", end)
                },
                "nodes": filtered[start..end].iter().map(|p| gql_post(p)).collect::<Vec<_>>()
            }
        })
    } else if query.contains("query PostBySlug(") {
        let slug = vars["slug"].as_str().unwrap_or_default();
        json!({"post": fake.posts.iter().find(|p| p.slug == slug).map(gql_post)})
    } else if query.contains("query Pages(") {
        json!({
            "pages": {
                "pageInfo": {"hasNextPage": false, "endCursor": null},
                "nodes": fake.pages.iter().map(gql_page).collect::<Vec<_>>()
            }
        })
    } else if query.contains("query PageBySlug(") {
        let uri = vars["slug"].as_str().unwrap_or_default().trim_matches('/');
        json!({"page": fake.pages.iter().find(|p| p.slug == uri).map(gql_page)})
    } else if query.contains("query Categories(") {
        let first = vars["first"].as_u64().unwrap_or(10) as usize;
        let nodes: Vec<Value> = CATEGORIES
            .iter()
            .take(first)
            .map(|(id, name, slug)| {
                json!({
                    "id": format!("dGVybTo{}", id),
                    "name": name,
                    "slug": slug,
                    "count": fake.category_count(slug)
                })
            })
            .collect();
        json!({"categories": {"nodes": nodes}})
    } else if query.contains("query SiteInfo") {
        json!({"generalSettings": {"title": "Fake Site", "description": "Just testing", "url": "https://fake.test"}})
    } else if query.contains("query SiteLogo") {
        json!({"themeMods": {"customLogo": fake.custom_logo}})
    } else if query.contains("query GetMenu(") {
        let nodes = if vars["location"] == "PRIMARY" {
            json!([
                {"id": "m1", "label": "Home", "url": "https://fake.test/", "path": "/", "childItems": {"nodes": []}},
                {"id": "m2", "label": "Services", "url": "https://fake.test/services", "path": "/services",
                 "childItems": {"nodes": [
                    {"id": "m3", "label": "Web", "url": "https://fake.test/web", "path": "/web"},
                    {"id": "m4", "label": "SEO", "url": "https://fake.test/seo", "path": "/seo"}
                 ]}}
            ])
        } else {
            json!([])
        };
        json!({"menuItems": {"nodes": nodes}})
    } else if query.contains("query SiteSettings") {
        json!({
            "themeOptions": {
                "siteSettings": {
                    "logo": {"sourceUrl": "https://fake.test/logo.svg", "altText": "Fake"},
                    "phoneNumber": "+1 555 0100",
                    "email": "hello@fake.test",
                    "socialMedia": [
                        {"platform": "github", "url": "https://github.com/fake"},
                        {"platform": null, "url": "https://broken.test"}
                    ],
                    "companyAddress": "1 Fake Street"
                }
            }
        })
    } else if query.contains("query GetContactForm(") {
        let form = (vars["id"] == "5").then(|| {
            json!({
                "formId": 5,
                "title": "Contact us",
                "formFields": [
                    {"fieldName": "your-name", "fieldType": "text", "required": true, "options": null, "placeholder": "Name"},
                    {"fieldName": "your-email", "fieldType": "email", "required": true, "options": null, "placeholder": ""},
                    {"fieldName": "topic", "fieldType": "select", "required": false, "options": ["Sales", "Support"], "placeholder": null},
                    {"fieldName": "your-message", "fieldType": "textarea", "required": false, "options": "", "placeholder": "Message"}
                ]
            })
        });
        json!({"contactForm": form})
    } else if query.contains("mutation SubmitContactForm(") {
        json!({
            "submitForm": {
                "clientMutationId": vars["input"]["clientMutationId"],
                "status": fake.submit_status,
                "message": fake.submit_message
            }
        })
    } else if query.contains("mutation CreateOrder(") {
        json!({
            "createOrder": {
                "clientMutationId": vars["input"]["clientMutationId"],
                "order": {"id": "b3JkZXI6MQ", "orderNumber": 1001, "status": "PENDING", "total": "$20.00"}
            }
        })
    } else if query.contains("query Products(") {
        let all = [
            ("cHJvZHVjdDox", "Mug", "kitchen", "$10.00"),
            ("cHJvZHVjdDoy", "Shirt", "clothing", "$20.00"),
            ("cHJvZHVjdDoz", "Plate", "kitchen", "$12.00"),
        ];
        let first = vars["first"].as_u64().unwrap_or(10) as usize;
        let nodes: Vec<Value> = all
            .iter()
            .filter(|(_, _, cat, _)| vars["category"].as_str().map_or(true, |c| c == *cat))
            .take(first)
            .map(|(id, name, _, price)| {
                json!({
                    "id": id, "name": name, "description": null, "price": price,
                    "regularPrice": price, "salePrice": null, "stockStatus": "IN_STOCK",
                    "image": {"sourceUrl": format!("https://cdn.fake.test/{}.png", name), "altText": name}
                })
            })
            .collect();
        json!({"products": {"nodes": nodes}})
    } else if query.contains("generalSettings") {
        json!({"generalSettings": {"title": "Fake Site"}})
    } else {
        return Json(json!({"errors": [{"message": "Cannot query unknown field"}]})).into_response();
    };

    Json(json!({ "data": data })).into_response()
}

fn record(fake: &FakeWordPress, uri: &Uri) {
    fake.rest_calls.lock().unwrap().push(uri.to_string());
}

fn paged<T: Clone>(items: &[T], params: &HashMap<String, String>) -> Result<(Vec<T>, usize, usize), Response> {
    let per_page: usize = params.get("per_page").and_then(|v| v.parse().ok()).unwrap_or(10);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    if page > 1 && page > total_pages {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"code": "rest_post_invalid_page_number"})),
        )
            .into_response());
    }
    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);
    Ok((items[start..end].to_vec(), total, total_pages))
}

fn with_totals(items: Vec<Value>, total: usize, total_pages: usize) -> Response {
    (
        [
            ("x-wp-total", total.to_string()),
            ("x-wp-totalpages", total_pages.to_string()),
        ],
        Json(items),
    )
        .into_response()
}

async fn rest_posts(
    State(fake): State<Arc<FakeWordPress>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&fake, &uri);
    if let Some(status) = fake.fail_status {
        return failure(status);
    }

    let filtered: Vec<FixturePost> = fake
        .posts
        .iter()
        .filter(|p| params.get("slug").map_or(true, |s| &p.slug == s))
        .filter(|p| {
            params
                .get("categories")
                .map_or(true, |id| p.category.0.to_string() == *id)
        })
        .cloned()
        .collect();

    match paged(&filtered, &params) {
        Ok((items, total, pages)) => with_totals(items.iter().map(rest_post).collect(), total, pages),
        Err(response) => response,
    }
}

async fn rest_pages(
    State(fake): State<Arc<FakeWordPress>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&fake, &uri);
    if let Some(status) = fake.fail_status {
        return failure(status);
    }

    let filtered: Vec<FixturePage> = fake
        .pages
        .iter()
        .filter(|p| params.get("slug").map_or(true, |s| &p.slug == s))
        .cloned()
        .collect();

    match paged(&filtered, &params) {
        Ok((items, total, pages)) => with_totals(items.iter().map(rest_page).collect(), total, pages),
        Err(response) => response,
    }
}

async fn rest_categories(
    State(fake): State<Arc<FakeWordPress>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&fake, &uri);
    if let Some(status) = fake.fail_status {
        return failure(status);
    }

    let items: Vec<Value> = CATEGORIES
        .iter()
        .filter(|(_, _, slug)| params.get("slug").map_or(true, |s| s.as_str() == *slug))
        .map(|(id, name, slug)| {
            json!({"id": id, "name": name, "slug": slug, "count": fake.category_count(slug), "taxonomy": "category"})
        })
        .collect();
    let total = items.len();
    with_totals(items, total, 1)
}

async fn rest_settings(State(fake): State<Arc<FakeWordPress>>, uri: Uri) -> Response {
    record(&fake, &uri);
    if let Some(status) = fake.fail_status {
        return failure(status);
    }
    Json(json!({"title": "Fake Site", "description": "Just testing", "url": "https://fake.test"}))
        .into_response()
}

async fn rest_theme_mods(State(fake): State<Arc<FakeWordPress>>, uri: Uri) -> Response {
    record(&fake, &uri);
    if let Some(status) = fake.fail_status {
        return failure(status);
    }
    match &fake.custom_logo {
        Some(logo) => Json(json!({"custom_logo": format!("https://fake.test/wp-content/uploads/{}", logo)})).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"code": "rest_no_route", "message": "No route was found"})),
        )
            .into_response(),
    }
}
