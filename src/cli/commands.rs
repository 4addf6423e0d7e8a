use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

use wp_headless::core::{Server, WordPress};
use wp_headless::models::{Config, MenuItem, Post, ProductQuery, SiteInfo};
use wp_headless::utils::{relative_time_from_now, strip_html};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "wp.yml")]
    pub config: PathBuf,

    /// WordPress 站点地址，覆盖配置文件和环境变量
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// 使用 GraphQL 接口
    #[arg(long, global = true, conflicts_with = "rest")]
    pub graphql: bool,

    /// 使用 REST 接口
    #[arg(long, global = true)]
    pub rest: bool,

    /// 每页文章数
    #[arg(long, global = true)]
    pub per_page: Option<usize>,

    /// 输出原始 JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 生成配置文件
    Init(InitArgs),

    /// 分页列出文章
    Posts(PostsArgs),

    /// 最新文章
    Recent(LimitArgs),

    /// 精选文章
    Featured(LimitArgs),

    /// 按别名查看文章
    Post(SlugArgs),

    /// 列出页面
    Pages,

    /// 按别名查看页面
    Page(SlugArgs),

    /// 列出分类
    Categories(LimitArgs),

    /// 站点信息
    Site,

    /// 查看菜单
    Menu(MenuArgs),

    /// 主题站点设置
    Settings,

    /// 查看联系表单
    Form(FormArgs),

    /// 提交联系表单
    Submit(SubmitArgs),

    /// 列出商品
    Products(ProductsArgs),

    /// 发送任意 GraphQL 查询
    Query(QueryArgs),

    /// 启动本地 JSON 接口服务器
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// 覆盖已有的配置文件
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct PostsArgs {
    /// 页码
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// 分类别名
    #[arg(short, long, default_value = "")]
    pub category: String,
}

#[derive(Args)]
pub struct LimitArgs {
    /// 数量
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SlugArgs {
    /// 别名
    pub slug: String,
}

#[derive(Args)]
pub struct MenuArgs {
    /// 菜单位置
    #[arg(default_value = "primary")]
    pub location: String,
}

#[derive(Args)]
pub struct FormArgs {
    /// 表单 ID
    pub id: u64,
}

#[derive(Args)]
pub struct SubmitArgs {
    /// 表单 ID
    pub id: u64,

    /// 字段，格式为 key=value，可重复
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

#[derive(Args)]
pub struct ProductsArgs {
    /// 数量
    #[arg(short = 'n', long, default_value = "12")]
    pub first: usize,

    /// 商品分类
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// GraphQL 查询语句
    pub query: String,

    /// JSON 格式的变量
    #[arg(long)]
    pub variables: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// 服务器端口
    #[arg(short, long, default_value = "4000")]
    pub port: u16,
}

fn parse_field(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("字段格式应为 key=value: {}", raw))?;
    if key.trim().is_empty() {
        return Err(anyhow!("字段名不能为空: {}", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// 合并配置文件、环境变量和命令行参数
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)?;
    if let Some(url) = &cli.url {
        config.wp_url = url.trim_end_matches('/').to_string();
    }
    if cli.graphql {
        config.use_graphql = true;
    } else if cli.rest {
        config.use_graphql = false;
    }
    if let Some(per_page) = cli.per_page.filter(|n| *n > 0) {
        config.posts_per_page = per_page;
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_post_line(post: &Post) {
    let when = post
        .published_at()
        .map(|d| relative_time_from_now(&d))
        .unwrap_or_else(|| post.date.clone());
    println!(
        "{} {} {}",
        strip_html(&post.title).bright_white().bold(),
        format!("({})", post.slug).dimmed(),
        when.bright_black()
    );
    let excerpt = strip_html(&post.excerpt);
    if !excerpt.is_empty() {
        println!("    {}", excerpt);
    }
}

fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("{}", "No posts found.".yellow());
    }
    for post in posts {
        print_post_line(post);
    }
}

fn print_menu(items: &[MenuItem], depth: usize) {
    for item in items {
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            item.label.bright_white(),
            item.path.dimmed()
        );
        print_menu(&item.children, depth + 1);
    }
}

/// 执行命令
pub async fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let json = cli.json;

    if let Commands::Init(args) = &cli.command {
        if cli.config.exists() && !args.force {
            return Err(anyhow!(
                "配置文件已存在: {}，使用 --force 覆盖",
                cli.config.display()
            ));
        }
        config.save(&cli.config)?;
        println!("{}", format!("Wrote {}", cli.config.display()).green());
        return Ok(());
    }

    let wp = WordPress::new(config).context("无法创建 WordPress 访问层")?;
    info!("Using {} via {}", wp.config().wp_url, wp.transport());

    match cli.command {
        // 已在上面处理
        Commands::Init(_) => {}
        Commands::Posts(args) => {
            let list = wp.fetch_posts(args.page, &args.category).await?;
            if json {
                return print_json(&list);
            }
            print_posts(&list.items);
            let pages = list.total_pages(wp.posts_per_page());
            let total = if list.total.is_exact() {
                list.total.value().to_string()
            } else {
                format!("{}+", list.total.value())
            };
            println!();
            println!(
                "{}",
                format!("Page {} of {} ({} posts)", args.page.max(1), pages.max(1), total)
                    .bright_cyan()
            );
        }
        Commands::Recent(args) => {
            let posts = wp.fetch_recent_posts(args.limit.unwrap_or(6)).await?;
            if json {
                return print_json(&posts);
            }
            print_posts(&posts);
        }
        Commands::Featured(args) => {
            let posts = wp.fetch_featured_posts(args.limit.unwrap_or(3)).await?;
            if json {
                return print_json(&posts);
            }
            print_posts(&posts);
        }
        Commands::Post(args) => match wp.fetch_post_by_slug(&args.slug).await? {
            Some(post) if json => print_json(&post)?,
            Some(post) => {
                print_post_line(&post);
                if let Some(author) = &post.author {
                    println!("    by {}", author.bright_green());
                }
                println!();
                println!("{}", strip_html(&post.content));
            }
            None => println!("{}", format!("Post not found: {}", args.slug).yellow()),
        },
        Commands::Pages => {
            let list = wp.fetch_pages().await?;
            if json {
                return print_json(&list);
            }
            for page in &list.items {
                println!(
                    "{} {}",
                    strip_html(&page.title).bright_white(),
                    format!("/{}", page.slug).dimmed()
                );
            }
        }
        Commands::Page(args) => match wp.fetch_page_by_slug(&args.slug).await? {
            Some(page) if json => print_json(&page)?,
            Some(page) => {
                println!("{}", strip_html(&page.title).bright_white().bold());
                println!();
                println!("{}", strip_html(&page.content));
            }
            None => println!("{}", format!("Page not found: {}", args.slug).yellow()),
        },
        Commands::Categories(args) => {
            let categories = wp.fetch_categories(args.limit.unwrap_or(20)).await?;
            if json {
                return print_json(&categories);
            }
            for category in &categories {
                println!(
                    "{} ({}) {}",
                    category.name.bright_white(),
                    category.count,
                    category.slug.dimmed()
                );
            }
        }
        Commands::Site => {
            let (info, logo) = tokio::join!(wp.fetch_site_info(), wp.fetch_site_logo());
            let mut info = info.unwrap_or_else(|e| {
                warn!("Using default site info: {}", e);
                SiteInfo::default()
            });
            info.logo = logo.unwrap_or_else(|e| {
                warn!("Site logo unavailable: {}", e);
                None
            });
            if json {
                return print_json(&info);
            }
            println!("{}", info.title.bright_cyan().bold());
            if !info.description.is_empty() {
                println!("{}", info.description);
            }
            if !info.url.is_empty() {
                println!("{}", info.url.dimmed());
            }
            if let Some(logo) = &info.logo {
                println!("logo: {}", logo);
            }
        }
        Commands::Menu(args) => {
            let items = wp.fetch_menu(&args.location).await?;
            if json {
                return print_json(&items);
            }
            print_menu(&items, 0);
        }
        Commands::Settings => {
            let settings = wp.fetch_site_settings().await?.unwrap_or_default();
            print_json(&settings)?;
        }
        Commands::Form(args) => match wp.fetch_contact_form(args.id).await? {
            Some(form) if json => print_json(&form)?,
            Some(form) => {
                println!("{}", form.title.bright_white().bold());
                for field in &form.form_fields {
                    let marker = if field.required { "*".red().to_string() } else { String::new() };
                    println!(
                        "  {}{} {}",
                        field.field_name.replace('-', " "),
                        marker,
                        format!("[{}]", field.field_type).dimmed()
                    );
                }
            }
            None => println!("{}", format!("Form not found: {}", args.id).yellow()),
        },
        Commands::Submit(args) => {
            let result = wp.submit_contact_form(args.id, args.fields).await?;
            if json {
                return print_json(&result);
            }
            if result.is_sent() {
                println!("{}", result.message.green());
            } else {
                println!("{}", result.message.red());
            }
        }
        Commands::Products(args) => {
            let query = ProductQuery {
                first: args.first,
                category: args.category,
            };
            let list = wp.get_products(&query).await?;
            if json {
                return print_json(&list);
            }
            for product in &list.items {
                println!(
                    "{} {}",
                    product.name.bright_white(),
                    product.price.as_deref().unwrap_or("-").bright_green()
                );
            }
        }
        Commands::Query(args) => {
            let variables: Value = match &args.variables {
                Some(raw) => serde_json::from_str(raw).context("变量不是合法的 JSON")?,
                None => Value::Object(Default::default()),
            };
            let data = wp.graphql_request(&args.query, variables).await?;
            print_json(&data)?;
        }
        Commands::Serve(args) => {
            Server::new(wp, args.port).start().await?;
        }
    }

    Ok(())
}
