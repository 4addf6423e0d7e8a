use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 默认后端地址
pub const DEFAULT_WP_URL: &str = "https://example.com";
/// 默认每页文章数
pub const DEFAULT_POSTS_PER_PAGE: usize = 6;

/// 访问层配置，启动时读取一次
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WordPress 站点地址
    pub wp_url: String,
    /// 是否使用 GraphQL，否则使用 REST
    pub use_graphql: bool,
    /// 每页文章数
    pub posts_per_page: usize,
    /// 请求超时（秒），不设置则不限制
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wp_url: DEFAULT_WP_URL.to_string(),
            use_graphql: false,
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            timeout_secs: None,
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config.normalized())
    }

    /// 加载配置：文件存在则读文件，然后应用环境变量
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };
        Ok(config.with_env_overrides(|key| env::var(key).ok()))
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// 应用 `WP_URL`、`WP_USE_GRAPHQL`、`WP_POSTS_PER_PAGE`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WP_URL").filter(|u| !u.trim().is_empty()) {
            self.wp_url = url;
        }
        if let Some(flag) = lookup("WP_USE_GRAPHQL") {
            self.use_graphql = flag.trim() == "true";
        }
        if let Some(per_page) = lookup("WP_POSTS_PER_PAGE") {
            self.posts_per_page = parse_per_page(&per_page);
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.posts_per_page == 0 {
            self.posts_per_page = DEFAULT_POSTS_PER_PAGE;
        }
        self.wp_url = self.wp_url.trim_end_matches('/').to_string();
        self
    }
}

/// 无法解析或不为正数时回退到默认值
fn parse_per_page(value: &str) -> usize {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => DEFAULT_POSTS_PER_PAGE,
    }
}
