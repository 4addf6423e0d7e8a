use chrono::{Local, NaiveDateTime};
use url::Url;

/// 在站点地址下拼出接口地址，保留子目录安装的路径前缀
pub fn endpoint_url(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let root = Url::parse(&ensure_trailing_slash(base.as_str()))?;
    root.join(path.trim_start_matches('/'))
}

/// 确保路径以斜杠结尾
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// 去掉 HTML 标签并还原常见实体，用于终端展示摘要
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8216;", "\u{2018}")
        .replace("&#8220;", "\u{201c}")
        .replace("&#8221;", "\u{201d}")
        .replace("&#8211;", "\u{2013}")
        .replace("&#8230;", "\u{2026}")
        .replace("&hellip;", "\u{2026}")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 计算距今的相对时间描述
pub fn relative_time_from_now(date: &NaiveDateTime) -> String {
    relative_time(date, &Local::now().naive_local())
}

fn relative_time(date: &NaiveDateTime, now: &NaiveDateTime) -> String {
    let duration = now.signed_duration_since(*date);

    if duration.num_minutes() < 1 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        format!("{} minutes ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{} hours ago", duration.num_hours())
    } else if duration.num_days() < 30 {
        format!("{} days ago", duration.num_days())
    } else if duration.num_days() < 365 {
        format!("{} months ago", duration.num_days() / 30)
    } else {
        format!("{} years ago", duration.num_days() / 365)
    }
}
