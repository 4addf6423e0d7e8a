pub mod config;
pub mod types;

pub use config::Config;
pub use types::{
    Category, ContactForm, FormField, Image, MenuItem, Order, OrderResult, Page, PageInfo,
    PageList, Post, PostList, PostQuery, Product, ProductList, ProductQuery, SiteInfo,
    SiteSettings, SocialLink, SubmitFormResult, TermRef, Total,
};
