//! 固定的 GraphQL 查询语句。
//!
//! 变量一律通过 `variables` 传递，不往查询字符串里拼接用户输入。

pub const POSTS_QUERY: &str = r#"
  query Posts($first: Int, $after: String) {
    posts(first: $first, after: $after) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        ...PostFields
      }
    }
  }
"#;

pub const POSTS_BY_CATEGORY_QUERY: &str = r#"
  query PostsByCategory($first: Int, $after: String, $category: String!) {
    posts(first: $first, after: $after, where: {categoryName: $category}) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        ...PostFields
      }
    }
  }
"#;

pub const POST_BY_SLUG_QUERY: &str = r#"
  query PostBySlug($slug: ID!) {
    post(id: $slug, idType: SLUG) {
      ...PostFields
    }
  }
"#;

/// 文章字段片段，附加在文章类查询后面
pub const POST_FIELDS_FRAGMENT: &str = r#"
  fragment PostFields on Post {
    id
    title
    excerpt
    date
    slug
    content
    featuredImage {
      node {
        sourceUrl
        altText
      }
    }
    categories {
      nodes {
        name
        slug
      }
    }
    tags {
      nodes {
        name
        slug
      }
    }
    author {
      node {
        name
      }
    }
  }
"#;

pub const PAGES_QUERY: &str = r#"
  query Pages($first: Int) {
    pages(first: $first) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        id
        title
        content
        slug
        date
        featuredImage {
          node {
            sourceUrl
            altText
          }
        }
      }
    }
  }
"#;

pub const PAGE_BY_SLUG_QUERY: &str = r#"
  query PageBySlug($slug: ID!) {
    page(id: $slug, idType: URI) {
      id
      title
      content
      slug
      date
      featuredImage {
        node {
          sourceUrl
          altText
        }
      }
    }
  }
"#;

pub const CATEGORIES_QUERY: &str = r#"
  query Categories($first: Int) {
    categories(first: $first) {
      nodes {
        id
        name
        slug
        count
      }
    }
  }
"#;

pub const SITE_INFO_QUERY: &str = r#"
  query SiteInfo {
    generalSettings {
      title
      description
      url
    }
  }
"#;

pub const SITE_LOGO_QUERY: &str = r#"
  query SiteLogo {
    themeMods {
      customLogo
    }
  }
"#;

pub const MENU_QUERY: &str = r#"
  query GetMenu($location: MenuLocationEnum!) {
    menuItems(where: {location: $location}) {
      nodes {
        id
        label
        url
        path
        childItems {
          nodes {
            id
            label
            url
            path
          }
        }
      }
    }
  }
"#;

pub const SITE_SETTINGS_QUERY: &str = r#"
  query SiteSettings {
    themeOptions {
      siteSettings {
        logo {
          sourceUrl
          altText
        }
        phoneNumber
        email
        socialMedia {
          platform
          url
        }
        companyAddress
      }
    }
  }
"#;

pub const CONTACT_FORM_QUERY: &str = r#"
  query GetContactForm($id: ID!) {
    contactForm(id: $id, idType: DATABASE_ID) {
      formId
      title
      formFields {
        fieldName
        fieldType
        required
        options
        placeholder
      }
    }
  }
"#;

pub const SUBMIT_FORM_MUTATION: &str = r#"
  mutation SubmitContactForm($input: SubmitFormInput!) {
    submitForm(input: $input) {
      clientMutationId
      message
      status
    }
  }
"#;

pub const CREATE_ORDER_MUTATION: &str = r#"
  mutation CreateOrder($input: CreateOrderInput!) {
    createOrder(input: $input) {
      clientMutationId
      order {
        id
        orderNumber
        status
        total
      }
    }
  }
"#;

pub const PRODUCTS_QUERY: &str = r#"
  query Products($first: Int, $category: String) {
    products(first: $first, where: {category: $category}) {
      nodes {
        id
        name
        description
        price
        regularPrice
        salePrice
        stockStatus
        image {
          sourceUrl
          altText
        }
      }
    }
  }
"#;

/// 拼接文章类查询和字段片段
pub fn with_post_fields(query: &str) -> String {
    format!("{}{}", query, POST_FIELDS_FRAGMENT)
}
