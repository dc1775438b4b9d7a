//! Shared fixtures for integration tests

use catalog_harvest::config::{
    Config, CrawlerConfig, ExtractionRules, OutputConfig, UserAgentConfig,
};
use catalog_harvest::crawler::CompiledRules;
use std::path::Path;

pub fn extraction_rules() -> ExtractionRules {
    ExtractionRules {
        product_container: "div.product".to_string(),
        brand: "span.brand".to_string(),
        product_name: "div.name".to_string(),
        price_container: "div.prices".to_string(),
        former_price: "div.retail".to_string(),
        current_price: "div.sale".to_string(),
        discount: "div.discount".to_string(),
        next_page: "a[aria-label='next page']".to_string(),
    }
}

pub fn compiled_rules() -> CompiledRules {
    CompiledRules::compile(&extraction_rules()).expect("test rules compile")
}

pub fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

pub fn crawler_config(template: &str, max_pages: u32) -> CrawlerConfig {
    CrawlerConfig {
        page_url_template: template.to_string(),
        max_pages,
        inter_page_delay_ms: 0,
        ready_timeout_secs: 2,
        ready_poll_interval_ms: 50,
    }
}

/// Config with every sink enabled under `dir`
pub fn create_test_config(template: &str, dir: &Path) -> Config {
    Config {
        crawler: crawler_config(template, 10),
        user_agent: user_agent(),
        extraction: extraction_rules(),
        output: OutputConfig {
            checkpoint_path: path_string(dir, "checkpoint.json"),
            csv_path: Some(path_string(dir, "products.csv")),
            json_path: Some(path_string(dir, "products.json")),
            database_path: Some(path_string(dir, "products.db")),
        },
    }
}

pub fn path_string(dir: &Path, name: &str) -> String {
    dir.join(name).display().to_string()
}

/// A product entry; `prices` is `None` to leave out the price container
pub fn product(brand: &str, name: &str, prices: Option<(&str, &str, &str)>) -> String {
    let prices = match prices {
        Some((retail, sale, discount)) => format!(
            concat!(
                r#"<div class="prices"><div class="retail">{}</div>"#,
                r#"<div class="sale">{}</div><div class="discount">{}</div></div>"#,
            ),
            retail, sale, discount
        ),
        None => String::new(),
    };
    format!(
        r#"<div class="product"><span class="brand">{}</span><div class="name">{}</div>{}</div>"#,
        brand, name, prices
    )
}

/// A catalog page holding `products`, with a next-page link if `next` is set
pub fn catalog_page(products: &[String], next: Option<&str>) -> String {
    let link = match next {
        Some(href) => format!(r#"<a aria-label="next page" href="{}">Next</a>"#, href),
        None => String::new(),
    };
    format!(
        "<html><body><main>{}</main><nav>{}</nav></body></html>",
        products.concat(),
        link
    )
}

/// Page 1 of the two-page catalog: three entries, one without prices
pub fn two_page_catalog_first() -> String {
    catalog_page(
        &[
            product("Acme", "Aviator 58", Some(("$150.00", "$120.00", "Save 20%"))),
            product("Acme", "Round 50", Some(("$1,234.50", "$999", "-19%"))),
            product("Birch", "Cat Eye", None),
        ],
        Some("?page=2"),
    )
}

/// Page 2 of the two-page catalog: one entry, no next link
pub fn two_page_catalog_second() -> String {
    catalog_page(
        &[product("Birch", "Square 54", Some(("€80", "€60", "25% off")))],
        None,
    )
}
