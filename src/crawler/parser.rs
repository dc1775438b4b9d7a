//! Record extraction from catalog page markup
//!
//! This module turns a fetched catalog page into product records using the
//! configured CSS selectors. Extraction never fails: a field whose element is
//! missing, empty or unparseable is recorded as `None`.

use crate::config::ExtractionRules;
use crate::output::ProductRecord;
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Characters removed from price text before it is parsed
const PRICE_NOISE: [char; 5] = ['$', '€', '£', '¥', ','];

/// Extraction rules with every selector parsed once up front
#[derive(Debug, Clone)]
pub struct CompiledRules {
    product_container: Selector,
    brand: Selector,
    product_name: Selector,
    price_container: Selector,
    former_price: Selector,
    current_price: Selector,
    discount: Selector,
    next_page: Selector,
}

impl CompiledRules {
    /// Parses every selector of the rule set
    ///
    /// The first selector that fails to parse is reported with its config key.
    pub fn compile(rules: &ExtractionRules) -> ConfigResult<Self> {
        Ok(Self {
            product_container: compile_selector("product-container", &rules.product_container)?,
            brand: compile_selector("brand", &rules.brand)?,
            product_name: compile_selector("product-name", &rules.product_name)?,
            price_container: compile_selector("price-container", &rules.price_container)?,
            former_price: compile_selector("former-price", &rules.former_price)?,
            current_price: compile_selector("current-price", &rules.current_price)?,
            discount: compile_selector("discount", &rules.discount)?,
            next_page: compile_selector("next-page", &rules.next_page)?,
        })
    }
}

fn compile_selector(field: &'static str, css: &str) -> ConfigResult<Selector> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector {
        field,
        message: e.to_string(),
    })
}

/// Everything extracted from one catalog page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPage {
    /// One record per product entry, in document order
    pub records: Vec<ProductRecord>,

    /// Raw `href` of the next-page link, if the page has one
    pub next_page: Option<String>,
}

/// Parses a catalog page into records and its next-page link
pub fn parse_page(markup: &str, rules: &CompiledRules) -> ParsedPage {
    let document = Html::parse_document(markup);

    ParsedPage {
        records: extract_from_document(&document, rules),
        next_page: next_page_from_document(&document, rules),
    }
}

/// Returns true if the markup contains at least one product entry
///
/// This is the readiness condition used while waiting for a page to load.
pub fn has_products(markup: &str, rules: &CompiledRules) -> bool {
    Html::parse_document(markup)
        .select(&rules.product_container)
        .next()
        .is_some()
}

fn extract_from_document(document: &Html, rules: &CompiledRules) -> Vec<ProductRecord> {
    document
        .select(&rules.product_container)
        .map(|entry| extract_entry(entry, rules))
        .collect()
}

fn extract_entry(entry: ElementRef<'_>, rules: &CompiledRules) -> ProductRecord {
    let brand = child_text(entry, &rules.brand);
    let product_name = child_text(entry, &rules.product_name);

    // No price container means no price fields at all
    let Some(prices) = entry.select(&rules.price_container).next() else {
        return ProductRecord {
            brand,
            product_name,
            ..ProductRecord::default()
        };
    };

    ProductRecord {
        brand,
        product_name,
        former_price: child_text(prices, &rules.former_price).and_then(|t| parse_price(&t)),
        current_price: child_text(prices, &rules.current_price).and_then(|t| parse_price(&t)),
        discount: child_text(prices, &rules.discount).and_then(|t| parse_discount(&t)),
    }
}

fn next_page_from_document(document: &Html, rules: &CompiledRules) -> Option<String> {
    document
        .select(&rules.next_page)
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

/// Text of the first matching descendant with whitespace runs collapsed
fn child_text(parent: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let element = parent.select(selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parses a displayed price such as `"$1,234.50"`
///
/// Currency symbols, thousands separators and whitespace are stripped before
/// parsing. Returns `None` for anything that is not a finite number.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !PRICE_NOISE.contains(c))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses the first run of digits in a discount label such as `"Save 20% Today"`
pub fn parse_discount(text: &str) -> Option<u32> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

    digits.find(text)?.as_str().parse().ok()
}
