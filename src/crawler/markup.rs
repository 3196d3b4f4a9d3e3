//! Shared helpers for reading list and detail page markup
//!
//! Both parsers read the same two kinds of source: CSS-selected elements and
//! embedded `application/ld+json` blocks. Selectors that fail to parse are
//! treated as matching nothing.

use crate::extract::clean_text;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

/// Parses a CSS selector, logging and discarding invalid ones
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Invalid selector {}: {:?}", css, e);
            None
        }
    }
}

/// Visible text of an element with entities decoded and whitespace collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching `css` that has any text
pub(crate) fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Same as [`first_text`], scoped to the descendants of `scope`
pub(crate) fn first_text_in(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = selector(css)?;
    scope
        .select(&selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Non-empty texts of every element matching `css`, in document order
pub(crate) fn all_texts(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// Non-empty attribute value of the first element matching `css`
pub(crate) fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Same as [`first_attr`], scoped to the descendants of `scope`
pub(crate) fn first_attr_in(scope: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    let selector = selector(css)?;
    scope
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Content of a `<meta>` tag identified by its `property` or `name`
pub(crate) fn meta_content(document: &Html, key: &str) -> Option<String> {
    first_attr(document, &format!(r#"meta[property="{key}"]"#), "content")
        .or_else(|| first_attr(document, &format!(r#"meta[name="{key}"]"#), "content"))
        .map(|content| clean_text(&content))
        .filter(|content| !content.is_empty())
}

/// Every well-formed JSON-LD object on the page
///
/// Top-level arrays and `@graph` containers are flattened. Blocks that fail to
/// parse are skipped.
pub(crate) fn json_ld_objects(document: &Html) -> Vec<Value> {
    let Some(selector) = selector(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };

    let mut objects = Vec::new();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => flatten_json_ld(value, &mut objects),
            Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }
    objects
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_json_ld(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            if !map.is_empty() {
                out.push(Value::Object(map));
            }
        }
        _ => {}
    }
}

/// Returns true if the object's `@type` is (or includes) `type_name`
pub(crate) fn has_type(object: &Value, type_name: &str) -> bool {
    match object.get("@type") {
        Some(Value::String(t)) => t == type_name,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(type_name)),
        _ => false,
    }
}

/// First JSON-LD object of the given `@type`
pub(crate) fn find_json_ld(document: &Html, type_name: &str) -> Option<Value> {
    json_ld_objects(document)
        .into_iter()
        .find(|object| has_type(object, type_name))
}

/// Cleaned, non-empty string at `key`
pub(crate) fn json_str(object: &Value, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(clean_text)
        .filter(|s| !s.is_empty())
}

/// A number that may be encoded as a JSON number or a numeric string
pub(crate) fn json_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Names from a value that may be a string, a `{name}` object or an array of either
///
/// Comma-separated strings (`"Crime, Drama"`) are split.
pub(crate) fn json_names(value: &Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(value, &mut names);
    names
}

fn collect_names(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            s.split(',')
                .map(clean_text)
                .filter(|name| !name.is_empty()),
        ),
        Value::Object(_) => {
            if let Some(name) = json_str(value, "name") {
                out.push(name);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_names(item, out);
            }
        }
        _ => {}
    }
}

/// Image URL from a value that may be a string or an `ImageObject`
pub(crate) fn json_image(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(_) => json_str(value, "url").or_else(|| json_str(value, "contentUrl")),
        Value::Array(items) => items.iter().find_map(json_image),
        _ => None,
    }
}

/// Resolves an href against a base URL, keeping only http(s) results
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }

    base.join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
        .map(String::from)
}
