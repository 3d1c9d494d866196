//! HTML scaffold emitted for a mount.
//!
//! The scaffold is static markup: the container with its `data-*`
//! attributes, a loading state, a hidden error state and the optional
//! panels. The 3D engine fills the canvas once it initializes.

use std::fmt::Write;

use crate::constants::CONTAINER_CLASS;
use crate::error::ConfiguratorError;
use crate::mount::descriptor::MountDescriptor;

/// Escapes text for HTML element content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the container markup for `descriptor`.
///
/// `container_id` must be unique on the page.
#[must_use]
pub fn render_scaffold(descriptor: &MountDescriptor, container_id: &str) -> String {
    let mut classes = vec![
        CONTAINER_CLASS.to_string(),
        format!("blasti-theme-{}", descriptor.theme),
    ];
    if descriptor.mobile_enabled {
        classes.push("blasti-mobile-enabled".to_string());
    }
    classes.extend(descriptor.container_classes.iter().cloned());

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div id="{}" class="{}" style="width: {}; height: {};""#,
        escape_html(container_id),
        escape_html(&classes.join(" ")),
        descriptor.width,
        descriptor.height,
    );
    for (name, value) in descriptor.data_attributes() {
        let _ = write!(html, r#" {name}="{}""#, escape_html(&value));
    }
    html.push_str(">\n");

    let _ = writeln!(
        html,
        r#"  <div class="blasti-loading" role="status"><span class="blasti-spinner"></span><p>{}</p></div>"#,
        escape_html(&descriptor.loading_text)
    );
    html.push_str("  <div class=\"blasti-error\" role=\"alert\" hidden></div>\n");
    html.push_str("  <div class=\"blasti-canvas\" hidden></div>\n");
    html.push_str("  <aside class=\"blasti-panel blasti-panel-pegboards\"><ul class=\"blasti-pegboard-list\"></ul></aside>\n");
    html.push_str(concat!(
        "  <aside class=\"blasti-panel blasti-panel-accessories\">",
        "<input type=\"search\" class=\"blasti-accessory-search\">",
        "<select class=\"blasti-accessory-category\"><option value=\"all\">All</option></select>",
        "<label><input type=\"checkbox\" class=\"blasti-compatible-only\" checked> Compatible only</label>",
        "<ul class=\"blasti-accessory-list\"></ul></aside>\n",
    ));

    let panels = &descriptor.panels;
    if panels.show_price {
        html.push_str("  <div class=\"blasti-panel blasti-panel-price\"><span class=\"blasti-total\"></span><ul class=\"blasti-breakdown\"></ul></div>\n");
    }
    if panels.show_cart_button {
        html.push_str("  <button type=\"button\" class=\"blasti-add-to-cart\" disabled>Add to cart</button>\n");
    }
    if panels.show_save_config {
        html.push_str("  <div class=\"blasti-panel blasti-panel-save\"><button type=\"button\" class=\"blasti-save\">Save</button><button type=\"button\" class=\"blasti-reset\">Reset</button></div>\n");
    }
    if panels.show_camera_controls {
        html.push_str("  <div class=\"blasti-camera-controls\"><button type=\"button\" data-camera=\"front\">Front</button><button type=\"button\" data-camera=\"side\">Side</button><button type=\"button\" data-camera=\"reset\">Reset view</button></div>\n");
    }

    html.push_str("</div>\n");

    if !descriptor.custom_css.trim().is_empty() {
        // Keep the stylesheet from closing its own <style> element.
        let css = descriptor.custom_css.replace("</", "<\\/");
        let _ = writeln!(html, "<style class=\"blasti-custom-css\">{css}</style>");
    }

    html
}

/// Renders the visible error state shown instead of a blank canvas.
#[must_use]
pub fn render_error_state(error: &ConfiguratorError) -> String {
    format!(
        "<div class=\"blasti-error\" role=\"alert\" data-error=\"{}\"><p>{}</p></div>\n",
        error.code(),
        escape_html(&error.to_string())
    )
}
