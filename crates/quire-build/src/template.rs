//! Static HTML page template.
//!
//! Every route gets a self-contained page: the static markup for readers
//! without JavaScript and the hydration payload for the client runtime.

use std::fmt::Write;

use quire_renderer::{TocEntry, escape_html};
use quire_site::{Banner, Breadcrumb, NavLink, SidebarNode};

/// Element id of the embedded hydration payload.
pub(crate) const PAYLOAD_ELEMENT_ID: &str = "__quire_data";

/// Data needed to render a document page.
pub(crate) struct PageData<'a> {
    pub site_title: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub permalink: &'a str,
    pub version_label: &'a str,
    pub banner: Option<Banner>,
    pub sidebar: &'a [SidebarNode],
    pub breadcrumbs: &'a [Breadcrumb],
    pub content_html: &'a str,
    pub toc: &'a [TocEntry],
    pub previous: Option<&'a NavLink>,
    pub next: Option<&'a NavLink>,
    pub edit_url: Option<&'a str>,
    /// Serialized hydration payload.
    pub payload: &'a str,
}

/// A link in a listing page.
pub(crate) struct ListingItem<'a> {
    pub label: &'a str,
    pub href: &'a str,
    pub detail: Option<String>,
}

/// Data needed to render a non-document page (tags, static pages).
pub(crate) struct ListingData<'a> {
    pub site_title: &'a str,
    pub title: &'a str,
    pub items: Vec<ListingItem<'a>>,
    pub payload: &'a str,
}

/// Render a document page.
pub(crate) fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(8192 + page.content_html.len());

    render_head(&mut html, page.title, page.site_title, Some(page.description));
    html.push_str("<body>\n<div class=\"quire-layout\">\n");

    html.push_str("<aside class=\"quire-sidebar\">\n");
    let _ = writeln!(
        html,
        "<div class=\"quire-version\">{}</div>",
        escape_html(page.version_label)
    );
    if !page.sidebar.is_empty() {
        html.push_str("<nav>\n<ul>\n");
        render_sidebar_items(&mut html, page.sidebar, page.permalink);
        html.push_str("</ul>\n</nav>\n");
    }
    html.push_str("</aside>\n");

    html.push_str("<main class=\"quire-main\">\n");
    if let Some(banner) = page.banner {
        render_banner(&mut html, banner);
    }
    render_breadcrumbs(&mut html, page.breadcrumbs);

    html.push_str("<article class=\"quire-content\">\n");
    html.push_str(page.content_html);
    html.push_str("\n</article>\n");

    if let Some(edit_url) = page.edit_url {
        let _ = writeln!(
            html,
            "<a class=\"quire-edit\" href=\"{}\">Edit this page</a>",
            escape_html(edit_url)
        );
    }
    render_pagination(&mut html, page.previous, page.next);
    html.push_str("</main>\n");

    render_toc(&mut html, page.toc);

    html.push_str("</div>\n");
    render_payload(&mut html, page.payload);
    html.push_str("</body>\n</html>\n");
    html
}

/// Render a listing page.
pub(crate) fn render_listing(page: &ListingData<'_>) -> String {
    let mut html = String::with_capacity(2048);

    render_head(&mut html, page.title, page.site_title, None);
    html.push_str("<body>\n<main class=\"quire-main\">\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(page.title));
    if !page.items.is_empty() {
        html.push_str("<ul class=\"quire-listing\">\n");
        for item in &page.items {
            let _ = write!(
                html,
                "<li><a href=\"{}\">{}</a>",
                escape_html(item.href),
                escape_html(item.label)
            );
            if let Some(detail) = &item.detail {
                let _ = write!(html, " <span>{}</span>", escape_html(detail));
            }
            html.push_str("</li>\n");
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</main>\n");
    render_payload(&mut html, page.payload);
    html.push_str("</body>\n</html>\n");
    html
}

fn render_head(html: &mut String, title: &str, site_title: &str, description: Option<&str>) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(
        html,
        "<title>{} | {}</title>",
        escape_html(title),
        escape_html(site_title)
    );
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(description)
        );
    }
    html.push_str("</head>\n");
}

fn render_sidebar_items(html: &mut String, items: &[SidebarNode], active: &str) {
    for item in items {
        match item {
            SidebarNode::Link { label, href, .. } => {
                let class = if href == active { " class=\"active\"" } else { "" };
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}\"{class}>{}</a></li>",
                    escape_html(href),
                    escape_html(label)
                );
            }
            SidebarNode::Category {
                label,
                collapsed,
                link,
                items,
                ..
            } => {
                // Expand the category holding the active page.
                let open = !collapsed || contains_href(items, active);
                let _ = writeln!(html, "<li><details{}>", if open { " open" } else { "" });
                match link {
                    Some(link) => {
                        let _ = writeln!(
                            html,
                            "<summary><a href=\"{}\">{}</a></summary>",
                            escape_html(&link.href),
                            escape_html(label)
                        );
                    }
                    None => {
                        let _ = writeln!(html, "<summary>{}</summary>", escape_html(label));
                    }
                }
                html.push_str("<ul>\n");
                render_sidebar_items(html, items, active);
                html.push_str("</ul>\n</details></li>\n");
            }
        }
    }
}

fn contains_href(items: &[SidebarNode], href: &str) -> bool {
    items.iter().any(|item| match item {
        SidebarNode::Link { href: h, .. } => h == href,
        SidebarNode::Category { link, items, .. } => {
            link.as_ref().is_some_and(|l| l.href == href) || contains_href(items, href)
        }
    })
}

fn render_banner(html: &mut String, banner: Banner) {
    let text = match banner {
        Banner::Unreleased => "This is unreleased documentation.",
        Banner::Unmaintained => "This documentation is for a version that is no longer maintained.",
    };
    let _ = writeln!(html, "<div class=\"quire-banner\" role=\"note\">{text}</div>");
}

fn render_breadcrumbs(html: &mut String, breadcrumbs: &[Breadcrumb]) {
    if breadcrumbs.is_empty() {
        return;
    }
    html.push_str("<nav class=\"quire-breadcrumbs\" aria-label=\"Breadcrumb\">\n<ol>\n");
    for crumb in breadcrumbs {
        match &crumb.href {
            Some(href) => {
                let _ = writeln!(
                    html,
                    "<li><a href=\"{}\">{}</a></li>",
                    escape_html(href),
                    escape_html(&crumb.label)
                );
            }
            None => {
                let _ = writeln!(html, "<li>{}</li>", escape_html(&crumb.label));
            }
        }
    }
    html.push_str("</ol>\n</nav>\n");
}

fn render_pagination(html: &mut String, previous: Option<&NavLink>, next: Option<&NavLink>) {
    if previous.is_none() && next.is_none() {
        return;
    }
    html.push_str("<nav class=\"quire-pagination\">\n");
    for (class, link) in [("previous", previous), ("next", next)] {
        if let Some(link) = link {
            let _ = writeln!(
                html,
                "<a class=\"{class}\" href=\"{}\">{}</a>",
                escape_html(&link.permalink),
                escape_html(&link.title)
            );
        }
    }
    html.push_str("</nav>\n");
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"quire-toc\">\n<ul>\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li class=\"level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            escape_html(&entry.id),
            escape_html(&entry.value)
        );
    }
    html.push_str("</ul>\n</aside>\n");
}

fn render_payload(html: &mut String, payload: &str) {
    let _ = writeln!(
        html,
        "<script type=\"application/json\" id=\"{PAYLOAD_ELEMENT_ID}\">{}</script>",
        escape_script(payload)
    );
}

/// Keep embedded JSON from closing its `<script>` element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_site::CategoryLink;

    fn page<'a>(sidebar: &'a [SidebarNode], toc: &'a [TocEntry]) -> PageData<'a> {
        PageData {
            site_title: "Handbook",
            title: "Patterns",
            description: "Common patterns.",
            permalink: "/docs/dp/patterns",
            version_label: "Next",
            banner: Some(Banner::Unreleased),
            sidebar,
            breadcrumbs: &[],
            content_html: "<h1 id=\"patterns\">Patterns</h1>",
            toc,
            previous: None,
            next: None,
            edit_url: None,
            payload: "{\"html\":\"</script>\"}",
        }
    }

    #[test]
    fn test_render_page_structure() {
        let sidebar = vec![SidebarNode::Category {
            label: "DP".to_owned(),
            collapsible: true,
            collapsed: true,
            link: Some(CategoryLink {
                doc_id: "dp/index".to_owned(),
                href: "/docs/dp".to_owned(),
            }),
            description: None,
            items: vec![SidebarNode::Link {
                label: "Patterns".to_owned(),
                href: "/docs/dp/patterns".to_owned(),
                doc_id: Some("dp/patterns".to_owned()),
                unlisted: false,
            }],
        }];
        let toc = vec![TocEntry {
            value: "Goal".to_owned(),
            id: "goal".to_owned(),
            level: 2,
        }];

        let html = render_page(&page(&sidebar, &toc));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Patterns | Handbook</title>"));
        assert!(html.contains("<meta name=\"description\" content=\"Common patterns.\">"));
        assert!(html.contains("<details open>"));
        assert!(html.contains("<a href=\"/docs/dp/patterns\" class=\"active\">Patterns</a>"));
        assert!(html.contains("This is unreleased documentation."));
        assert!(html.contains("<a href=\"#goal\">Goal</a>"));
        assert!(html.contains("<script type=\"application/json\" id=\"__quire_data\">{\"html\":\"<\\/script>\"}</script>"));
    }

    #[test]
    fn test_render_page_escapes_text() {
        let mut data = page(&[], &[]);
        data.title = "<b>Bold</b>";
        let html = render_page(&data);
        assert!(html.contains("<title>&lt;b&gt;Bold&lt;/b&gt; | Handbook</title>"));
    }

    #[test]
    fn test_render_pagination() {
        let previous = NavLink {
            title: "Intro".to_owned(),
            permalink: "/docs/intro".to_owned(),
        };
        let mut data = page(&[], &[]);
        data.previous = Some(&previous);
        let html = render_page(&data);
        assert!(html.contains("<a class=\"previous\" href=\"/docs/intro\">Intro</a>"));
        assert!(!html.contains("class=\"next\""));
    }

    #[test]
    fn test_render_listing() {
        let html = render_listing(&ListingData {
            site_title: "Handbook",
            title: "Tag: basics",
            items: vec![ListingItem {
                label: "Intro",
                href: "/docs/intro",
                detail: None,
            }],
            payload: "{}",
        });
        assert!(html.contains("<h1>Tag: basics</h1>"));
        assert!(html.contains("<li><a href=\"/docs/intro\">Intro</a></li>"));
    }
}
