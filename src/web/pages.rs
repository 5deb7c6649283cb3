//! Server-rendered HTML. Every view is rebuilt from scratch on each request.

use std::fmt::Write;
use urlencoding::encode;

use super::labels::{
    format_date, level_class, level_label, sort_label, type_label, DEFAULT_CATEGORY_COLOR,
    UNCATEGORIZED,
};
use crate::catalog::Catalog;
use crate::models::{Category, Level, Resource, ResourceForm, ResourceType, SortOrder, Statistics};
use crate::offline::{FONT_AWESOME_URL, TAILWIND_URL};
use crate::storage::KeyValueStore;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="manifest" href="/manifest.json">
<script src="/offline/fetch?url={tailwind}"></script>
<link rel="stylesheet" href="/offline/fetch?url={font_awesome}">
<link rel="stylesheet" href="/styles.css">
</head>
<body class="bg-gray-50 text-gray-800">
<header class="bg-white shadow"><div class="container mx-auto px-4 py-4">
<a href="/" class="text-xl font-bold text-primary"><i class="fa fa-cube"></i> Maya Resource Library</a>
</div></header>
<main class="container mx-auto px-4 py-8">
{body}
</main>
<script src="/app.js"></script>
<script src="/offline.js"></script>
</body>
</html>"#,
        title = escape(title),
        tailwind = encode(TAILWIND_URL),
        font_awesome = encode(FONT_AWESOME_URL),
    )
}

/// Home page: statistics, categories, forms, and either search results or
/// the filtered and sorted listing.
pub fn home<S: KeyValueStore>(
    catalog: &Catalog<S>,
    category: &str,
    order: SortOrder,
    search: &str,
) -> String {
    let mut body = String::new();
    body.push_str(&statistics(&catalog.statistics()));
    body.push_str(&category_cards(catalog));
    body.push_str(&add_category_form());
    body.push_str(&add_resource_form(catalog.list_categories()));
    body.push_str(&controls(catalog.list_categories(), category, order, search));

    let back = back_link(category, order, search);
    let (resources, empty_message) = if search.is_empty() {
        (catalog.browse(Some(category), order), "No resources yet")
    } else {
        (catalog.search(search), "No matching resources")
    };
    body.push_str(&resource_grid(catalog, &resources, empty_message, &back));

    layout("Maya Resource Library", &body)
}

fn back_link(category: &str, order: SortOrder, search: &str) -> String {
    if search.is_empty() {
        format!(
            "/?category={}&sort={}",
            encode(category),
            order.as_str()
        )
    } else {
        format!("/?q={}", encode(search))
    }
}

pub fn statistics(stats: &Statistics) -> String {
    format!(
        r#"<section id="statistics" class="grid grid-cols-3 gap-4 mb-8">
<div class="bg-white rounded-lg shadow p-4"><p class="text-sm text-gray-500">Resources</p><p id="total-resources" class="text-2xl font-bold">{}</p></div>
<div class="bg-white rounded-lg shadow p-4"><p class="text-sm text-gray-500">Categories</p><p id="total-categories" class="text-2xl font-bold">{}</p></div>
<div class="bg-white rounded-lg shadow p-4"><p class="text-sm text-gray-500">Favorites</p><p id="total-favorites" class="text-2xl font-bold">{}</p></div>
</section>
"#,
        stats.total_resources, stats.total_categories, stats.total_favorites
    )
}

fn category_cards<S: KeyValueStore>(catalog: &Catalog<S>) -> String {
    let mut out = String::from(
        r#"<section id="categories" class="grid grid-cols-2 md:grid-cols-6 gap-4 mb-8">"#,
    );
    for category in catalog.list_categories() {
        let count = catalog.resources_by_category(&category.id).len();
        let _ = write!(
            out,
            r#"
<a href="/?category={id}" class="bg-white rounded-lg shadow p-4 text-center card-hover" style="border-left: 4px solid {color}">
<h3 class="font-semibold mb-2">{name}</h3><p class="text-sm text-gray-500">{count} resources</p></a>"#,
            id = escape(&category.id),
            color = escape(&category.color),
            name = escape(&category.name),
        );
    }
    out.push_str("\n</section>\n");
    out
}

fn category_options(categories: &[Category], selected: &str) -> String {
    let mut out = String::from(r#"<option value="">Select a category</option>"#);
    for category in categories {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            escape(&category.id),
            selected_attr(category.id == selected),
            escape(&category.name)
        );
    }
    if !selected.is_empty() && !categories.iter().any(|c| c.id == selected) {
        let _ = write!(
            out,
            r#"<option value="{}" selected>{UNCATEGORIZED}</option>"#,
            escape(selected)
        );
    }
    out
}

fn type_options(selected: &str) -> String {
    let mut out = String::from(r#"<option value="">Select a type</option>"#);
    for kind in ResourceType::KNOWN {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            kind.as_str(),
            selected_attr(kind.as_str() == selected),
            type_label(&kind)
        );
    }
    if !selected.is_empty() && !ResourceType::KNOWN.iter().any(|k| k.as_str() == selected) {
        push_custom_option(&mut out, selected);
    }
    out
}

fn level_options(selected: &str) -> String {
    let mut out = String::from(r#"<option value="">Select a level</option>"#);
    for level in Level::KNOWN {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            level.as_str(),
            selected_attr(level.as_str() == selected),
            level_label(&level)
        );
    }
    if !selected.is_empty() && !Level::KNOWN.iter().any(|l| l.as_str() == selected) {
        push_custom_option(&mut out, selected);
    }
    out
}

/// Keeps a stored value outside the known set selectable, so an unchanged
/// edit submits it back as is.
fn push_custom_option(out: &mut String, value: &str) {
    let _ = write!(
        out,
        r#"<option value="{value}" selected>{value}</option>"#,
        value = escape(value)
    );
}

fn selected_attr(selected: bool) -> &'static str {
    if selected {
        " selected"
    } else {
        ""
    }
}

fn resource_fields(categories: &[Category], form: &ResourceForm) -> String {
    format!(
        r#"<input name="title" value="{title}" placeholder="Title *" class="border rounded p-2">
<select name="category" class="border rounded p-2">{categories}</select>
<select name="type" class="border rounded p-2">{types}</select>
<select name="level" class="border rounded p-2">{levels}</select>
<input name="link" value="{link}" placeholder="Link or path *" class="border rounded p-2">
<input name="tags" value="{tags}" placeholder="Tags, comma separated" class="border rounded p-2">
<textarea name="description" placeholder="Description" class="border rounded p-2 md:col-span-2">{description}</textarea>"#,
        title = escape(&form.title),
        categories = category_options(categories, &form.category),
        types = type_options(&form.kind),
        levels = level_options(&form.level),
        link = escape(&form.link),
        tags = escape(&form.tags),
        description = escape(&form.description),
    )
}

fn add_resource_form(categories: &[Category]) -> String {
    format!(
        r#"<section class="bg-white rounded-lg shadow p-4 mb-8">
<h2 class="font-bold text-lg mb-4">Add resource</h2>
<form id="add-resource-form" method="post" action="/resources" class="grid grid-cols-1 md:grid-cols-2 gap-4">
{fields}
<button type="submit" class="bg-primary text-white rounded p-2 md:col-span-2">Add</button>
</form>
</section>
"#,
        fields = resource_fields(categories, &ResourceForm::default())
    )
}

fn add_category_form() -> String {
    format!(
        r#"<section class="bg-white rounded-lg shadow p-4 mb-8">
<h2 class="font-bold text-lg mb-4">Add category</h2>
<form id="add-category-form" method="post" action="/categories" class="flex gap-4">
<input name="name" placeholder="Category name" class="border rounded p-2 flex-1">
<input name="color" type="color" value="{DEFAULT_CATEGORY_COLOR}">
<button type="submit" class="bg-primary text-white rounded px-4">Add</button>
</form>
</section>
"#
    )
}

fn controls(categories: &[Category], category: &str, order: SortOrder, search: &str) -> String {
    let mut filter = format!(
        r#"<option value="all"{}>All categories</option>"#,
        selected_attr(category == "all" || category.is_empty())
    );
    for c in categories {
        let _ = write!(
            filter,
            r#"<option value="{}"{}>{}</option>"#,
            escape(&c.id),
            selected_attr(c.id == category),
            escape(&c.name)
        );
    }
    let mut sort = String::new();
    for known in SortOrder::KNOWN {
        let _ = write!(
            sort,
            r#"<option value="{}"{}>{}</option>"#,
            known.as_str(),
            selected_attr(known == order),
            sort_label(known)
        );
    }

    format!(
        r#"<section class="flex flex-wrap gap-4 mb-4">
<form method="get" action="/" class="flex gap-2">
<input id="search-input" name="q" value="{search}" placeholder="Search title, description or tags" class="border rounded p-2">
<button id="search-btn" type="submit" class="bg-primary text-white rounded px-4"><i class="fa fa-search"></i></button>
</form>
<form id="filters" method="get" action="/" class="flex gap-2">
<select id="filter-category" name="category" class="border rounded p-2">{filter}</select>
<select id="sort-by" name="sort" class="border rounded p-2">{sort}</select>
<noscript><button type="submit">Apply</button></noscript>
</form>
</section>
"#,
        search = escape(search),
    )
}

fn resource_grid<S: KeyValueStore>(
    catalog: &Catalog<S>,
    resources: &[Resource],
    empty_message: &str,
    back: &str,
) -> String {
    let mut out = String::from(
        r#"<section id="resources-container" class="grid grid-cols-1 md:grid-cols-3 gap-6">"#,
    );
    if resources.is_empty() {
        let _ = write!(
            out,
            r#"
<div class="col-span-full text-center py-12"><i class="fa fa-search text-gray-400 text-4xl mb-4"></i><p class="text-gray-500">{}</p></div>"#,
            escape(empty_message)
        );
    }
    for resource in resources {
        out.push_str(&resource_card(
            resource,
            catalog.category_by_id(&resource.category),
            back,
        ));
    }
    out.push_str("\n</section>\n");
    out
}

fn category_badge(category: Option<&Category>) -> (String, String) {
    match category {
        Some(c) => (escape(&c.color), escape(&c.name)),
        None => (DEFAULT_CATEGORY_COLOR.to_string(), UNCATEGORIZED.to_string()),
    }
}

pub fn resource_card(resource: &Resource, category: Option<&Category>, back: &str) -> String {
    let (color, category_name) = category_badge(category);
    let (star, star_class) = if resource.favorite {
        ("fa-star", "favorite-active")
    } else {
        ("fa-star-o", "text-gray-400")
    };
    format!(
        r#"
<div class="bg-white rounded-lg shadow overflow-hidden card-hover"><div class="p-4">
<div class="flex justify-between items-start mb-2">
<h3 class="font-bold text-lg">{title}</h3>
<form method="post" action="/resources/{id}/favorite"><input type="hidden" name="back" value="{back}">
<button class="favorite-btn {star_class} hover:text-yellow-500" type="submit"><i class="fa {star} text-xl"></i></button></form>
</div>
<div class="mb-3">
<span class="inline-block px-3 py-1 text-xs rounded-full" style="background-color: {color}20; color: {color}">{category_name}</span>
<span class="inline-block px-3 py-1 text-xs rounded-full bg-gray-100 text-gray-700 ml-2">{kind}</span>
<span class="inline-block px-3 py-1 text-xs rounded-full {level_class}">{level}</span>
</div>
<p class="text-gray-600 text-sm mb-4 line-clamp-2">{description}</p>
<div class="flex justify-between items-center">
<a href="{link}" target="_blank" rel="noopener" class="text-primary hover:underline text-sm"><i class="fa fa-external-link mr-1"></i> Open</a>
<a href="/resources/{id}" class="view-details-btn text-gray-600 hover:text-primary"><i class="fa fa-info-circle"></i> Details</a>
</div>
</div></div>"#,
        title = escape(&resource.title),
        id = escape(&resource.id),
        back = escape(back),
        kind = escape(type_label(&resource.kind)),
        level_class = level_class(&resource.level),
        level = escape(level_label(&resource.level)),
        description = escape(&resource.description),
        link = escape(&resource.link),
    )
}

pub fn details(resource: &Resource, category: Option<&Category>) -> String {
    let (color, category_name) = category_badge(category);
    let tags = resource.tag_list();
    let tags = if tags.is_empty() {
        "No tags".to_string()
    } else {
        tags.iter()
            .map(|tag| {
                format!(
                    r#"<span class="bg-gray-100 text-gray-700 px-2 py-1 rounded text-xs">{}</span>"#,
                    escape(tag)
                )
            })
            .collect::<Vec<_>>()
            .join("")
    };
    let description = if resource.description.is_empty() {
        "No description".to_string()
    } else {
        escape(&resource.description)
    };

    let body = format!(
        r#"<article id="resource-details" class="bg-white rounded-lg shadow p-6 space-y-4">
<h2 id="modal-title" class="text-2xl font-bold">{title}</h2>
<div class="grid grid-cols-1 md:grid-cols-2 gap-4">
<div><p class="text-sm text-gray-500">Category</p><p class="font-medium" style="color: {color}">{category_name}</p></div>
<div><p class="text-sm text-gray-500">Type</p><p class="font-medium">{kind}</p></div>
<div><p class="text-sm text-gray-500">Level</p><p class="font-medium {level_class}">{level}</p></div>
<div><p class="text-sm text-gray-500">Added</p><p class="font-medium">{added}</p></div>
</div>
<div><p class="text-sm text-gray-500">Description</p><p>{description}</p></div>
<div><p class="text-sm text-gray-500">Link / path</p><a href="{link}" target="_blank" rel="noopener" class="text-primary hover:underline">{link}</a></div>
<div><p class="text-sm text-gray-500">Tags</p><div class="flex flex-wrap gap-2">{tags}</div></div>
<div class="flex gap-4">
<a id="edit-resource" href="/current/edit" class="bg-primary text-white rounded px-4 py-2">Edit</a>
<a id="delete-resource" href="/current/delete" class="bg-red-600 text-white rounded px-4 py-2">Delete</a>
<a id="close-modal-btn" href="/" class="border rounded px-4 py-2">Close</a>
</div>
</article>"#,
        title = escape(&resource.title),
        kind = escape(type_label(&resource.kind)),
        level_class = level_class(&resource.level),
        level = escape(level_label(&resource.level)),
        added = format_date(&resource.created_at),
        link = escape(&resource.link),
    );
    layout(&resource.title, &body)
}

pub fn edit_form(resource: &Resource, categories: &[Category]) -> String {
    let body = format!(
        r#"<section class="bg-white rounded-lg shadow p-6">
<h2 class="font-bold text-lg mb-4">Edit resource</h2>
<form id="edit-resource-form" method="post" action="/resources/{id}/update" class="grid grid-cols-1 md:grid-cols-2 gap-4">
{fields}
<div class="flex gap-4 md:col-span-2">
<button type="submit" class="bg-primary text-white rounded px-4 py-2">Save</button>
<a id="cancel-edit" href="/resources/{id}" class="border rounded px-4 py-2">Cancel</a>
</div>
</form>
</section>"#,
        id = escape(&resource.id),
        fields = resource_fields(categories, &ResourceForm::from_resource(resource)),
    );
    layout("Edit resource", &body)
}

pub fn confirm_delete(resource: &Resource) -> String {
    let body = format!(
        r#"<section class="bg-white rounded-lg shadow p-6">
<h2 class="font-bold text-lg mb-4">Delete this resource?</h2>
<p class="mb-4">{title}</p>
<form method="post" action="/current/delete" class="flex gap-4">
<button type="submit" class="bg-red-600 text-white rounded px-4 py-2">Delete</button>
<a href="/resources/{id}" class="border rounded px-4 py-2">Cancel</a>
</form>
</section>"#,
        title = escape(&resource.title),
        id = escape(&resource.id),
    );
    layout("Delete resource", &body)
}

/// Blocking message shown when a submission is rejected.
pub fn alert(message: &str) -> String {
    let body = format!(
        r#"<section role="alert" class="bg-yellow-50 border border-yellow-400 rounded-lg p-6">
<p class="font-semibold mb-4">{}</p>
<a href="javascript:history.back()" class="border rounded px-4 py-2">Back</a>
</section>"#,
        escape(message)
    );
    layout("Attention", &body)
}

pub fn not_found() -> String {
    layout(
        "Not found",
        r#"<section class="text-center py-12"><p class="text-gray-500">Resource not found</p><a href="/" class="text-primary">Back to the library</a></section>"#,
    )
}

pub fn error(message: &str) -> String {
    let body = format!(
        r#"<section class="text-center py-12"><p class="text-red-600">{}</p></section>"#,
        escape(message)
    );
    layout("Error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn escape_handles_markup() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn back_links_are_percent_encoded() {
        assert_eq!(back_link("all", SortOrder::NameAsc, ""), "/?category=all&sort=name-asc");
        assert_eq!(back_link("all", SortOrder::DateDesc, "maya rig&fx"), "/?q=maya%20rig%26fx");
        assert_eq!(back_link("all", SortOrder::DateDesc, "é"), "/?q=%C3%A9");
    }

    #[test]
    fn home_lists_all_default_resources() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let html = home(&catalog, "all", SortOrder::DateDesc, "");
        assert!(html.contains("Maya 2024 Getting Started"));
        assert!(html.contains("Fluid Effects Workshop"));
        assert!(html.contains(r#"<p id="total-resources" class="text-2xl font-bold">3</p>"#));
        assert!(html.contains(r#"<p id="total-favorites" class="text-2xl font-bold">1</p>"#));
    }

    #[test]
    fn home_shows_empty_search_message() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let html = home(&catalog, "all", SortOrder::DateDesc, "zzz");
        assert!(html.contains("No matching resources"));
        assert!(!html.contains("Fluid Effects Workshop"));
    }

    #[test]
    fn dangling_category_renders_uncategorized() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let mut resource = catalog.resource_by_id("1").unwrap().clone();
        resource.category = "gone".to_string();
        let card = resource_card(&resource, None, "/");
        assert!(card.contains(UNCATEGORIZED));
        assert!(card.contains(DEFAULT_CATEGORY_COLOR));
    }

    #[test]
    fn details_show_fallbacks_for_blank_fields() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let mut resource = catalog.resource_by_id("3").unwrap().clone();
        resource.description.clear();
        resource.tags = " , ".to_string();
        let html = details(&resource, catalog.category_by_id("3"));
        assert!(html.contains("No description"));
        assert!(html.contains("No tags"));
        assert!(html.contains("Visual Effects"));
    }

    #[test]
    fn edit_form_preselects_current_values() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let resource = catalog.resource_by_id("2").unwrap();
        let html = edit_form(resource, catalog.list_categories());
        assert!(html.contains(r#"<option value="2" selected>Character Animation</option>"#));
        assert!(html.contains(r#"<option value="document" selected>Document</option>"#));
        assert!(html.contains(r#"<option value="intermediate" selected>Intermediate</option>"#));
        assert!(html.contains(r#"action="/resources/2/update""#));
    }

    #[test]
    fn edit_form_keeps_unknown_type_and_level() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let mut resource = catalog.resource_by_id("1").unwrap().clone();
        resource.kind = ResourceType::Custom("podcast".to_string());
        resource.level = Level::Custom("expert".to_string());
        let html = edit_form(&resource, catalog.list_categories());
        assert!(html.contains(r#"<option value="podcast" selected>podcast</option>"#));
        assert!(html.contains(r#"<option value="expert" selected>expert</option>"#));

        let known = edit_form(catalog.resource_by_id("1").unwrap(), catalog.list_categories());
        assert_eq!(known.matches(" selected>").count(), 3);
    }

    #[test]
    fn edit_form_keeps_dangling_category() {
        let catalog = Catalog::load(MemoryStore::new()).unwrap();
        let mut resource = catalog.resource_by_id("1").unwrap().clone();
        resource.category = "gone".to_string();
        let html = edit_form(&resource, catalog.list_categories());
        assert!(html.contains(r#"<option value="gone" selected>Uncategorized</option>"#));
    }
}
