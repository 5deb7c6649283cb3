use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::io::{self, Write};

use resource_catalog::models::{
    Category, CategoryForm, CategoryListResponse, FavoriteResponse, Level, Resource,
    ResourceForm, ResourceListResponse, ResourcePatch, ResourceType, Statistics,
};
use resource_catalog::web::labels::{format_date, level_label, type_label, UNCATEGORIZED};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "A CLI tool for browsing and editing the resource catalog", long_about = None)]
struct Cli {
    #[arg(
        long,
        env = "CATALOG_API_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the catalog server"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List resources")]
    List {
        #[arg(short, long, help = "Only show resources in this category id")]
        category: Option<String>,

        #[arg(short, long, help = "date-desc, date-asc, name-asc or name-desc")]
        sort: Option<String>,

        #[arg(short = 'q', long, help = "Search title, description and tags")]
        search: Option<String>,
    },

    #[command(about = "Show one resource in detail")]
    Show { id: String },

    #[command(about = "Add a new resource")]
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, help = "Category id")]
        category: String,

        #[arg(short = 'k', long = "type", help = "video, document, project or other")]
        kind: String,

        #[arg(short, long, help = "beginner, intermediate or advanced")]
        level: String,

        #[arg(long, help = "Link or path to the resource")]
        link: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long, default_value = "", help = "Comma separated tags")]
        tags: String,
    },

    #[command(about = "Edit fields of an existing resource")]
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short = 'k', long = "type")]
        kind: Option<String>,

        #[arg(short, long)]
        level: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long)]
        tags: Option<String>,
    },

    #[command(about = "Delete a resource")]
    Delete {
        id: String,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Toggle the favorite flag of a resource")]
    Favorite { id: String },

    #[command(about = "List categories")]
    Categories,

    #[command(about = "Add a new category")]
    AddCategory {
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "", help = "Hex color, defaults to #3B82F6")]
        color: String,
    },

    #[command(about = "Show catalog statistics")]
    Stats,
}

struct ApiClient {
    client: reqwest::Client,
    base: String,
}

impl ApiClient {
    fn new(base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base, path)
    }

    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> anyhow::Result<T> {
        if !response.status().is_success() {
            let error_text = response.text().await?;
            bail!("Failed to {}: {}", action, error_text);
        }
        Ok(response.json().await?)
    }

    async fn categories(&self) -> anyhow::Result<Vec<Category>> {
        let response = self.client.get(self.url("/categories")).send().await?;
        let result: CategoryListResponse = Self::read(response, "fetch categories").await?;
        Ok(result.categories)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let api = ApiClient::new(cli.api_url);

    if let Err(e) = run(&api, cli.command).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(api: &ApiClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List {
            category,
            sort,
            search,
        } => list_resources(api, category, sort, search).await,
        Commands::Show { id } => show_resource(api, &id).await,
        Commands::Add {
            title,
            category,
            kind,
            level,
            link,
            description,
            tags,
        } => {
            let form = ResourceForm {
                title,
                category,
                kind,
                level,
                description,
                link,
                tags,
            };
            add_resource(api, form).await
        }
        Commands::Edit {
            id,
            title,
            category,
            kind,
            level,
            link,
            description,
            tags,
        } => {
            let patch = ResourcePatch {
                title,
                category,
                kind: kind.map(ResourceType::from),
                level: level.map(Level::from),
                description,
                link,
                tags,
            };
            edit_resource(api, &id, patch).await
        }
        Commands::Delete { id, yes } => delete_resource(api, &id, yes).await,
        Commands::Favorite { id } => toggle_favorite(api, &id).await,
        Commands::Categories => list_categories(api).await,
        Commands::AddCategory { name, color } => add_category(api, CategoryForm { name, color }).await,
        Commands::Stats => show_statistics(api).await,
    }
}

async fn list_resources(
    api: &ApiClient,
    category: Option<String>,
    sort: Option<String>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let mut query = Vec::new();
    if let Some(category) = category {
        query.push(("category", category));
    }
    if let Some(sort) = sort {
        query.push(("sort", sort));
    }
    if let Some(search) = search {
        query.push(("q", search));
    }

    let response = api
        .client
        .get(api.url("/resources"))
        .query(&query)
        .send()
        .await?;
    let result: ResourceListResponse = ApiClient::read(response, "fetch resources").await?;

    if result.resources.is_empty() {
        println!("📭 No resources found.");
        return Ok(());
    }

    let categories = api.categories().await?;
    println!("\n📚 Resources ({})\n", result.resources.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Title"),
        Cell::new("Category"),
        Cell::new("Type"),
        Cell::new("Level"),
        Cell::new("★"),
        Cell::new("Added"),
    ]));

    for resource in &result.resources {
        table.add_row(Row::new(vec![
            Cell::new(&resource.id),
            Cell::new(&resource.title),
            Cell::new(category_name(&categories, &resource.category)),
            Cell::new(type_label(&resource.kind)),
            Cell::new(level_label(&resource.level)),
            Cell::new(if resource.favorite { "★" } else { "" }),
            Cell::new(&format_date(&resource.created_at)),
        ]));
    }

    table.printstd();
    println!();

    Ok(())
}

fn resource_path(id: &str) -> String {
    format!("/resources/{}", urlencoding::encode(id))
}

fn category_name<'a>(categories: &'a [Category], id: &str) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNCATEGORIZED)
}

async fn fetch_resource(api: &ApiClient, id: &str) -> anyhow::Result<Resource> {
    let response = api
        .client
        .get(api.url(&resource_path(id)))
        .send()
        .await?;
    ApiClient::read(response, "fetch resource").await
}

async fn show_resource(api: &ApiClient, id: &str) -> anyhow::Result<()> {
    let resource = fetch_resource(api, id).await?;
    let categories = api.categories().await?;
    let tags = resource.tag_list();

    println!("\n📖 {}{}", resource.title, if resource.favorite { " ★" } else { "" });
    println!("   Category: {}", category_name(&categories, &resource.category));
    println!("   Type: {}", type_label(&resource.kind));
    println!("   Level: {}", level_label(&resource.level));
    println!("   Added: {}", format_date(&resource.created_at));
    if resource.description.is_empty() {
        println!("   Description: No description");
    } else {
        println!("   Description: {}", resource.description);
    }
    println!("   Link: {}", resource.link);
    if tags.is_empty() {
        println!("   Tags: No tags");
    } else {
        println!("   Tags: {}", tags.join(", "));
    }
    println!("   ID: {}", resource.id);
    println!();

    Ok(())
}

async fn add_resource(api: &ApiClient, form: ResourceForm) -> anyhow::Result<()> {
    // Reject incomplete input before it reaches the server.
    let input = form.validate()?;

    let response = api
        .client
        .post(api.url("/resources"))
        .json(&ResourceForm {
            title: input.title,
            category: input.category,
            kind: input.kind.to_string(),
            level: input.level.to_string(),
            description: input.description,
            link: input.link,
            tags: input.tags,
        })
        .send()
        .await?;
    let created: Resource = ApiClient::read(response, "add resource").await?;

    println!("✅ Resource added successfully!");
    println!("   Title: {}", created.title);
    println!("   ID: {}", created.id);

    Ok(())
}

async fn edit_resource(api: &ApiClient, id: &str, patch: ResourcePatch) -> anyhow::Result<()> {
    if patch == ResourcePatch::default() {
        bail!("Nothing to update. Pass at least one field to change.");
    }
    patch.validate()?;

    let response = api
        .client
        .patch(api.url(&resource_path(id)))
        .json(&patch)
        .send()
        .await?;
    let updated: Resource = ApiClient::read(response, "update resource").await?;

    println!("✅ Resource updated successfully!");
    println!("   Title: {}", updated.title);
    println!("   ID: {}", updated.id);

    Ok(())
}

async fn delete_resource(api: &ApiClient, id: &str, yes: bool) -> anyhow::Result<()> {
    let resource = fetch_resource(api, id).await?;

    if !yes {
        print!("Delete \"{}\"? This cannot be undone (yes/no): ", resource.title);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input).context("Failed to read confirmation")?;

        let confirmed = input.trim().to_lowercase();
        if confirmed != "yes" && confirmed != "y" {
            println!("🚫 Delete cancelled.");
            return Ok(());
        }
    }

    let response = api
        .client
        .delete(api.url(&resource_path(id)))
        .send()
        .await?;
    if !response.status().is_success() {
        let error_text = response.text().await?;
        bail!("Failed to delete resource: {}", error_text);
    }

    println!("🗑️  Deleted \"{}\"", resource.title);
    Ok(())
}

async fn toggle_favorite(api: &ApiClient, id: &str) -> anyhow::Result<()> {
    let response = api
        .client
        .post(api.url(&format!("{}/favorite", resource_path(id))))
        .send()
        .await?;
    let result: FavoriteResponse = ApiClient::read(response, "toggle favorite").await?;

    if result.favorite {
        println!("⭐ Added {} to favorites", result.id);
    } else {
        println!("☆ Removed {} from favorites", result.id);
    }
    Ok(())
}

async fn list_categories(api: &ApiClient) -> anyhow::Result<()> {
    let categories = api.categories().await?;

    if categories.is_empty() {
        println!("📭 No categories found.");
        return Ok(());
    }

    println!("\n🗂️  Categories ({})\n", categories.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Color"),
    ]));
    for category in &categories {
        table.add_row(Row::new(vec![
            Cell::new(&category.id),
            Cell::new(&category.name),
            Cell::new(&category.color),
        ]));
    }

    table.printstd();
    println!();

    Ok(())
}

async fn add_category(api: &ApiClient, form: CategoryForm) -> anyhow::Result<()> {
    let input = form.validate()?;

    let response = api
        .client
        .post(api.url("/categories"))
        .json(&CategoryForm {
            name: input.name,
            color: input.color,
        })
        .send()
        .await?;
    let created: Category = ApiClient::read(response, "add category").await?;

    println!("✅ Category added successfully!");
    println!("   Name: {}", created.name);
    println!("   Color: {}", created.color);
    println!("   ID: {}", created.id);

    Ok(())
}

async fn show_statistics(api: &ApiClient) -> anyhow::Result<()> {
    let response = api.client.get(api.url("/statistics")).send().await?;
    let stats: Statistics = ApiClient::read(response, "fetch statistics").await?;

    println!("\n📊 Catalog statistics\n");
    println!("   Resources:  {}", stats.total_resources);
    println!("   Categories: {}", stats.total_categories);
    println!("   Favorites:  {}", stats.total_favorites);
    println!();

    Ok(())
}
