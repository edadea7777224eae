// leadline-client/examples/lead_console.rs
// Log in, list leads page by page and tail one lead's comments
//
// Usage: lead_console [search] [page]
// Environment: LEADLINE_API_URL, LEADLINE_EMAIL/LEADLINE_PASSWORD or LEADLINE_TOKEN,
// optionally LEADLINE_PUSH_URL for live comments.

use std::time::Duration;

use anyhow::Context;
use leadline_client::{
    ClientConfig, CommentSync, LeadApi, LeadQuery, LeadService, LeadSort, LeadStore, Paginator,
    PushClient, PushConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_console=info,leadline_client=info".into()),
        )
        .init();

    let config = ClientConfig::from_env().context("invalid client configuration")?;
    let api = LeadApi::from_config(&config)?;

    match (
        std::env::var("LEADLINE_EMAIL"),
        std::env::var("LEADLINE_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => {
            api.login(&email, &password).await.context("login failed")?;
        }
        _ => {
            api.me().await.context("token rejected, set LEADLINE_EMAIL and LEADLINE_PASSWORD")?;
        }
    }
    let user = api.session().require_user()?;
    tracing::info!("Logged in as {} ({})", user.name, user.role);

    let mut args = std::env::args().skip(1);
    let search = args.next().unwrap_or_default();
    let page_number: usize = args.next().and_then(|p| p.parse().ok()).unwrap_or(1);

    let store = LeadStore::new();
    let service = LeadService::new(api.clone(), store.clone());
    let count = service.load_for_session().await?;
    tracing::info!("Loaded {} leads", count);

    let query = LeadQuery::new().search(search).sort(LeadSort::Newest);
    let visible = store.with_leads(|leads| query.apply(leads));

    let mut paginator = Paginator::new(config.page_size)?;
    paginator.go_to(page_number.saturating_sub(1));
    let page = paginator.page(&visible);

    println!(
        "Page {}/{} ({} matching)",
        page.page_number, page.total_pages, page.total_items
    );
    for lead in &page.items {
        let assignees: Vec<&str> = lead.assignees.iter().map(|u| u.name.as_str()).collect();
        println!(
            "#{:<5} {:<24} {:<12} {:<8} {:<12} {}",
            lead.id,
            lead.customer_name,
            lead.status.as_str(),
            lead.priority.as_str(),
            lead.title,
            assignees.join(", ")
        );
    }

    let Some(first) = page.items.first() else {
        return Ok(());
    };
    if config.push_url.is_none() {
        return Ok(());
    }

    let push = PushClient::from_config(&config, PushConfig::default(), api.session()).await?;
    let mut comments = CommentSync::open(api, &push, first).await?;
    comments.loaded().await?;

    let mut changes = comments.watch();
    println!("\nComments on #{} (watching for 30s)", first.id);
    let deadline = tokio::time::sleep(Duration::from_secs(30));
    tokio::pin!(deadline);
    loop {
        comments.with_thread(|thread| {
            for entry in thread.threads() {
                println!("  {}: {}", entry.comment.user.name, entry.comment.content);
                for reply in entry.replies {
                    println!("    ↳ {}: {}", reply.user.name, reply.content);
                }
            }
        });
        tokio::select! {
            _ = &mut deadline => break,
            changed = changes.changed() => if changed.is_err() { break },
        }
        println!("  --");
    }

    comments.close().await;
    push.close();
    Ok(())
}
