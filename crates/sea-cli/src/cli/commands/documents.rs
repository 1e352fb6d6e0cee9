//! Document search and link handlers.

use anyhow::{Context, Result};
use sea_core::api::SeaClient;

pub async fn search(client: &SeaClient, query: &str) -> Result<()> {
    let results = client
        .search_documents(query)
        .await
        .with_context(|| format!("search documents for '{query}'"))?;

    if results.is_empty() {
        println!("No documents found.");
    } else {
        for doc in results {
            println!("{}  {}", doc.file_hash, doc.file_name);
        }
    }
    Ok(())
}

pub fn doc_url(client: &SeaClient, hash: &str, open_in_browser: bool) {
    let url = client.build_document_url(hash);
    println!("{url}");

    // Best effort, skipped in tests.
    if open_in_browser
        && std::env::var("SEA_NO_BROWSER").is_err()
        && let Err(e) = open::that(url.as_str())
    {
        tracing::warn!("Could not open browser: {e}");
    }
}
