//! `tank search` / `tank info`: read-only registry queries.

use crate::context::Context;
use crate::registry::{RegistryClient, SearchResult, SkillInfo};

pub async fn search(ctx: &Context, query: &str) -> anyhow::Result<Vec<SearchResult>> {
    let client = RegistryClient::new(ctx.registry.clone(), ctx.token.clone());
    Ok(client.search(query).await?)
}

pub async fn info(ctx: &Context, name: &str) -> anyhow::Result<SkillInfo> {
    let client = RegistryClient::new(ctx.registry.clone(), ctx.token.clone());
    Ok(client.info(name).await?)
}
