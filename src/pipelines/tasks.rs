//! Recent Earth Engine tasks.

use crate::config::AuthConfig;
use crate::ee::Operation;
use crate::error::Result;
use crate::output::print_operations;
use crate::pipelines::PipelineContext;

/// Print the most recent operations of `project`.
pub async fn list_tasks(ctx: &PipelineContext, project: &str, limit: usize) -> Result<Vec<Operation>> {
    let token = ctx.token_source(&AuthConfig::default()).await?;
    let api = ctx.earth_engine(project, token);

    let operations = api.list_operations(limit).await?;
    print_operations(&operations);
    Ok(operations)
}
