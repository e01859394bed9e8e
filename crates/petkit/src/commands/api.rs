//! Raw API passthrough.

use petkit_api::{Method, Params};
use petkit_core::PetkitClient;

use crate::cli::{ApiArgs, GlobalOpts, HttpMethod};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &PetkitClient,
    args: ApiArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let method = match args.method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    };
    let params: Params = args.params.into_iter().collect();
    let path = args.path.trim_start_matches('/');

    tracing::debug!(%method, path, "api passthrough");
    let result = client.send_api_request(method, path, &params).await?;
    output::print_output(&output::render_value(&global.output, &result), global.quiet);
    Ok(())
}
