//! Session commands.

use serde::Serialize;

use petkit_core::PetkitClient;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct LoginSummary {
    username: String,
    region: Option<String>,
    gateway: Option<String>,
    user_id: Option<String>,
    expires_in: Option<i64>,
}

fn detail(s: &LoginSummary) -> String {
    [
        format!("User:     {}", s.username),
        format!("Region:   {}", s.region.as_deref().unwrap_or("-")),
        format!("Gateway:  {}", s.gateway.as_deref().unwrap_or("-")),
        format!("User ID:  {}", s.user_id.as_deref().unwrap_or("-")),
        format!(
            "Expires:  {}",
            s.expires_in.map_or_else(|| "-".into(), |e| format!("{e}s"))
        ),
    ]
    .join("\n")
}

pub async fn handle(
    client: &PetkitClient,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if args.request_code {
        client.request_login_code().await?;
        if !global.quiet {
            eprintln!("Login code sent. Run: petkit login --code <CODE>");
        }
        return Ok(());
    }

    match args.code {
        Some(ref code) => client.login_with_code(code).await?,
        None => client.login().await?,
    }

    let region = client.api().region().await;
    let session = client.session().await;
    let summary = LoginSummary {
        username: client.api().credentials().username.clone(),
        region: region.as_ref().map(|r| r.id.clone()),
        gateway: region.map(|r| r.gateway.to_string()),
        user_id: session.as_ref().map(|s| s.user_id.clone()),
        expires_in: session.map(|s| s.expires_in),
    };

    let out = output::render_single(&global.output, &summary, detail, |s| s.username.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
