//! User management CLI commands.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Create a user and print the API key, which is shown only once.
///
/// # Examples
///
/// ```bash
/// chatbox user create alice
/// chatbox user create bob --json
/// ```
pub async fn create_user(state: &AppState, username: &str, json: bool) -> Result<()> {
    let created = state.user_service.create_user(username).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "id": created.user.id,
                "username": created.user.username,
                "api_key": created.api_key,
            })
        );
    } else {
        println!();
        println!(
            "  {} User '{}' created ({})",
            style("✓").green().bold(),
            style(&created.user.username).bold(),
            style(created.user.id).dim()
        );
        println!();
        println!("  API key (save this -- it won't be shown again):");
        println!("  {}", style(&created.api_key).yellow().bold());
        println!();
    }

    Ok(())
}
