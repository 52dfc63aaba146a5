use crate::commands::common::{confirm, open_signed_in_hub, resolve_note};
use crate::error::CliError;

pub async fn run_delete(
    id: &str,
    skip_confirmation: bool,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let hub = open_signed_in_hub(global_profile).await?;
    let note = resolve_note(hub.store(), id)?;

    let lifecycle = hub.lifecycle();
    let prompt = format!(
        "Are you sure you want to delete \"{}\"?",
        note.display_title()
    );
    lifecycle.begin_delete(note)?;

    if !skip_confirmation && !confirm(&prompt)? {
        lifecycle.cancel()?;
        println!("Cancelled");
        return Ok(());
    }

    let deleted = lifecycle.confirm_delete().await?;
    println!("{deleted}");
    Ok(())
}
