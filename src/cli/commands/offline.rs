//! Offline command - show or toggle offline mode

use crate::cli::args::{OfflineAction, OfflineArgs};
use crate::cli::AppContext;
use crate::error::ChemResult;
use crate::ui::{self, UiContext};

/// Execute the offline command
pub async fn execute(args: OfflineArgs, app: &AppContext) -> ChemResult<()> {
    let ctx = UiContext::detect();
    let service = app.open_service().await?;

    match args.action.unwrap_or(OfflineAction::Status) {
        OfflineAction::On => {
            service.set_offline_mode(true).await?;
            ui::step_ok(&ctx, "Offline mode enabled");
            ui::remark(&ctx, "Only cached compounds can be looked up");
        }
        OfflineAction::Off => {
            service.set_offline_mode(false).await?;
            ui::step_ok(&ctx, "Offline mode disabled");
        }
        OfflineAction::Status => {
            let offline = service.is_offline_mode();
            ui::key_value_status(
                &ctx,
                "Offline mode",
                if offline { "on" } else { "off" },
                !offline,
            );
        }
    }

    Ok(())
}
