//! Serenity event handler and interaction dispatch.

mod directory;
mod panel;
mod reply;
mod request;

pub use directory::SerenityDirectory;
pub use reply::InteractionReply;
pub use request::{BotRequest, Perk};

use crate::app::AppContext;
use crate::identity;
use crate::registry::ControlPanelRecord;
use anyhow::{Context as _, Result};
use serenity::all::{
    ActionRowComponent, ActivityData, Command, CommandInteraction, ComponentInteraction, Context,
    CreateAttachment, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateMessage, EditInteractionResponse, EventHandler,
    Interaction, ModalInteraction, Permissions, Ready,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const APOLOGY: &str = "❌ Sorry, something went wrong. Please try again.";

pub struct Handler {
    app: Arc<AppContext>,
}

impl Handler {
    pub fn new(app: Arc<AppContext>) -> Self {
        Self { app }
    }
}

#[serenity::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Connected as {}", ready.user.tag());

        match Command::set_global_commands(&ctx.http, vec![panel::setup_command()]).await {
            Ok(commands) => info!("Registered {} slash command(s)", commands.len()),
            Err(e) => error!("Failed to register slash commands: {}", e),
        }

        ctx.set_activity(Some(ActivityData::playing(
            self.app.config.discord.presence.clone(),
        )));
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let result = match &interaction {
            Interaction::Command(cmd) => self.on_command(&ctx, cmd).await,
            Interaction::Component(comp) => self.on_component(&ctx, comp).await,
            Interaction::Modal(modal) => self.on_modal(&ctx, modal).await,
            _ => Ok(()),
        };

        if let Err(e) = result {
            error!("Interaction failed: {:#}", e);
            apologize(&ctx, &interaction).await;
        }
    }
}

// ============ COMMANDS ============

impl Handler {
    async fn on_command(&self, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
        match BotRequest::from_command(&cmd.data.name) {
            BotRequest::SetupControlPanel => self.setup_control_panel(ctx, cmd).await,
            other => {
                debug!("Ignoring command {:?}", other);
                Ok(())
            }
        }
    }

    async fn setup_control_panel(&self, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
        let is_admin = is_administrator(cmd.member.as_ref().and_then(|m| m.permissions));
        cmd.create_response(&ctx.http, setup_acknowledgement(is_admin))
            .await
            .context("Failed to acknowledge setup command")?;
        if !is_admin {
            return Ok(());
        }

        let outcome = match self.post_control_panel(ctx, cmd).await {
            Ok(()) => "✅ Control panel created successfully!",
            Err(e) => {
                error!("Control panel setup failed: {:#}", e);
                APOLOGY
            }
        };
        cmd.edit_response(&ctx.http, EditInteractionResponse::new().content(outcome))
            .await
            .context("Failed to report setup result")?;
        Ok(())
    }

    async fn post_control_panel(&self, ctx: &Context, cmd: &CommandInteraction) -> Result<()> {
        let mut message = CreateMessage::new().components(panel::control_panel_buttons());
        let logo_path = Path::new(&self.app.config.discord.logo_path);
        let logo = if logo_path.exists() {
            match CreateAttachment::path(logo_path).await {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    warn!("Could not attach panel logo {}: {}", logo_path.display(), e);
                    None
                }
            }
        } else {
            None
        };
        message = message.embed(panel::control_panel_embed(
            logo.as_ref().map(|a| a.filename.as_str()),
        ));
        if let Some(logo) = logo {
            message = message.add_file(logo);
        }

        let posted = cmd
            .channel_id
            .send_message(&ctx.http, message)
            .await
            .context("Failed to post control panel")?;

        self.app
            .registry
            .append(ControlPanelRecord::new(
                posted.id.get(),
                posted.channel_id.get(),
                cmd.guild_id.map(|g| g.get()),
            ))
            .await
            .context("Failed to record control panel")?;
        Ok(())
    }
}

fn is_administrator(permissions: Option<Permissions>) -> bool {
    permissions.is_some_and(|p| p.administrator())
}

/// First response to the setup command, sent before any slow work.
fn setup_acknowledgement(is_admin: bool) -> CreateInteractionResponse {
    if is_admin {
        CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new().ephemeral(true))
    } else {
        CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content("❌ This command is for administrators only.")
                .ephemeral(true),
        )
    }
}

// ============ BUTTONS ============

impl Handler {
    async fn on_component(&self, ctx: &Context, comp: &ComponentInteraction) -> Result<()> {
        let response = match BotRequest::from_component(&comp.data.custom_id) {
            BotRequest::OpenLookupForm(kind) => {
                CreateInteractionResponse::Modal(panel::lookup_modal(kind))
            }
            BotRequest::OpenDownloadForm => CreateInteractionResponse::Modal(panel::download_modal()),
            BotRequest::ComingSoon(perk) => CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(panel::coming_soon_embed(perk))
                    .ephemeral(true),
            ),
            other => {
                debug!("Ignoring component {:?}", other);
                return Ok(());
            }
        };

        comp.create_response(&ctx.http, response)
            .await
            .context("Failed to answer button")
    }
}

// ============ FORMS ============

impl Handler {
    async fn on_modal(&self, ctx: &Context, modal: &ModalInteraction) -> Result<()> {
        let request = BotRequest::from_modal(&modal.data.custom_id, &modal_fields(modal));
        if matches!(request, BotRequest::Unknown(_)) {
            debug!("Ignoring form {:?}", request);
            return Ok(());
        }

        modal
            .create_response(
                &ctx.http,
                CreateInteractionResponse::Defer(
                    CreateInteractionResponseMessage::new().ephemeral(true),
                ),
            )
            .await
            .context("Failed to defer form submission")?;

        let reply = InteractionReply::new(ctx.http.clone(), modal.clone());
        match request {
            BotRequest::Lookup { kind, identifier } => {
                let directory = SerenityDirectory::new(ctx.clone());
                let scope = modal.guild_id.map(|g| g.get());
                identity::handle(&directory, kind, &identifier, scope, &reply).await;
            }
            BotRequest::Download { url } => {
                self.app.pipeline.handle(&url, &reply).await;
            }
            other => debug!("Form produced non-form request {:?}", other),
        }
        Ok(())
    }
}

fn modal_fields(modal: &ModalInteraction) -> Vec<(String, String)> {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            ActionRowComponent::InputText(input) => Some((
                input.custom_id.clone(),
                input.value.clone().unwrap_or_default(),
            )),
            _ => None,
        })
        .collect()
}

/// Last-resort reply; failures here are only logged.
async fn apologize(ctx: &Context, interaction: &Interaction) {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(APOLOGY)
            .ephemeral(true),
    );
    let followup = CreateInteractionResponseFollowup::new()
        .content(APOLOGY)
        .ephemeral(true);

    let result = match interaction {
        Interaction::Command(cmd) => match cmd.create_response(&ctx.http, response).await {
            Ok(()) => Ok(()),
            Err(_) => cmd.create_followup(&ctx.http, followup).await.map(|_| ()),
        },
        Interaction::Component(comp) => match comp.create_response(&ctx.http, response).await {
            Ok(()) => Ok(()),
            Err(_) => comp.create_followup(&ctx.http, followup).await.map(|_| ()),
        },
        Interaction::Modal(modal) => match modal.create_response(&ctx.http, response).await {
            Ok(()) => Ok(()),
            Err(_) => modal.create_followup(&ctx.http, followup).await.map(|_| ()),
        },
        _ => Ok(()),
    };
    if let Err(e) = result {
        warn!("Could not send apology: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_administrator_check() {
        assert!(is_administrator(Some(Permissions::ADMINISTRATOR)));
        assert!(!is_administrator(Some(Permissions::MANAGE_MESSAGES)));
        assert!(!is_administrator(None));
    }

    #[test]
    fn test_setup_defers_for_admins() {
        assert!(matches!(
            setup_acknowledgement(true),
            CreateInteractionResponse::Defer(_)
        ));
    }

    #[test]
    fn test_setup_refuses_non_admins_immediately() {
        assert!(matches!(
            setup_acknowledgement(false),
            CreateInteractionResponse::Message(_)
        ));
    }
}
