//! Embeds, buttons and forms shown by the bot.

use super::request::*;
use crate::delivery::Card;
use crate::identity::LookupKind;
use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateCommand, CreateEmbed, CreateEmbedFooter,
    CreateInputText, CreateModal, InputTextStyle, Permissions, Timestamp,
};

const BLURPLE: u32 = 0x5865F2;
const GOLD: u32 = 0xFFD700;

pub fn setup_command() -> CreateCommand {
    CreateCommand::new(SETUP_COMMAND)
        .description("Post the Haven control panel in this channel")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .dm_permission(false)
}

/// `logo` is the attachment name of the panel thumbnail, when one is uploaded.
pub fn control_panel_embed(logo: Option<&str>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎛️ Haven Control Panel")
        .description(
            "Welcome to the Haven control panel!\n\nUse the buttons below to look up \
             avatars and banners or to download videos.",
        )
        .color(BLURPLE)
        .field(
            "👤 Avatar",
            "Show a user's avatar in high quality",
            true,
        )
        .field("🎨 Banner", "Show a user's profile banner", true)
        .field(
            "⬇️ Download",
            "Download a video from YouTube or TikTok",
            true,
        )
        .footer(CreateEmbedFooter::new("Haven Control Bot"))
        .timestamp(Timestamp::now());
    if let Some(name) = logo {
        embed = embed.thumbnail(format!("attachment://{}", name));
    }
    embed
}

pub fn control_panel_buttons() -> Vec<CreateActionRow> {
    vec![
        CreateActionRow::Buttons(vec![
            CreateButton::new(BTN_AVATAR)
                .label("Avatar")
                .emoji('👤')
                .style(ButtonStyle::Primary),
            CreateButton::new(BTN_BANNER)
                .label("Banner")
                .emoji('🎨')
                .style(ButtonStyle::Primary),
            CreateButton::new(BTN_DOWNLOAD)
                .label("Download")
                .emoji('⬇')
                .style(ButtonStyle::Success),
        ]),
        CreateActionRow::Buttons(vec![
            CreateButton::new(BTN_BOOST)
                .label("Boost")
                .emoji('🚀')
                .style(ButtonStyle::Secondary),
            CreateButton::new(BTN_NITRO)
                .label("Nitro")
                .emoji('💎')
                .style(ButtonStyle::Secondary),
        ]),
    ]
}

pub fn lookup_modal(kind: LookupKind) -> CreateModal {
    let (custom_id, title) = match kind {
        LookupKind::Avatar => (MODAL_AVATAR, "Show avatar"),
        LookupKind::Banner => (MODAL_BANNER, "Show banner"),
    };
    let input = CreateInputText::new(InputTextStyle::Short, "User ID or name", FIELD_USER_IDENTIFIER)
        .placeholder("e.g. 123456789012345678 or username")
        .required(true);
    CreateModal::new(custom_id, title).components(vec![CreateActionRow::InputText(input)])
}

pub fn download_modal() -> CreateModal {
    let input = CreateInputText::new(InputTextStyle::Short, "Video link", FIELD_MEDIA_URL)
        .placeholder("YouTube or TikTok link")
        .required(true);
    CreateModal::new(MODAL_DOWNLOAD, "Download video")
        .components(vec![CreateActionRow::InputText(input)])
}

pub fn coming_soon_embed(perk: Perk) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("{} - coming soon", perk.display_name()))
        .description("This feature is under development and will be available soon!")
        .color(GOLD)
}

pub fn card_embed(card: &Card) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&card.title)
        .description(&card.description)
        .color(card.color)
        .timestamp(Timestamp::now());
    for field in &card.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(url) = &card.image_url {
        embed = embed.image(url);
    }
    if let Some(url) = &card.thumbnail_url {
        embed = embed.thumbnail(url);
    }
    if let Some(footer) = &card.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    embed
}
