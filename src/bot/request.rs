use crate::identity::LookupKind;

pub const SETUP_COMMAND: &str = "setup_control_panel";

pub const BTN_AVATAR: &str = "btn_avatar";
pub const BTN_BANNER: &str = "btn_banner";
pub const BTN_DOWNLOAD: &str = "btn_download";
pub const BTN_BOOST: &str = "btn_boost";
pub const BTN_NITRO: &str = "btn_nitro";

pub const MODAL_AVATAR: &str = "user_input_avatar";
pub const MODAL_BANNER: &str = "user_input_banner";
pub const MODAL_DOWNLOAD: &str = "download_options";

pub const FIELD_USER_IDENTIFIER: &str = "user_identifier";
pub const FIELD_MEDIA_URL: &str = "media_url";

/// Panel features that are announced but not available yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perk {
    Boost,
    Nitro,
}

impl Perk {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Boost => "Boost",
            Self::Nitro => "Nitro",
        }
    }
}

/// Everything the bot can be asked to do, keyed off interaction identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotRequest {
    SetupControlPanel,
    OpenLookupForm(LookupKind),
    OpenDownloadForm,
    ComingSoon(Perk),
    Lookup { kind: LookupKind, identifier: String },
    Download { url: String },
    Unknown(String),
}

impl BotRequest {
    pub fn from_command(name: &str) -> Self {
        match name {
            SETUP_COMMAND => Self::SetupControlPanel,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn from_component(custom_id: &str) -> Self {
        match custom_id {
            BTN_AVATAR => Self::OpenLookupForm(LookupKind::Avatar),
            BTN_BANNER => Self::OpenLookupForm(LookupKind::Banner),
            BTN_DOWNLOAD => Self::OpenDownloadForm,
            BTN_BOOST => Self::ComingSoon(Perk::Boost),
            BTN_NITRO => Self::ComingSoon(Perk::Nitro),
            other => Self::Unknown(other.to_string()),
        }
    }

    /// `fields` are `(custom_id, value)` pairs from the submitted form.
    pub fn from_modal(custom_id: &str, fields: &[(String, String)]) -> Self {
        let field = |name: &str| {
            fields
                .iter()
                .find(|(id, _)| id == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };
        match custom_id {
            MODAL_AVATAR => Self::Lookup {
                kind: LookupKind::Avatar,
                identifier: field(FIELD_USER_IDENTIFIER),
            },
            MODAL_BANNER => Self::Lookup {
                kind: LookupKind::Banner,
                identifier: field(FIELD_USER_IDENTIFIER),
            },
            MODAL_DOWNLOAD => Self::Download {
                url: field(FIELD_MEDIA_URL),
            },
            other => Self::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_command() {
        assert_eq!(BotRequest::from_command("setup_control_panel"), BotRequest::SetupControlPanel);
        assert_eq!(
            BotRequest::from_command("ping"),
            BotRequest::Unknown("ping".into())
        );
    }

    #[test]
    fn test_buttons() {
        assert_eq!(
            BotRequest::from_component("btn_avatar"),
            BotRequest::OpenLookupForm(LookupKind::Avatar)
        );
        assert_eq!(
            BotRequest::from_component("btn_banner"),
            BotRequest::OpenLookupForm(LookupKind::Banner)
        );
        assert_eq!(BotRequest::from_component("btn_download"), BotRequest::OpenDownloadForm);
        assert_eq!(BotRequest::from_component("btn_boost"), BotRequest::ComingSoon(Perk::Boost));
        assert_eq!(BotRequest::from_component("btn_nitro"), BotRequest::ComingSoon(Perk::Nitro));
        assert!(matches!(BotRequest::from_component("btn_other"), BotRequest::Unknown(_)));
    }

    #[test]
    fn test_lookup_modals() {
        let submitted = fields(&[("user_identifier", "<@123>")]);
        assert_eq!(
            BotRequest::from_modal("user_input_avatar", &submitted),
            BotRequest::Lookup {
                kind: LookupKind::Avatar,
                identifier: "<@123>".into()
            }
        );
        assert_eq!(
            BotRequest::from_modal("user_input_banner", &submitted),
            BotRequest::Lookup {
                kind: LookupKind::Banner,
                identifier: "<@123>".into()
            }
        );
    }

    #[test]
    fn test_download_modal() {
        let submitted = fields(&[("media_url", "https://youtu.be/x")]);
        assert_eq!(
            BotRequest::from_modal("download_options", &submitted),
            BotRequest::Download {
                url: "https://youtu.be/x".into()
            }
        );
    }

    #[test]
    fn test_missing_field_is_empty() {
        assert_eq!(
            BotRequest::from_modal("download_options", &[]),
            BotRequest::Download { url: String::new() }
        );
    }
}
