use super::panel::card_embed;
use crate::delivery::{DeliveryError, Reply, ReplyBody};
use async_trait::async_trait;
use serenity::all::{CreateAttachment, EditInteractionResponse, Http, ModalInteraction};
use std::sync::Arc;

/// Edits the deferred response of a submitted form.
pub struct InteractionReply {
    http: Arc<Http>,
    interaction: ModalInteraction,
}

impl InteractionReply {
    pub fn new(http: Arc<Http>, interaction: ModalInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl Reply for InteractionReply {
    async fn edit(&self, body: ReplyBody) -> Result<(), DeliveryError> {
        let builder = match body {
            ReplyBody::Text(text) => EditInteractionResponse::new()
                .content(text)
                .embeds(Vec::new()),
            ReplyBody::Card(card) => EditInteractionResponse::new()
                .content("")
                .embeds(vec![card_embed(&card)]),
            ReplyBody::File {
                content,
                path,
                filename,
            } => {
                let mut attachment = CreateAttachment::path(&path)
                    .await
                    .map_err(|e| DeliveryError(format!("{}: {}", path.display(), e)))?;
                attachment.filename = filename;
                EditInteractionResponse::new()
                    .content(content)
                    .embeds(Vec::new())
                    .new_attachment(attachment)
            }
        };

        self.interaction
            .edit_response(self.http.as_ref(), builder)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError(e.to_string()))
    }
}
