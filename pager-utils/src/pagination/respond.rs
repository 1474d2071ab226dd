//! Discord-backed renderer for pagination sessions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use twilight_http::{Client, request::channel::reaction::RequestReactionType};
use twilight_model::{
    channel::message::{
        MessageFlags,
        component::{ActionRow, Component, TextInput, TextInputStyle},
    },
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::{Id, marker::ChannelMarker},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use super::{
    action::ControlMap,
    components::build_nav_components,
    dispatcher::{Dispatcher, DispatcherHandle},
    event::{Input, InteractionEvent, InteractionReply, MessageRef, Rejection},
    page::Page,
    registry::SessionRegistry,
    render::{ControlState, ControlsView, Render},
    session::Session,
    token::{JUMP_INPUT_ID, build_modal_custom_id},
};

/// Generic message shown when a pagination interaction belongs to another user.
pub const PAGINATION_WRONG_USER_MESSAGE: &str = "This pagination session belongs to another user.";
/// Generic message shown when a pagination interaction has expired.
pub const PAGINATION_EXPIRED_MESSAGE: &str =
    "This pagination session expired. Run the command again.";
/// Generic message shown when pagination interaction payload is invalid.
pub const PAGINATION_INVALID_MESSAGE: &str = "Invalid pagination interaction.";

/// Renders pagination sessions as Discord messages with buttons or reactions.
#[derive(Clone)]
pub struct TwilightRenderer {
    http: Arc<Client>,
}

impl TwilightRenderer {
    pub fn new(http: Arc<Client>) -> Self {
        Self { http }
    }

    async fn respond(
        &self,
        reply: &InteractionReply,
        response: &InteractionResponse,
    ) -> anyhow::Result<()> {
        self.http
            .interaction(reply.application_id)
            .create_response(reply.interaction_id, &reply.token, response)
            .await?;

        Ok(())
    }

    async fn clear_reactions(
        &self,
        message: MessageRef,
        view: &ControlsView<'_>,
    ) -> anyhow::Result<()> {
        if view.input_type.reactions && view.state != ControlState::Active {
            self.http
                .delete_all_reactions(message.channel_id, message.message_id)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Render for TwilightRenderer {
    async fn acknowledge(&self, event: &InteractionEvent) -> anyhow::Result<()> {
        let Some(reply) = event.reply.as_ref() else {
            return Ok(());
        };

        let response = InteractionResponse {
            kind: InteractionResponseType::DeferredUpdateMessage,
            data: None,
        };
        self.respond(reply, &response).await
    }

    async fn reject(&self, event: &InteractionEvent, rejection: Rejection) -> anyhow::Result<()> {
        let Some(reply) = event.reply.as_ref() else {
            return Ok(());
        };

        let content = match rejection {
            Rejection::NotAllowed => PAGINATION_WRONG_USER_MESSAGE.to_owned(),
            Rejection::Expired => PAGINATION_EXPIRED_MESSAGE.to_owned(),
            Rejection::OutOfRange { max_page_index } => {
                format!("Page does not exist. Available pages: 1-{}.", max_page_index + 1)
            }
        };
        respond_ephemeral(&self.http, reply, &content).await
    }

    async fn prompt_jump(
        &self,
        event: &InteractionEvent,
        max_page_index: Option<usize>,
    ) -> anyhow::Result<()> {
        let Some(reply) = event.reply.as_ref() else {
            return Ok(());
        };

        let modal_id = build_modal_custom_id(event.message.message_id.get());
        respond_jump_modal(&self.http, reply, &modal_id, "Jump to Page", max_page_index).await
    }

    async fn update(
        &self,
        message: MessageRef,
        page: &Page,
        controls: &ControlsView<'_>,
    ) -> anyhow::Result<()> {
        let components = build_nav_components(controls);

        self.http
            .update_message(message.channel_id, message.message_id)
            .content(page.content.as_deref())
            .embeds(Some(page.embeds.as_slice()))
            .attachments(&page.attachments)
            .components(Some(components.as_slice()))
            .await?;

        self.clear_reactions(message, controls).await
    }

    async fn set_controls(
        &self,
        message: MessageRef,
        controls: &ControlsView<'_>,
    ) -> anyhow::Result<()> {
        if controls.input_type.buttons {
            let components = build_nav_components(controls);
            self.http
                .update_message(message.channel_id, message.message_id)
                .components(Some(components.as_slice()))
                .await?;
        }

        self.clear_reactions(message, controls).await
    }

    async fn delete(&self, message: MessageRef) -> anyhow::Result<()> {
        self.http
            .delete_message(message.channel_id, message.message_id)
            .await?;

        Ok(())
    }

    async fn attach_reactions(
        &self,
        message: MessageRef,
        controls: &ControlMap,
    ) -> anyhow::Result<()> {
        for control in controls.iter() {
            let emoji = RequestReactionType::Unicode {
                name: &control.emoji,
            };
            self.http
                .create_reaction(message.channel_id, message.message_id, &emoji)
                .await?;
        }

        Ok(())
    }

    async fn remove_input(&self, event: &InteractionEvent) -> anyhow::Result<()> {
        let Input::Reaction(name) = &event.input else {
            return Ok(());
        };

        let emoji = RequestReactionType::Unicode { name };
        self.http
            .delete_reaction(
                event.message.channel_id,
                event.message.message_id,
                &emoji,
                event.actor,
            )
            .await?;

        Ok(())
    }
}

/// Respond to an interaction with an ephemeral message.
pub async fn respond_ephemeral(
    http: &Client,
    reply: &InteractionReply,
    content: &str,
) -> anyhow::Result<()> {
    let response = InteractionResponse {
        kind: InteractionResponseType::ChannelMessageWithSource,
        data: Some(
            InteractionResponseDataBuilder::new()
                .content(content)
                .flags(MessageFlags::EPHEMERAL)
                .build(),
        ),
    };

    http.interaction(reply.application_id)
        .create_response(reply.interaction_id, &reply.token, &response)
        .await?;

    Ok(())
}

/// Respond with the standard expired pagination message.
pub async fn respond_expired(http: &Client, reply: &InteractionReply) -> anyhow::Result<()> {
    respond_ephemeral(http, reply, PAGINATION_EXPIRED_MESSAGE).await
}

/// Respond with the standard invalid pagination message.
pub async fn respond_invalid(http: &Client, reply: &InteractionReply) -> anyhow::Result<()> {
    respond_ephemeral(http, reply, PAGINATION_INVALID_MESSAGE).await
}

/// Open a modal allowing the user to jump to a page number.
#[allow(deprecated)]
pub async fn respond_jump_modal(
    http: &Client,
    reply: &InteractionReply,
    modal_custom_id: &str,
    title: &str,
    max_page_index: Option<usize>,
) -> anyhow::Result<()> {
    let placeholder = match max_page_index {
        Some(max) => format!("Enter a page from 1 to {}", max + 1),
        None => "Enter a page number".to_owned(),
    };

    let page_input = Component::TextInput(TextInput {
        id: None,
        custom_id: JUMP_INPUT_ID.to_owned(),
        label: Some("Page Number".to_owned()),
        max_length: Some(6),
        min_length: Some(1),
        placeholder: Some(placeholder),
        required: Some(true),
        style: TextInputStyle::Short,
        value: None,
    });

    let modal_components = vec![Component::ActionRow(ActionRow {
        id: None,
        components: vec![page_input],
    })];

    let response = InteractionResponse {
        kind: InteractionResponseType::Modal,
        data: Some(InteractionResponseData {
            components: Some(modal_components),
            custom_id: Some(modal_custom_id.to_owned()),
            title: Some(title.to_owned()),
            ..InteractionResponseData::default()
        }),
    };

    http.interaction(reply.application_id)
        .create_response(reply.interaction_id, &reply.token, &response)
        .await?;

    Ok(())
}

/// Send the session's current page and start a dispatcher for it.
///
/// Single-page sessions are sent without controls and return `None`. The
/// session is live as soon as the message exists; reaction controls are
/// added by the dispatcher afterwards.
pub async fn send_paginated_message(
    http: Arc<Client>,
    registry: SessionRegistry,
    shutdown: CancellationToken,
    channel_id: Id<ChannelMarker>,
    session: Session,
) -> anyhow::Result<Option<DispatcherHandle>> {
    let page = session.current_page().await?;
    let view = ControlsView {
        controls: session.controls(),
        input_type: session.input_type(),
        current_index: session.current_index(),
        max_page_index: session.max_page_index(),
        state: ControlState::Active,
    };
    let components = build_nav_components(&view);

    let mut request = http
        .create_message(channel_id)
        .embeds(&page.embeds)
        .attachments(&page.attachments)
        .components(&components);
    if let Some(content) = page.content.as_deref() {
        request = request.content(content);
    }
    let created = request.await?.model().await?;

    if session.max_page_index() == Some(0) {
        return Ok(None);
    }

    let message = MessageRef::new(created.channel_id, created.id);
    let renderer = TwilightRenderer::new(Arc::clone(&http));

    let handle = Dispatcher::new(session, message, Arc::new(renderer), registry)
        .shutdown(shutdown)
        .start_or_disable()
        .await?;

    Ok(Some(handle))
}
