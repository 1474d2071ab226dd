//! Conversion of gateway payloads into pagination interaction events.
//!
//! Malformed input (missing author or message, unparsable page numbers) is
//! reported as invalid and never reaches a session.

use twilight_model::{
    application::interaction::{
        InteractionData,
        modal::{ModalInteractionComponent, ModalInteractionData},
    },
    channel::message::EmojiReactionType,
    gateway::payload::incoming::{InteractionCreate, ReactionAdd},
    id::Id,
};

use super::{
    event::{Input, InteractionEvent, InteractionReply, MessageRef},
    token::{JUMP_INPUT_ID, parse_custom_id, parse_modal_custom_id},
};

/// Outcome of reading an interaction as pagination input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationInteraction {
    /// The interaction is not a pagination component or modal.
    NotPagination,
    /// It targets pagination but cannot be used; answer it as invalid.
    Invalid(InteractionReply),
    /// A well-formed event ready for the registry.
    Event(InteractionEvent),
}

/// Read a button press or jump-modal submit as a pagination event.
pub fn interaction_event(interaction: &InteractionCreate) -> PaginationInteraction {
    let (input, message) = match interaction.data.as_ref() {
        Some(InteractionData::MessageComponent(component)) => {
            let Some(control_id) = parse_custom_id(&component.custom_id) else {
                return PaginationInteraction::NotPagination;
            };
            (
                Some(Input::Button(control_id.to_owned())),
                interaction
                    .message
                    .as_ref()
                    .map(|message| MessageRef::new(message.channel_id, message.id)),
            )
        }
        Some(InteractionData::ModalSubmit(modal)) => {
            let Some(message_id) = parse_modal_custom_id(&modal.custom_id) else {
                return PaginationInteraction::NotPagination;
            };
            (
                parse_jump_modal_page(modal).map(Input::JumpTo),
                interaction
                    .channel
                    .as_ref()
                    .map(|channel| MessageRef::new(channel.id, Id::new(message_id))),
            )
        }
        _ => return PaginationInteraction::NotPagination,
    };

    let reply = InteractionReply {
        application_id: interaction.application_id,
        interaction_id: interaction.id,
        token: interaction.token.clone(),
    };

    let (Some(input), Some(message), Some(actor)) = (input, message, interaction.author_id())
    else {
        return PaginationInteraction::Invalid(reply);
    };

    PaginationInteraction::Event(InteractionEvent {
        actor,
        message,
        input,
        reply: Some(reply),
    })
}

/// Read a reaction add as a pagination event. Custom emoji are ignored.
pub fn reaction_event(reaction: &ReactionAdd) -> Option<InteractionEvent> {
    let EmojiReactionType::Unicode { name } = &reaction.emoji else {
        return None;
    };

    Some(InteractionEvent {
        actor: reaction.user_id,
        message: MessageRef::new(reaction.channel_id, reaction.message_id),
        input: Input::Reaction(name.clone()),
        reply: None,
    })
}

/// Extract the one-based `page` text input from a jump modal as a zero-based index.
pub fn parse_jump_modal_page(modal: &ModalInteractionData) -> Option<usize> {
    for component in &modal.components {
        if let ModalInteractionComponent::ActionRow(row) = component {
            for nested in &row.components {
                if let ModalInteractionComponent::TextInput(text_input) = nested
                    && text_input.custom_id == JUMP_INPUT_ID
                {
                    return text_input
                        .value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|page| *page >= 1)
                        .map(|page| page - 1);
                }
            }
        }
    }

    None
}
