//! Navigation button builders for paginated messages.

use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};

use super::{
    action::PaginatorAction,
    render::{ControlState, ControlsView},
    token::build_custom_id,
};

/// Discord allows at most five buttons per action row.
const BUTTONS_PER_ROW: usize = 5;

/// Build the button rows for a controls view.
///
/// Returns no rows when buttons are disabled for the session, the view is
/// hidden, or there is only one page to show.
pub fn build_nav_components(view: &ControlsView<'_>) -> Vec<Component> {
    if !view.input_type.buttons
        || view.state == ControlState::Hidden
        || view.max_page_index == Some(0)
    {
        return vec![];
    }

    let buttons: Vec<Component> = view
        .controls
        .iter()
        .map(|control| {
            Component::Button(Button {
                id: None,
                custom_id: Some(build_custom_id(&control.id)),
                disabled: !view.is_enabled(control.action),
                emoji: None,
                label: Some(control.action.label().to_owned()),
                style: button_style(control.action),
                url: None,
                sku_id: None,
            })
        })
        .collect();

    buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            Component::ActionRow(ActionRow {
                id: None,
                components: row.to_vec(),
            })
        })
        .collect()
}

fn button_style(action: PaginatorAction) -> ButtonStyle {
    match action {
        PaginatorAction::Stop => ButtonStyle::Danger,
        _ => ButtonStyle::Secondary,
    }
}
