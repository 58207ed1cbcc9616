//! UI Builder module for creating keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::localization::t_lang;
use crate::wizard::{FieldChoice, Selection};

const MAX_BUTTON_LABEL: usize = 24;

fn button(label: String, selection: Selection) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, selection.callback_data())
}

/// Confirm / Edit / Cancel buttons under the summary
pub fn create_confirmation_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button(t_lang("button-confirm", language_code), Selection::Confirm)],
        vec![
            button(t_lang("button-edit", language_code), Selection::Edit),
            button(t_lang("button-cancel", language_code), Selection::Cancel),
        ],
    ])
}

/// One button per field, two per row, then Back
pub fn create_field_chooser_keyboard(
    choices: &[FieldChoice],
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = choices
        .chunks(2)
        .map(|row| {
            row.iter()
                .map(|choice| {
                    button(
                        truncate_label(&choice.label),
                        Selection::SelectField(choice.index),
                    )
                })
                .collect()
        })
        .collect();

    rows.push(vec![button(
        t_lang("button-back", language_code),
        Selection::Back,
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// Shorten a label so it fits on a button
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_BUTTON_LABEL {
        let head: String = label.chars().take(MAX_BUTTON_LABEL - 3).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(keyboard: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        keyboard
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                        other => panic!("unexpected button kind {other:?}"),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_confirmation_keyboard_layout() {
        let keyboard = create_confirmation_keyboard(None);
        assert_eq!(
            callback_data(&keyboard),
            vec![vec!["confirm"], vec!["edit", "cancel"]]
        );
    }

    #[test]
    fn test_field_chooser_keyboard_layout() {
        let choices: Vec<FieldChoice> = (0..3)
            .map(|index| FieldChoice {
                index,
                label: format!("Field {index}"),
            })
            .collect();
        let keyboard = create_field_chooser_keyboard(&choices, None);
        assert_eq!(
            callback_data(&keyboard),
            vec![
                vec!["field_0", "field_1"],
                vec!["field_2"],
                vec!["back"],
            ]
        );
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Odds"), "Odds");
        let long = "ক".repeat(30);
        let truncated = truncate_label(&long);
        assert_eq!(truncated.chars().count(), MAX_BUTTON_LABEL);
        assert!(truncated.ends_with("..."));
    }
}
