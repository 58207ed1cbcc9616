//! Summary and post rendering.
//!
//! Both renderings pass every collected value to a Fluent template as an
//! argument named after its field. Nothing is validated here.

use std::collections::HashMap;

use crate::flow::FlowDefinition;
use crate::localization::t_args_lang;

/// Rendered message, optionally attached to a photo
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composed {
    pub text: String,
    /// Telegram file id of the flow's image answer
    pub photo: Option<String>,
}

/// Confirmation summary shown to the user
pub fn compose_summary(
    flow: &FlowDefinition,
    values: &HashMap<String, String>,
    language_code: Option<&str>,
) -> Composed {
    render(flow, &flow.summary, values, language_code)
}

/// Final message posted to the channel
pub fn compose_post(
    flow: &FlowDefinition,
    values: &HashMap<String, String>,
    language_code: Option<&str>,
) -> Composed {
    render(flow, &flow.post, values, language_code)
}

fn render(
    flow: &FlowDefinition,
    template: &str,
    values: &HashMap<String, String>,
    language_code: Option<&str>,
) -> Composed {
    let args: Vec<(&str, &str)> = flow
        .fields
        .iter()
        .filter_map(|field| {
            values
                .get(&field.name)
                .map(|value| (field.name.as_str(), value.as_str()))
        })
        .collect();

    let photo = flow
        .image_field()
        .and_then(|field| values.get(&field.name))
        .cloned();

    Composed {
        text: t_args_lang(template, &args, language_code),
        photo,
    }
}
