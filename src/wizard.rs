//! # Wizard Engine
//!
//! Transport-independent state machine driving a [`FlowDefinition`].
//!
//! ```text
//! Idle --start--> CollectingField(0) --valid--> ... --valid--> AwaitingConfirmation
//!                                                               |  confirm -> Posted
//!                                                               |  edit    -> chooser
//!                                                               |  field i -> CollectingField(i), editing
//!                                                               |  cancel  -> Cancelled
//! ```
//!
//! Every operation checks the access list first and returns a [`Reply`]
//! describing what the transport layer should show. Each transition runs
//! under the session store lock, so a single event is applied atomically.
//! A confirmation removes the session before the post is handed back, which
//! makes a second confirm for the same session see [`Reply::Expired`].

use std::str::FromStr;
use std::sync::Arc;
use teloxide::types::UserId;
use tracing::{debug, info, warn};

use crate::composer::{compose_post, compose_summary, Composed};
use crate::config::AccessList;
use crate::flow::{FieldKind, FlowDefinition};
use crate::localization::t_lang;
use crate::session::{Session, SessionStore, WizardState};

/// An answer sent by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    /// Telegram file id of a photo
    Photo(String),
}

impl Input {
    pub fn kind(&self) -> FieldKind {
        match self {
            Input::Text(_) => FieldKind::Text,
            Input::Photo(_) => FieldKind::Image,
        }
    }
}

/// A button press on the summary or the field chooser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Confirm,
    Edit,
    Back,
    Cancel,
    SelectField(usize),
}

const FIELD_PREFIX: &str = "field_";

impl Selection {
    /// Callback data carried by the inline button
    pub fn callback_data(&self) -> String {
        match self {
            Selection::Confirm => "confirm".to_string(),
            Selection::Edit => "edit".to_string(),
            Selection::Back => "back".to_string(),
            Selection::Cancel => "cancel".to_string(),
            Selection::SelectField(index) => format!("{FIELD_PREFIX}{index}"),
        }
    }
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "confirm" => Ok(Selection::Confirm),
            "edit" => Ok(Selection::Edit),
            "back" => Ok(Selection::Back),
            "cancel" => Ok(Selection::Cancel),
            other => other
                .strip_prefix(FIELD_PREFIX)
                .and_then(|index| index.parse().ok())
                .map(Selection::SelectField)
                .ok_or_else(|| format!("unknown selection: {other}")),
        }
    }
}

/// Entry of the field chooser
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldChoice {
    pub index: usize,
    pub label: String,
}

/// What the transport layer should show after an operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Ask for the field at `index`
    Prompt { index: usize, text: String },
    /// Answer refused (validation failure or wrong kind), same field again
    Rejected { text: String },
    /// Every field is set, ask for confirmation
    Summary(Composed),
    /// List of fields that can be edited
    FieldChooser(Vec<FieldChoice>),
    /// Post this to the channel; the session is already gone
    Publish(Composed),
    Cancelled,
    NothingToCancel,
    /// Selection without a matching session
    Expired,
    /// Input outside any session
    NoSession,
    /// Selection that does not apply, nothing changed
    Ignored,
    Unauthorized,
}

/// Wizard engine shared by all handlers
#[derive(Clone, Debug)]
pub struct Wizard {
    flow: Arc<FlowDefinition>,
    access: AccessList,
    sessions: SessionStore,
}

impl Wizard {
    pub fn new(flow: FlowDefinition, access: AccessList) -> Self {
        Self::with_store(flow, access, SessionStore::new())
    }

    pub fn with_store(flow: FlowDefinition, access: AccessList, sessions: SessionStore) -> Self {
        Self {
            flow: Arc::new(flow),
            access,
            sessions,
        }
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn is_authorized(&self, user: UserId) -> bool {
        self.access.is_allowed(user)
    }

    /// Begin a fresh session, replacing any previous one
    pub async fn start(&self, user: UserId, language_code: Option<&str>) -> Reply {
        if !self.is_authorized(user) {
            warn!(user_id = %user, "Unauthorized user tried to start the wizard");
            return Reply::Unauthorized;
        }

        let replaced = self
            .sessions
            .with(|sessions| sessions.insert(user, Session::new()))
            .await;
        info!(user_id = %user, flow = %self.flow.name, restarted = replaced.is_some(), "Wizard started");

        self.prompt(0, language_code)
    }

    /// Drop the user's session
    pub async fn cancel(&self, user: UserId) -> Reply {
        if !self.is_authorized(user) {
            warn!(user_id = %user, "Unauthorized user tried to cancel");
            return Reply::Unauthorized;
        }

        match self.sessions.remove(user).await {
            Some(_) => {
                info!(user_id = %user, "Wizard cancelled");
                Reply::Cancelled
            }
            None => Reply::NothingToCancel,
        }
    }

    /// Kind of the field the user is currently asked for
    pub async fn expected_kind(&self, user: UserId) -> Option<FieldKind> {
        let session = self.sessions.get(user).await?;
        match session.state(self.flow.field_count()) {
            WizardState::CollectingField(index) => self.flow.field(index).map(|f| f.kind),
            WizardState::AwaitingConfirmation => None,
        }
    }

    /// Handle an answer for the current field
    pub async fn submit(&self, user: UserId, input: Input, language_code: Option<&str>) -> Reply {
        if !self.is_authorized(user) {
            return Reply::Unauthorized;
        }

        let flow = Arc::clone(&self.flow);
        let field_count = flow.field_count();

        self.sessions
            .with(|sessions| {
                let Some(session) = sessions.get_mut(&user) else {
                    return Reply::NoSession;
                };

                let index = match session.state(field_count) {
                    WizardState::CollectingField(index) => index,
                    WizardState::AwaitingConfirmation => {
                        return Reply::Rejected {
                            text: t_lang("awaiting-confirmation", language_code),
                        };
                    }
                };
                let Some(field) = flow.field(index) else {
                    return Reply::NoSession;
                };

                if input.kind() != field.kind {
                    debug!(user_id = %user, field = %field.name, "Input kind mismatch");
                    let key = match field.kind {
                        FieldKind::Text => "expected-text",
                        FieldKind::Image => "expected-photo",
                    };
                    return Reply::Rejected {
                        text: t_lang(key, language_code),
                    };
                }

                let value = match input {
                    Input::Text(text) => {
                        if !field.validator.validate(&text) {
                            debug!(user_id = %user, field = %field.name, "Validation failed");
                            return Reply::Rejected {
                                text: t_lang(field.validator.error_key(), language_code),
                            };
                        }
                        text
                    }
                    Input::Photo(file_id) => file_id,
                };

                match session.record(&field.name, value, field_count) {
                    WizardState::CollectingField(next) => {
                        debug!(user_id = %user, field = %field.name, next, "Field recorded");
                        self.prompt(next, language_code)
                    }
                    WizardState::AwaitingConfirmation => {
                        debug!(user_id = %user, field = %field.name, "All fields collected");
                        Reply::Summary(compose_summary(&flow, session.values(), language_code))
                    }
                }
            })
            .await
    }

    /// Handle a button press on the summary or the field chooser
    pub async fn select(
        &self,
        user: UserId,
        selection: Selection,
        language_code: Option<&str>,
    ) -> Reply {
        if !self.is_authorized(user) {
            return Reply::Unauthorized;
        }

        let flow = Arc::clone(&self.flow);
        let field_count = flow.field_count();

        self.sessions
            .with(|sessions| {
                let complete = match sessions.get(&user) {
                    Some(session) => {
                        session.is_complete(flow.fields.iter().map(|f| f.name.as_str()))
                    }
                    None => {
                        debug!(user_id = %user, ?selection, "Selection without session");
                        return Reply::Expired;
                    }
                };
                // A button from an earlier summary must not touch a session
                // that is still being filled in
                if !complete {
                    warn!(user_id = %user, ?selection, "Stale selection on an unfinished session");
                    return Reply::Expired;
                }

                match selection {
                    Selection::Confirm => match sessions.remove(&user) {
                        Some(session) => {
                            info!(user_id = %user, flow = %flow.name, "Wizard confirmed");
                            Reply::Publish(compose_post(&flow, session.values(), language_code))
                        }
                        None => Reply::Expired,
                    },
                    Selection::Cancel => {
                        sessions.remove(&user);
                        info!(user_id = %user, "Post cancelled");
                        Reply::Cancelled
                    }
                    Selection::Edit => Reply::FieldChooser(
                        flow.fields
                            .iter()
                            .enumerate()
                            .map(|(index, field)| FieldChoice {
                                index,
                                label: t_lang(&field.label, language_code),
                            })
                            .collect(),
                    ),
                    Selection::Back => match sessions.get_mut(&user) {
                        Some(session) => {
                            session.back_to_summary(field_count);
                            Reply::Summary(compose_summary(&flow, session.values(), language_code))
                        }
                        None => Reply::Expired,
                    },
                    Selection::SelectField(index) if index < field_count => {
                        match sessions.get_mut(&user) {
                            Some(session) => {
                                session.begin_edit(index);
                                debug!(user_id = %user, index, "Editing field");
                                self.prompt(index, language_code)
                            }
                            None => Reply::Expired,
                        }
                    }
                    Selection::SelectField(index) => {
                        debug!(user_id = %user, index, "Field index out of range");
                        Reply::Ignored
                    }
                }
            })
            .await
    }

    fn prompt(&self, index: usize, language_code: Option<&str>) -> Reply {
        let text = self
            .flow
            .field(index)
            .map(|field| t_lang(&field.prompt, language_code))
            .unwrap_or_default();
        Reply::Prompt { index, text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_parsing() {
        assert_eq!("confirm".parse::<Selection>(), Ok(Selection::Confirm));
        assert_eq!("edit".parse::<Selection>(), Ok(Selection::Edit));
        assert_eq!("back".parse::<Selection>(), Ok(Selection::Back));
        assert_eq!("cancel".parse::<Selection>(), Ok(Selection::Cancel));
        assert_eq!("field_3".parse::<Selection>(), Ok(Selection::SelectField(3)));

        assert!("field_".parse::<Selection>().is_err());
        assert!("field_x".parse::<Selection>().is_err());
        assert!("3".parse::<Selection>().is_err());
        assert!("".parse::<Selection>().is_err());
    }

    #[test]
    fn test_selection_callback_data_parses_back() {
        for selection in [
            Selection::Confirm,
            Selection::Edit,
            Selection::Back,
            Selection::Cancel,
            Selection::SelectField(6),
        ] {
            assert_eq!(selection.callback_data().parse::<Selection>(), Ok(selection));
        }
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(Input::Text("x".into()).kind(), FieldKind::Text);
        assert_eq!(Input::Photo("id".into()).kind(), FieldKind::Image);
    }
}
