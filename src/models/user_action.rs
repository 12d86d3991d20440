use serde::{Deserialize, Serialize};

/// User the actions are offered for, as shown in a log or trackable detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionContext {
    pub user_name: String,
    /// Geocode of the cache or trackable the user was shown for, if any.
    pub geocode: Option<String>,
}

impl UserActionContext {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            geocode: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserActionKind {
    ViewHiddenCaches,
    ViewFoundCaches,
    CopyUserName,
}

/// An entry of the user context menu. The frontend performs the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub kind: UserActionKind,
    pub label: String,
    pub user_name: String,
}

impl UserAction {
    pub fn new(kind: UserActionKind, label: impl Into<String>, ctx: &UserActionContext) -> Self {
        Self {
            kind,
            label: label.into(),
            user_name: ctx.user_name.clone(),
        }
    }
}

/// Actions every connector offers on a user name.
pub fn default_user_actions(ctx: &UserActionContext) -> Vec<UserAction> {
    vec![
        UserAction::new(UserActionKind::ViewHiddenCaches, "Hidden caches", ctx),
        UserAction::new(UserActionKind::ViewFoundCaches, "Found caches", ctx),
        UserAction::new(UserActionKind::CopyUserName, "Copy user name", ctx),
    ]
}
