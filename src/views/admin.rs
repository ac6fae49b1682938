use maud::{html, Markup, Render, DOCTYPE};
use std::collections::BTreeMap;

use crate::i18n::{self, Locale, Text};
use crate::models::{Account, Role};
use crate::signup::{Field, ValidationErrors};

/// Edit screen for one account: identity fields, roles and the
/// confirm / block / unblock actions.
pub struct AdminAccountEditView<'a> {
    pub locale: Locale,
    pub account: &'a Account,
    pub roles: &'a [Role],
    pub active_roles: &'a [String],
    /// Values shown in the inputs; differ from the account after a
    /// rejected submit.
    pub username: &'a str,
    pub email: &'a str,
    pub flash: Option<&'a str>,
    pub errors: Option<&'a ValidationErrors>,
}

impl<'a> AdminAccountEditView<'a> {
    pub fn new(
        locale: Locale,
        account: &'a Account,
        roles: &'a [Role],
        active_roles: &'a [String],
    ) -> Self {
        Self {
            locale,
            account,
            roles,
            active_roles,
            username: &account.username,
            email: &account.email,
            flash: None,
            errors: None,
        }
    }

    pub fn flash(mut self, message: &'a str) -> Self {
        self.flash = Some(message);
        self
    }

    pub fn submitted(mut self, username: &'a str, email: &'a str, errors: &'a ValidationErrors) -> Self {
        self.username = username;
        self.email = email;
        self.errors = Some(errors);
        self
    }

    fn action(&self, name: &str) -> String {
        format!("/admin/users/{}/{}", self.account.id, name)
    }

    fn action_button(&self, name: &str, label: Text, class: &str, prompt: Option<Text>) -> Markup {
        let onsubmit = prompt.map(|p| format!("return confirm('{}');", i18n::text(self.locale, p)));
        html! {
            form method="post" action=(self.action(name)) class="inline-action" onsubmit=[onsubmit] {
                button type="submit" class={"btn btn-xs " (class)} { (i18n::text(self.locale, label)) }
            }
        }
    }
}

fn field_errors(messages: &BTreeMap<&'static str, Vec<String>>, field: Field) -> Markup {
    html! {
        @if let Some(list) = messages.get(field.as_str()) {
            @for message in list {
                p class="help-block help-block-error" { (message) }
            }
        }
    }
}

fn group_class(messages: &BTreeMap<&'static str, Vec<String>>, field: Field) -> String {
    if messages.contains_key(field.as_str()) {
        format!("form-group field-user-{} has-error", field.as_str())
    } else {
        format!("form-group field-user-{}", field.as_str())
    }
}

impl Render for AdminAccountEditView<'_> {
    fn render(&self) -> Markup {
        let title = i18n::text(self.locale, Text::UpdateTitle);
        let label = |field: Field| i18n::label(self.locale, field);
        let messages = self
            .errors
            .map(|e| e.messages(self.locale))
            .unwrap_or_default();

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (title) }
                }
                body {
                    h1 {
                        i class="glyphicon glyphicon-user" {}
                        " "
                        (self.account.username)
                        @if !self.account.is_confirmed() {
                            (self.action_button("confirm", Text::Confirm, "btn-success", None))
                        }
                        @if self.account.is_blocked() {
                            (self.action_button("block", Text::Unblock, "btn-success", Some(Text::UnblockPrompt)))
                        } @else {
                            (self.action_button("block", Text::Block, "btn-danger", Some(Text::BlockPrompt)))
                        }
                    }

                    @if let Some(flash) = self.flash {
                        div class="alert alert-success" { (flash) }
                    }

                    div class="panel panel-default" {
                        div class="panel-heading" { (title) }
                        div class="panel-body" {
                            form method="post" action=(self.action("update")) {
                                div class=(group_class(&messages, Field::Username)) {
                                    label class="control-label" for="user-username" { (label(Field::Username)) }
                                    input type="text" id="user-username" class="form-control" name="username" maxlength="25" value=(self.username);
                                    (field_errors(&messages, Field::Username))
                                }

                                div class=(group_class(&messages, Field::Email)) {
                                    label class="control-label" for="user-email" { (label(Field::Email)) }
                                    input type="text" id="user-email" class="form-control" name="email" maxlength="255" value=(self.email);
                                    (field_errors(&messages, Field::Email))
                                }

                                div class=(group_class(&messages, Field::Password)) {
                                    label class="control-label" for="user-password" { (label(Field::Password)) }
                                    input type="password" id="user-password" class="form-control" name="password" value="";
                                    (field_errors(&messages, Field::Password))
                                }

                                div class=(group_class(&messages, Field::Roles)) {
                                    label class="control-label" for="user-role" { (label(Field::Roles)) }
                                    select id="user-role" name="roles" class="form-control" multiple style="height: 150px;" {
                                        @for role in self.roles {
                                            option value=(role.name) selected[self.active_roles.contains(&role.name)] { (role.name) }
                                        }
                                    }
                                    (field_errors(&messages, Field::Roles))
                                }

                                div class="form-group" {
                                    button type="submit" class="btn btn-primary" { (i18n::text(self.locale, Text::Save)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
