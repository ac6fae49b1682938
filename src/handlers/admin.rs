use actix_web::{http::header, web, HttpRequest, HttpResponse};
use maud::Render;
use serde::Deserialize;
use tracing::error;

use crate::i18n::{self, detect_locale, Text};
use crate::services::{AdminError, BlockOutcome, UpdateAccountForm};
use crate::state::AppState;
use crate::views::AdminAccountEditView;

#[derive(Debug, Deserialize)]
pub struct EditQuery {
    pub flash: Option<String>,
}

fn flash_text(key: &str) -> Option<Text> {
    match key {
        "confirmed" => Some(Text::Confirmed),
        "blocked" => Some(Text::Blocked),
        "unblocked" => Some(Text::Unblocked),
        "updated" => Some(Text::Updated),
        _ => None,
    }
}

fn html(markup: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markup)
}

fn redirect_to_edit(id: &str, flash: Option<&str>) -> HttpResponse {
    let location = match flash {
        Some(flash) => format!("/admin/users/{}/update?flash={}", id, flash),
        None => format!("/admin/users/{}/update", id),
    };
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn failure(e: AdminError) -> HttpResponse {
    match e {
        AdminError::NotFound => HttpResponse::NotFound().body("The requested page does not exist."),
        e => {
            error!(error = %e, "Account administration failed");
            HttpResponse::InternalServerError().body("Internal server error")
        }
    }
}

pub async fn edit(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<EditQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let id = path.into_inner();
    let locale = detect_locale(&req);

    let ctx = match state.accounts.edit_context(&id).await {
        Ok(ctx) => ctx,
        Err(e) => return failure(e),
    };

    let mut view = AdminAccountEditView::new(locale, &ctx.account, &ctx.roles, &ctx.active_roles);
    if let Some(text) = query.flash.as_deref().and_then(flash_text) {
        view = view.flash(i18n::text(locale, text));
    }
    html(view.render().into_string())
}

pub async fn update(
    req: HttpRequest,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let id = path.into_inner();
    let locale = detect_locale(&req);
    let form = UpdateAccountForm::from_pairs(form.into_inner());

    match state.accounts.update(&id, &form).await {
        Ok(_) => {
            let ctx = match state.accounts.edit_context(&id).await {
                Ok(ctx) => ctx,
                Err(e) => return failure(e),
            };
            let view = AdminAccountEditView::new(locale, &ctx.account, &ctx.roles, &ctx.active_roles)
                .flash(i18n::text(locale, Text::Updated));
            html(view.render().into_string())
        }
        Err(AdminError::Invalid(errors)) => {
            let ctx = match state.accounts.edit_context(&id).await {
                Ok(ctx) => ctx,
                Err(e) => return failure(e),
            };
            let view = AdminAccountEditView::new(locale, &ctx.account, &ctx.roles, &form.roles)
                .submitted(&form.username, &form.email, &errors);
            HttpResponse::UnprocessableEntity()
                .content_type("text/html; charset=utf-8")
                .body(view.render().into_string())
        }
        Err(e) => failure(e),
    }
}

pub async fn confirm(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let id = path.into_inner();

    match state.accounts.confirm(&id).await {
        Ok(true) => redirect_to_edit(&id, Some("confirmed")),
        Ok(false) => redirect_to_edit(&id, None),
        Err(e) => failure(e),
    }
}

pub async fn block(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let id = path.into_inner();

    match state.accounts.toggle_block(&id).await {
        Ok(BlockOutcome::Blocked) => redirect_to_edit(&id, Some("blocked")),
        Ok(BlockOutcome::Unblocked) => redirect_to_edit(&id, Some("unblocked")),
        Err(e) => failure(e),
    }
}
