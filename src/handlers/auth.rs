use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::error;

use crate::i18n::{self, detect_locale, Text};
use crate::models::RegistrationInput;
use crate::signup::SignupError;
use crate::state::AppState;

pub async fn signup(
    req: HttpRequest,
    data: web::Json<RegistrationInput>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let locale = detect_locale(&req);

    match state.signup.signup(data.into_inner()).await {
        Ok(account) => HttpResponse::Created().json(json!({
            "message": "User registered successfully",
            "user": account
        })),
        Err(SignupError::Invalid(errors)) => HttpResponse::UnprocessableEntity().json(json!({
            "errors": errors.messages(locale)
        })),
        Err(e) => {
            error!(error = %e, "Signup failed");
            HttpResponse::InternalServerError().json(json!({
                "error": i18n::text(locale, Text::SignupFailed)
            }))
        }
    }
}
