use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

use crate::core::error::Result;
use crate::features::auth::dtos::{AuthFormView, LoginForm, RegisterForm};
use crate::features::auth::guards::{MaybeUser, LOGIN_PATH};
use crate::features::auth::services::AuthService;
use crate::shared::constants::FLASH_COOKIE;
use crate::shared::validation::validation_messages;
use crate::shared::views::render_view;

pub const DASHBOARD_PATH: &str = "/Home/Dashboard";

const REGISTERED_MESSAGE: &str = "Registration successful! Please login.";

/// Show the registration form
pub async fn register_page(MaybeUser(user): MaybeUser) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    Ok(render_view("register.html", AuthFormView::default())?.into_response())
}

/// Create an account, then send the user to the login page
pub async fn register(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Form(mut form): Form<RegisterForm>,
) -> Result<Response> {
    form.email = form.email.trim().to_string();

    let mut view = AuthFormView {
        email: form.email.clone(),
        full_name: form.full_name.clone(),
        ..Default::default()
    };

    if let Err(errors) = form.validate() {
        view.errors = validation_messages(&errors);
        return form_error("register.html", StatusCode::BAD_REQUEST, view);
    }

    match service.register(form).await {
        Ok(_) => {
            let jar = jar.add(flash_cookie(REGISTERED_MESSAGE));
            Ok((jar, Redirect::to(LOGIN_PATH)).into_response())
        }
        Err(e) => {
            e.log();
            view.error = Some(e.client_message());
            form_error("register.html", e.status_code(), view)
        }
    }
}

/// Show the login form, consuming any pending flash message
pub async fn login_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let flash = jar
        .get(FLASH_COOKIE)
        .map(|c| urlencoding::decode(c.value()).map(|v| v.into_owned()))
        .and_then(|decoded| decoded.ok());

    let view = AuthFormView {
        flash,
        ..Default::default()
    };
    let html = render_view("login.html", view)?;

    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    Ok((jar, html).into_response())
}

/// Verify credentials and set the session cookie
pub async fn login(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> Result<Response> {
    form.email = form.email.trim().to_string();

    let mut view = AuthFormView {
        email: form.email.clone(),
        ..Default::default()
    };

    if let Err(errors) = form.validate() {
        view.errors = validation_messages(&errors);
        return form_error("login.html", StatusCode::BAD_REQUEST, view);
    }

    match service.login(&form).await {
        Ok(token) => {
            let remember_me = form.remember_me();
            debug!("Setting session cookie (persistent: {})", remember_me);
            let jar = jar.add(service.sessions().build_cookie(token, remember_me));
            Ok((jar, Redirect::to(DASHBOARD_PATH)).into_response())
        }
        Err(e) => {
            e.log();
            view.error = Some(e.client_message());
            form_error("login.html", e.status_code(), view)
        }
    }
}

/// Drop the session cookie and go back to the landing page
pub async fn logout(State(service): State<Arc<AuthService>>, jar: CookieJar) -> Response {
    let jar = jar.remove(service.sessions().removal_cookie());
    (jar, Redirect::to("/")).into_response()
}

fn form_error(view_name: &str, status: StatusCode, view: AuthFormView) -> Result<Response> {
    let html = render_view(view_name, view)?;
    Ok((status, html).into_response())
}

fn flash_cookie(message: &str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
        .path("/")
        .http_only(true)
        .max_age(cookie::time::Duration::minutes(5))
        .build()
}
