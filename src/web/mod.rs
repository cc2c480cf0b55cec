//! Server-rendered pages. They talk to the JSON API over HTTP like any other
//! client, forwarding the `auth_token` cookie as a bearer token. `/login`
//! and `/logout` are the only pages that set or clear that cookie.

pub mod client;
pub mod views;

use axum::{
    extract::State,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument, warn};

use crate::{extract::ApiPath, state::AppState};

pub const TOKEN_COOKIE: &str = "auth_token";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/my-recipes", get(my_recipes))
        .route("/recipe/new", get(new_recipe))
        .route("/recipe/:id", get(recipe_detail))
        .route("/recipe/edit/:id", get(edit_recipe))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub pseudo: String,
    pub password: String,
}

/// `Set-Cookie` value for the session token. The recipe form script reads it,
/// so it is not `HttpOnly`.
fn session_cookie(token: &str, max_age: i64) -> String {
    format!(
        "{}={}; Path=/; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE, token, max_age
    )
}

/// Value of the `auth_token` cookie, if any.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let (categories, recipes) = tokio::join!(state.api.categories(), state.api.recipes(None));
    match (categories, recipes) {
        (Ok(categories), Ok(recipes)) => Html(views::home(&categories, &recipes, None)),
        (categories, recipes) => {
            if let Err(e) = categories.as_ref().and(recipes.as_ref()) {
                error!(error = %e, "home page could not load API data");
            }
            Html(views::home(
                &categories.unwrap_or_default(),
                &recipes.unwrap_or_default(),
                Some("Unable to load recipes right now."),
            ))
        }
    }
}

#[instrument(skip(state))]
pub async fn recipe_detail(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Response {
    match state.api.recipe(id).await {
        Ok(Some(recipe)) => Html(views::recipe_detail(&recipe)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Html(views::not_found())).into_response(),
        Err(e) => {
            error!(error = %e, recipe_id = id, "recipe page failed");
            Redirect::to("/").into_response()
        }
    }
}

#[instrument(skip(state, headers))]
pub async fn my_recipes(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = session_token(&headers) else {
        return Redirect::to("/").into_response();
    };
    let user = match state.api.verify(&token).await {
        Ok(Some(user)) => user,
        Ok(None) => return Redirect::to("/").into_response(),
        Err(e) => {
            warn!(error = %e, "session check failed");
            return Redirect::to("/").into_response();
        }
    };
    match state.api.recipes(Some(user.id)).await {
        Ok(recipes) => Html(views::my_recipes(&user, &recipes)).into_response(),
        Err(e) => {
            error!(error = %e, user_id = user.id, "my recipes page failed");
            Redirect::to("/").into_response()
        }
    }
}

pub async fn new_recipe() -> Html<String> {
    Html(views::recipe_form(None))
}

#[instrument(skip(state))]
pub async fn edit_recipe(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Response {
    match state.api.recipe(id).await {
        Ok(Some(recipe)) => Html(views::recipe_form(Some(&recipe))).into_response(),
        Ok(None) => Redirect::to("/my-recipes").into_response(),
        Err(e) => {
            error!(error = %e, recipe_id = id, "edit page failed");
            Redirect::to("/my-recipes").into_response()
        }
    }
}

pub async fn login_page() -> Html<String> {
    Html(views::login_form("", None))
}

#[instrument(skip(state, form))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.api.login(&form.pseudo, &form.password).await {
        Ok(Some(grant)) => {
            let max_age = (grant.expires_at - OffsetDateTime::now_utc())
                .whole_seconds()
                .max(0);
            info!(pseudo = %form.pseudo, "web session opened");
            (
                [(SET_COOKIE, session_cookie(&grant.token, max_age))],
                Redirect::to("/my-recipes"),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Html(views::login_form(&form.pseudo, Some("Invalid pseudo or password."))),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "login call failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(views::login_form(&form.pseudo, Some("Unable to log in right now."))),
            )
                .into_response()
        }
    }
}

/// Revokes the token on the API side, then always clears the cookie.
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        match state.api.logout(&token).await {
            Ok(true) => info!("web session closed"),
            Ok(false) => debug!("token was already revoked"),
            Err(e) => warn!(error = %e, "logout call failed"),
        }
    }
    ([(SET_COOKIE, session_cookie("", 0))], Redirect::to("/")).into_response()
}
