// File: src/app.rs
// Purpose: Router and handlers for mounting, field changes and submission

use axum::{
    extract::{Form, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use registration::{
    view, Field, FormError, InputEvent, InputKind, RegistrationClient, SubmissionOutcome,
    SubmitPolicy,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::sessions::{parse_form_id, Sessions};

/// Form parameter naming the changed field when the htmx header is absent
pub const FIELD_PARAM: &str = "_field";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<Sessions>,
    pub client: Arc<dyn RegistrationClient>,
    pub policy: SubmitPolicy,
}

impl AppState {
    pub fn new(client: Arc<dyn RegistrationClient>, policy: SubmitPolicy) -> Self {
        Self {
            sessions: Arc::new(Sessions::new()),
            client,
            policy,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(mount_handler))
        .route(view::FIELD_ROUTE, post(field_handler))
        .route(view::SUBMIT_ROUTE, post(submit_handler))
        .route(view::UNMOUNT_ROUTE, post(unmount_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn form_id(params: &HashMap<String, String>) -> Option<Uuid> {
    parse_form_id(params.get(view::FORM_ID_PARAM))
}

/// Response for requests whose form is no longer mounted; htmx reloads the page
fn expired_response() -> Response {
    let mut response = (StatusCode::GONE, Html(view::expired().into_string())).into_response();
    response
        .headers_mut()
        .insert("hx-refresh", HeaderValue::from_static("true"));
    response
}

/// GET / - mount a fresh form with its own id
async fn mount_handler(State(state): State<AppState>) -> Html<String> {
    let (id, form) = state.sessions.mount().await;
    Html(view::page(&id.to_string(), &form).into_string())
}

/// POST /field - one input changed
async fn field_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let Some(id) = form_id(&params) else {
        return expired_response();
    };

    let name = headers
        .get("hx-trigger-name")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| params.get(FIELD_PARAM).cloned());
    let Some(field) = name.as_deref().and_then(Field::from_name) else {
        let err = FormError::UnknownField(name.unwrap_or_default());
        warn!(error = %err, "change rejected");
        return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
    };

    let event = input_event(field, &params);
    match state
        .sessions
        .with(id, |form| {
            form.on_change(event);
            view::field_update(form, field)
        })
        .await
    {
        Some(markup) => Html(markup.into_string()).into_response(),
        None => expired_response(),
    }
}

/// Build the raw event from urlencoded params. Browsers omit unchecked boxes.
fn input_event(field: Field, params: &HashMap<String, String>) -> InputEvent {
    let raw = params.get(field.name()).cloned();
    match field.input_kind() {
        InputKind::Checkbox => InputEvent::checkbox(field, raw.is_some()),
        InputKind::Choice => InputEvent::choice(field, raw.unwrap_or_default()),
        InputKind::Text => InputEvent::text(field, raw.unwrap_or_default()),
    }
}

/// POST /submit - send the mounted form's values to the registration endpoint
async fn submit_handler(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let Some(id) = form_id(&params) else {
        return expired_response();
    };
    let markup_id = id.to_string();

    let begun = state
        .sessions
        .with(id, |form| {
            form.begin_submit()
                .map_err(|err| (err, view::form(&markup_id, form)))
        })
        .await;
    let values = match begun {
        None => return expired_response(),
        Some(Err((err, markup))) => {
            warn!(form = %id, error = %err, "submit refused");
            return (StatusCode::CONFLICT, Html(markup.into_string())).into_response();
        }
        Some(Ok(values)) => values,
    };

    // The lock is not held across the outbound call
    info!(form = %id, username = %values.username, "submitting registration");
    let result = state.client.register(&values).await;
    let outcome = SubmissionOutcome::from_result(result, state.policy.message_source);

    let policy = state.policy;
    match state
        .sessions
        .with(id, |form| {
            form.finish_submit(outcome, &policy);
            view::form(&markup_id, form)
        })
        .await
    {
        Some(markup) => Html(markup.into_string()).into_response(),
        None => {
            warn!(form = %id, "form unmounted before the submission finished; result dropped");
            expired_response()
        }
    }
}

/// POST /unmount - the page is going away
async fn unmount_handler(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> StatusCode {
    if let Some(id) = form_id(&params) {
        state.sessions.unmount(id).await;
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use pretty_assertions::assert_eq;
    use registration::{ClientError, FormValues, RegistrationResponse};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    /// Client returning a canned result and recording what it was sent
    struct StubClient {
        reply: Result<String, (u16, Option<String>)>,
        sent: Mutex<Vec<FormValues>>,
        gate: Option<Arc<Notify>>,
    }

    impl StubClient {
        fn accepting(message: &str) -> Self {
            Self {
                reply: Ok(message.to_string()),
                sent: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn rejecting(status: u16, message: Option<&str>) -> Self {
            Self {
                reply: Err((status, message.map(str::to_string))),
                sent: Mutex::new(Vec::new()),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl RegistrationClient for StubClient {
        async fn register(&self, values: &FormValues) -> Result<RegistrationResponse, ClientError> {
            self.sent.lock().unwrap().push(values.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Ok(message) => Ok(RegistrationResponse {
                    message: message.clone(),
                }),
                Err((status, message)) => Err(ClientError::Status {
                    status: *status,
                    message: message.clone(),
                }),
            }
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const FORM_FIELD: &str = r#"name="_form" value=""#;

    /// Mount a form and return its id as rendered in the page
    async fn mount(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        let start = text.find(FORM_FIELD).unwrap() + FORM_FIELD.len();
        let end = start + text[start..].find('"').unwrap();
        text[start..end].to_string()
    }

    fn form_post(route: &str, body: String) -> Request<Body> {
        Request::post(route)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn with_id(id: &str, body: &str) -> String {
        if body.is_empty() {
            format!("_form={id}")
        } else {
            format!("_form={id}&{body}")
        }
    }

    async fn change(app: &Router, id: &str, field: &str, body: &str) -> Response {
        let mut request = form_post(view::FIELD_ROUTE, with_id(id, body));
        request
            .headers_mut()
            .insert("hx-trigger-name", HeaderValue::from_str(field).unwrap());
        app.clone().oneshot(request).await.unwrap()
    }

    async fn submit(app: &Router, id: &str) -> Response {
        app.clone()
            .oneshot(form_post(view::SUBMIT_ROUTE, with_id(id, "")))
            .await
            .unwrap()
    }

    async fn fill_valid(app: &Router, id: &str) {
        change(app, id, "username", "username=abc").await;
        change(app, id, "favLanguage", "favLanguage=javascript").await;
        change(app, id, "favFood", "favFood=pizza").await;
        let response = change(app, id, "agreement", "agreement=on").await;
        let text = body_text(response).await;
        assert!(!text.contains("disabled"), "submit should be enabled: {text}");
    }

    fn app_with(client: Arc<StubClient>) -> (Router, AppState) {
        let state = AppState::new(client, SubmitPolicy::default());
        (router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_mount_renders_disabled_form() {
        let (app, state) = app_with(Arc::new(StubClient::accepting("success")));
        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let text = body_text(response).await;
        assert!(text.contains("Create an Account"));
        assert!(text.contains(r#"type="submit" disabled"#));
        assert_eq!(state.sessions.count().await, 1);
    }

    #[tokio::test]
    async fn test_two_mounted_pages_are_independent() {
        let client = Arc::new(StubClient::accepting("success"));
        let (app, state) = app_with(client.clone());
        let first = mount(&app).await;
        let second = mount(&app).await;
        assert_ne!(first, second);
        assert_eq!(state.sessions.count().await, 2);

        fill_valid(&app, &first).await;
        change(&app, &second, "username", "username=zed").await;

        let response = submit(&app, &second).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(client.sent.lock().unwrap().is_empty());

        let response = submit(&app, &first).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.sent.lock().unwrap()[0].username, "abc");

        let second_id = Uuid::parse_str(&second).unwrap();
        let second_name = state
            .sessions
            .with(second_id, |form| form.values().username.clone())
            .await;
        assert_eq!(second_name.as_deref(), Some("zed"));
    }

    #[tokio::test]
    async fn test_abandoned_mounts_are_evicted() {
        let (app, state) = app_with(Arc::new(StubClient::accepting("success")));
        let mut ids = Vec::new();
        for _ in 0..50 {
            ids.push(mount(&app).await);
        }
        assert_eq!(state.sessions.count().await, 50);

        assert_eq!(state.sessions.evict_idle(Duration::ZERO).await, 50);
        assert_eq!(state.sessions.count().await, 0);

        let response = change(&app, &ids[0], "username", "username=abc").await;
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn test_field_change_returns_error_and_submit_state() {
        let (app, _) = app_with(Arc::new(StubClient::accepting("success")));
        let id = mount(&app).await;

        let response = change(&app, &id, "username", "username=ab").await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains("username must be at least 3 characters"));
        assert!(text.contains(r#"id="username-error""#));
        assert!(text.contains(r#"hx-swap-oob="true""#));
        assert!(text.contains("disabled"));
    }

    #[tokio::test]
    async fn test_unchecked_box_reads_as_false() {
        let (app, _) = app_with(Arc::new(StubClient::accepting("success")));
        let id = mount(&app).await;
        let text = body_text(change(&app, &id, "agreement", "").await).await;
        assert!(text.contains("agreement must be accepted"));
    }

    #[tokio::test]
    async fn test_field_param_fallback_and_unknown_field() {
        let (app, _) = app_with(Arc::new(StubClient::accepting("success")));
        let id = mount(&app).await;

        let response = app
            .clone()
            .oneshot(form_post(
                view::FIELD_ROUTE,
                with_id(&id, "_field=favFood&favFood=tacos"),
            ))
            .await
            .unwrap();
        let text = body_text(response).await;
        assert!(text.contains("favFood must be either broccoli, spaghetti or pizza"));

        let response = change(&app, &id, "password", "password=x").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_requests_for_unknown_forms_expire() {
        let (app, _) = app_with(Arc::new(StubClient::accepting("success")));
        let response = submit(&app, "00000000-0000-0000-0000-000000000000").await;
        assert_eq!(response.status(), StatusCode::GONE);
        assert_eq!(response.headers()["hx-refresh"], "true");

        let response = app
            .clone()
            .oneshot(form_post(view::SUBMIT_ROUTE, String::new()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn test_submit_refused_while_invalid() {
        let client = Arc::new(StubClient::accepting("success"));
        let (app, _) = app_with(client.clone());
        let id = mount(&app).await;

        let response = submit(&app, &id).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(client.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submission_resets_form() {
        let client = Arc::new(StubClient::accepting("success"));
        let (app, _) = app_with(client.clone());
        let id = mount(&app).await;
        fill_valid(&app, &id).await;

        let response = submit(&app, &id).await;
        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains(r#"<h4 class="success">success</h4>"#));
        assert!(!text.contains(r#"<h4 class="error">"#));
        assert!(text.contains(r#"type="submit" disabled"#));
        assert!(text.contains(r#"value="""#));

        let sent = client.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0],
            FormValues {
                username: "abc".to_string(),
                fav_language: "javascript".to_string(),
                fav_food: "pizza".to_string(),
                agreement: true,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_submission_shows_server_message() {
        let client = Arc::new(StubClient::rejecting(422, Some("username already taken")));
        let (app, _) = app_with(client);
        let id = mount(&app).await;
        fill_valid(&app, &id).await;

        let text = body_text(submit(&app, &id).await).await;
        assert!(text.contains(r#"<h4 class="error">username already taken</h4>"#));
        assert!(!text.contains(r#"class="success""#));
        // Values kept and submit re-enabled for a manual retry
        assert!(text.contains(r#"value="abc""#));
        assert!(!text.contains(r#"type="submit" disabled"#));
    }

    #[tokio::test]
    async fn test_result_for_unmounted_form_is_dropped() {
        let gate = Arc::new(Notify::new());
        let client = Arc::new(StubClient {
            gate: Some(gate.clone()),
            ..StubClient::accepting("success")
        });
        let (app, state) = app_with(client.clone());
        let id = mount(&app).await;
        fill_valid(&app, &id).await;

        let pending = tokio::spawn({
            let app = app.clone();
            let id = id.clone();
            async move { submit(&app, &id).await }
        });

        // Wait until the request is in flight, then tear the form down
        while client.sent.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        let response = app
            .clone()
            .oneshot(form_post(view::UNMOUNT_ROUTE, with_id(&id, "")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        gate.notify_one();
        let response = pending.await.unwrap();
        assert_eq!(response.status(), StatusCode::GONE);
        assert_eq!(state.sessions.count().await, 0);
    }
}
