// Integration tests for userdesk
// These tests drive the list orchestrator, the session task, the HTTP
// backend and the renderer through the public API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use userdesk::api::{ApiCall, MemoryUserApi, UserApi};
use userdesk::form::{Field, SubmitOutcome};
use userdesk::list::{DELETE_PROMPT, DELETED_MESSAGE, DeleteOutcome, SAVED_MESSAGE, UserList};
use userdesk::model::{Gender, UserRecord};
use userdesk::notify::{Confirm, Level, Notifier};
use userdesk::ApiError;

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(String, Level)>>,
}

impl RecordingNotifier {
    fn seen(&self) -> Vec<(String, Level)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, level: Level) {
        self.seen.lock().unwrap().push((message.to_string(), level));
    }
}

struct ScriptedConfirm {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.answer
    }
}

fn ann() -> UserRecord {
    UserRecord {
        id: Some(1),
        full_name: "Ann".into(),
        email: "a@x.com".into(),
        address: "1 Rd".into(),
        date_of_birth: "2000-01-01".into(),
        phone_number: "123".into(),
        gender: Gender::Female,
    }
}

fn bob() -> UserRecord {
    UserRecord {
        id: Some(5),
        full_name: "Bob".into(),
        email: "bob@y.org".into(),
        address: "5 Ave".into(),
        date_of_birth: "1985-03-09".into(),
        phone_number: "555-0100".into(),
        gender: Gender::Male,
    }
}

type Harness = (
    UserList<Arc<MemoryUserApi>, Arc<RecordingNotifier>, Arc<ScriptedConfirm>>,
    Arc<MemoryUserApi>,
    Arc<RecordingNotifier>,
    Arc<ScriptedConfirm>,
);

async fn mounted(records: Vec<UserRecord>, confirm: bool) -> Harness {
    let api = Arc::new(MemoryUserApi::with_records(records));
    let notifier = Arc::new(RecordingNotifier::default());
    let confirm = Arc::new(ScriptedConfirm::answering(confirm));
    let mut list = UserList::new(api.clone(), notifier.clone(), confirm.clone());
    list.mount().await.unwrap();
    api.clear_calls();
    (list, api, notifier, confirm)
}

fn fill(list: &mut UserList<Arc<MemoryUserApi>, Arc<RecordingNotifier>, Arc<ScriptedConfirm>>) {
    let form = list.form_mut();
    form.set_text(Field::FullName, "Cy");
    form.set_text(Field::Email, "cy@z.net");
    form.set_text(Field::Address, "9 Ln");
    form.set_text(Field::DateOfBirth, "1999-12-31");
    form.set_text(Field::PhoneNumber, "0123456789");
}

// ============================================================================
// List orchestrator
// ============================================================================

#[tokio::test]
async fn mount_fetches_once() {
    let api = Arc::new(MemoryUserApi::with_records([ann(), bob()]));
    let mut list = UserList::new(
        api.clone(),
        Arc::new(RecordingNotifier::default()),
        Arc::new(ScriptedConfirm::answering(true)),
    );
    list.mount().await.unwrap();
    assert_eq!(api.calls(), vec![ApiCall::ListAll]);
    assert_eq!(list.users(), &[ann(), bob()]);
}

#[tokio::test]
async fn failed_delete_leaves_list_and_reports_cause() {
    let (mut list, api, notifier, _) = mounted(vec![ann(), bob()], true).await;
    api.fail_next(ApiError::transport("network down"));

    let outcome = list.delete(5).await;

    assert!(matches!(outcome, DeleteOutcome::Failed(ApiError::Transport(_))));
    assert_eq!(list.users(), &[ann(), bob()]);
    assert_eq!(api.calls(), vec![ApiCall::Delete(5)]);
    let seen = notifier.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].0.contains("network down"));
    assert_eq!(seen[0].1, Level::Error);
}

#[tokio::test]
async fn confirmed_delete_refetches_then_notifies() {
    let (mut list, api, notifier, confirm) = mounted(vec![ann(), bob()], true).await;

    assert_eq!(list.delete(5).await, DeleteOutcome::Deleted);

    assert_eq!(*confirm.asked.lock().unwrap(), vec![DELETE_PROMPT.to_string()]);
    assert_eq!(api.calls(), vec![ApiCall::Delete(5), ApiCall::ListAll]);
    assert_eq!(list.users(), &[ann()]);
    assert_eq!(
        notifier.seen(),
        vec![(DELETED_MESSAGE.to_string(), Level::Success)]
    );
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let (mut list, api, notifier, _) = mounted(vec![ann(), bob()], false).await;

    assert_eq!(list.delete(5).await, DeleteOutcome::Declined);

    assert!(api.calls().is_empty());
    assert!(notifier.seen().is_empty());
    assert_eq!(list.users().len(), 2);
}

#[tokio::test]
async fn create_is_followed_by_exactly_one_fetch() {
    let (mut list, api, notifier, _) = mounted(vec![ann()], true).await;
    // Another operator adds a record in the meantime; the refreshed list must
    // show it, which a local merge of the created record would not.
    api.create(&bob()).await.unwrap();
    api.clear_calls();

    list.open_create();
    fill(&mut list);
    let outcome = list.submit_form().await;

    assert!(matches!(outcome, SubmitOutcome::Saved(ref r) if r.full_name == "Cy"));
    assert_eq!(api.calls(), vec![ApiCall::Create, ApiCall::ListAll]);
    assert_eq!(list.users(), api.records().as_slice());
    assert_eq!(list.users().len(), 3);
    assert!(!list.form().is_open());
    assert_eq!(
        notifier.seen(),
        vec![(SAVED_MESSAGE.to_string(), Level::Success)]
    );
}

#[tokio::test]
async fn edit_submits_update_for_the_record_id() {
    let (mut list, api, _, _) = mounted(vec![ann(), bob()], true).await;

    assert!(list.open_edit(1));
    list.form_mut().set_text(Field::Address, "2 Rd");
    list.submit_form().await;

    assert_eq!(api.calls(), vec![ApiCall::Update(1), ApiCall::ListAll]);
    assert_eq!(list.find(1).map(|u| u.address.as_str()), Some("2 Rd"));
}

#[tokio::test]
async fn edit_of_unknown_id_keeps_form_closed() {
    let (mut list, _, _, _) = mounted(vec![ann()], true).await;
    assert!(!list.open_edit(42));
    assert!(!list.form().is_open());
}

#[tokio::test]
async fn edit_populates_form_and_add_resets_it() {
    let (mut list, _, _, _) = mounted(vec![ann()], true).await;

    list.open_edit(1);
    assert_eq!(list.form().buffer(), &ann());

    list.open_create();
    assert_eq!(list.form().buffer(), &UserRecord::default());
    assert_eq!(list.form().buffer().gender, Gender::Male);
}

#[tokio::test]
async fn cancel_makes_no_calls() {
    let (mut list, api, notifier, _) = mounted(vec![ann()], true).await;

    list.open_edit(1);
    list.form_mut().set_text(Field::FullName, "Changed");
    list.cancel_form().await;

    assert!(api.calls().is_empty());
    assert!(notifier.seen().is_empty());
    assert!(!list.form().is_open());
    assert_eq!(list.users(), &[ann()]);
}

#[tokio::test]
async fn empty_required_field_blocks_submit() {
    for field in [
        Field::FullName,
        Field::Email,
        Field::Address,
        Field::DateOfBirth,
        Field::PhoneNumber,
    ] {
        let (mut list, api, _, _) = mounted(vec![], true).await;
        list.open_create();
        fill(&mut list);
        list.form_mut().set_text(field, "");

        assert_eq!(list.submit_form().await, SubmitOutcome::Blocked);
        assert!(api.calls().is_empty(), "{field:?} should block the request");
        assert!(list.form().is_open());
        assert!(list.form().visible_error(field).is_some());
    }
}

#[tokio::test]
async fn failed_save_keeps_dialog_open_without_notifying() {
    let (mut list, api, notifier, _) = mounted(vec![ann()], true).await;

    list.open_edit(1);
    list.form_mut().set_text(Field::Address, "2 Rd");
    api.fail_next(ApiError::from_status(500, "boom"));
    let outcome = list.submit_form().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ApiError::Http { status: 500, .. })));
    assert_eq!(api.calls(), vec![ApiCall::Update(1)]);
    assert!(list.form().is_open());
    assert_eq!(list.form().value(Field::Address), "2 Rd");
    assert!(notifier.seen().is_empty());
    assert_eq!(list.users(), &[ann()]);
}

// ============================================================================
// Session task
// ============================================================================

mod session {
    use super::*;
    use tokio::sync::mpsc;
    use userdesk::app::session::{self, Command, FormInput, UiRequest};

    #[tokio::test]
    async fn delete_confirmed_through_ui_channel() {
        let api = Arc::new(MemoryUserApi::with_records([ann(), bob()]));
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let session = session::spawn(api.clone(), ui_tx);
        let mut view = session.view.clone();

        view.wait_for(|v| v.loaded).await.unwrap();
        assert_eq!(view.borrow().users.len(), 2);

        assert!(session.send(Command::Delete(5)));
        match ui_rx.recv().await.unwrap() {
            UiRequest::Confirm { message, reply } => {
                assert_eq!(message, DELETE_PROMPT);
                reply.send(true).unwrap();
            }
            other => panic!("expected a confirmation, got {other:?}"),
        }
        match ui_rx.recv().await.unwrap() {
            UiRequest::Toast { message, level } => {
                assert_eq!(message, DELETED_MESSAGE);
                assert_eq!(level, Level::Success);
            }
            other => panic!("expected a toast, got {other:?}"),
        }
        view.wait_for(|v| v.users.len() == 1 && !v.busy)
            .await
            .unwrap();
        assert_eq!(api.records(), vec![ann()]);
        session.shutdown();
    }

    #[tokio::test]
    async fn dropped_confirmation_counts_as_no() {
        let api = Arc::new(MemoryUserApi::with_records([bob()]));
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let session = session::spawn(api.clone(), ui_tx);
        let mut view = session.view.clone();
        view.wait_for(|v| v.loaded).await.unwrap();

        session.send(Command::Delete(5));
        match ui_rx.recv().await.unwrap() {
            UiRequest::Confirm { reply, .. } => drop(reply),
            other => panic!("expected a confirmation, got {other:?}"),
        }
        session.send(Command::Refresh);
        view.changed().await.unwrap();
        view.wait_for(|v| !v.busy).await.unwrap();

        assert!(!api.calls().contains(&ApiCall::Delete(5)));
        assert_eq!(api.records(), vec![bob()]);
        session.shutdown();
    }

    #[tokio::test]
    async fn typed_form_is_created_and_listed() {
        let api = Arc::new(MemoryUserApi::new());
        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let session = session::spawn(api.clone(), ui_tx);
        let mut view = session.view.clone();
        view.wait_for(|v| v.loaded).await.unwrap();

        session.send(Command::Add);
        let values = [
            (Field::FullName, "Di"),
            (Field::Email, "di@w.io"),
            (Field::Address, "3 St"),
            (Field::DateOfBirth, "2001-02-03"),
            (Field::PhoneNumber, "777"),
        ];
        for (field, text) in values {
            session.send(Command::Form(FormInput::Focus(field)));
            for c in text.chars() {
                session.send(Command::Form(FormInput::Char(c)));
            }
        }
        session.send(Command::Form(FormInput::ToggleGender));
        session.send(Command::Submit);

        match ui_rx.recv().await.unwrap() {
            UiRequest::Toast { message, .. } => assert_eq!(message, SAVED_MESSAGE),
            other => panic!("expected a toast, got {other:?}"),
        }
        view.wait_for(|v| v.users.len() == 1 && !v.form.is_open())
            .await
            .unwrap();
        let stored = api.records();
        assert_eq!(stored[0].full_name, "Di");
        assert_eq!(stored[0].phone_number, "777");
        assert_eq!(stored[0].gender, Gender::Female);
        session.shutdown();
    }
}

// ============================================================================
// HTTP backend against a local server
// ============================================================================

mod http {
    use super::*;
    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{delete, get, post, put};
    use axum::Json;
    use serde_json::Value;
    use userdesk::api::HttpUserApi;

    #[derive(Clone, Default)]
    struct Server {
        records: Arc<Mutex<Vec<UserRecord>>>,
        last_body: Arc<Mutex<Option<Value>>>,
    }

    async fn list(State(s): State<Server>) -> Json<Vec<UserRecord>> {
        Json(s.records.lock().unwrap().clone())
    }

    async fn get_one(
        State(s): State<Server>,
        Path(id): Path<i64>,
    ) -> Result<Json<UserRecord>, StatusCode> {
        s.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn create(
        State(s): State<Server>,
        Json(body): Json<Value>,
    ) -> Result<Json<UserRecord>, (StatusCode, String)> {
        *s.last_body.lock().unwrap() = Some(body.clone());
        let mut rec: UserRecord = serde_json::from_value(body)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        if rec.full_name.trim().is_empty() {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                "fullName must not be blank".into(),
            ));
        }
        let mut records = s.records.lock().unwrap();
        rec.id = Some(records.len() as i64 + 100);
        records.push(rec.clone());
        Ok(Json(rec))
    }

    async fn update(
        State(s): State<Server>,
        Path(id): Path<i64>,
        Json(rec): Json<UserRecord>,
    ) -> Result<Json<UserRecord>, StatusCode> {
        let mut records = s.records.lock().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or(StatusCode::NOT_FOUND)?;
        *slot = UserRecord { id: Some(id), ..rec };
        Ok(Json(slot.clone()))
    }

    async fn remove(
        State(s): State<Server>,
        Path(id): Path<i64>,
    ) -> Result<StatusCode, (StatusCode, &'static str)> {
        if id == 500 {
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "boom"));
        }
        let mut records = s.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != Some(id));
        if records.len() == before {
            return Err((StatusCode::NOT_FOUND, "no such user"));
        }
        Ok(StatusCode::OK)
    }

    async fn start(seed: Vec<UserRecord>) -> (HttpUserApi, Server) {
        let server = Server::default();
        *server.records.lock().unwrap() = seed;
        let app = Router::new()
            .route("/api/v1/user/get-all-users", get(list))
            .route("/api/v1/user/:id/get-by-id", get(get_one))
            .route("/api/v1/user/add-user", post(create))
            .route("/api/v1/user/:id/update-user", put(update))
            .route("/api/v1/user/:id/delete-user", delete(remove))
            .with_state(server.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (
            HttpUserApi::new(format!("http://{addr}/api/v1/user/")),
            server,
        )
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let (api, server) = start(vec![ann()]).await;

        assert_eq!(api.list_all().await.unwrap(), vec![ann()]);
        assert_eq!(api.get_by_id(1).await.unwrap(), ann());

        let new = UserRecord {
            id: Some(77),
            full_name: "Cy".into(),
            ..bob()
        };
        let created = api.create(&new).await.unwrap();
        assert_eq!(created.id, Some(101));
        let body = server.last_body.lock().unwrap().clone().unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["fullName"], "Cy");
        assert_eq!(body["gender"], "MALE");

        let changed = UserRecord {
            address: "2 Rd".into(),
            ..ann()
        };
        assert_eq!(api.update(1, &changed).await.unwrap().address, "2 Rd");

        api.delete_by_id(1).await.unwrap();
        let ids: Vec<_> = api.list_all().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![Some(101)]);
    }

    #[tokio::test]
    async fn statuses_map_to_error_kinds() {
        let (api, _) = start(vec![ann()]).await;

        assert!(matches!(api.get_by_id(9).await, Err(ApiError::NotFound(_))));
        assert!(matches!(api.delete_by_id(9).await, Err(ApiError::NotFound(_))));

        let blank = UserRecord::default();
        match api.create(&blank).await {
            Err(ApiError::Validation { status, body }) => {
                assert_eq!(status, 422);
                assert!(body.contains("fullName"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        match api.delete_by_id(500).await {
            Err(ApiError::Http { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let api = HttpUserApi::new(format!("http://{addr}/api/v1/user"));
        match api.list_all().await {
            Err(ApiError::Transport(msg)) => {
                assert!(msg.to_lowercase().contains("refused"), "{msg}");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn orchestrator_over_http() {
        let (api, server) = start(vec![ann(), bob()]).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let mut list = UserList::new(
            api,
            notifier.clone(),
            Arc::new(ScriptedConfirm::answering(true)),
        );
        list.mount().await.unwrap();
        assert_eq!(list.users().len(), 2);

        assert_eq!(list.delete(5).await, DeleteOutcome::Deleted);
        assert_eq!(list.users(), &[ann()]);
        assert_eq!(*server.records.lock().unwrap(), vec![ann()]);

        match list.delete(5).await {
            DeleteOutcome::Failed(ApiError::NotFound(_)) => {}
            other => panic!("expected not found, got {other:?}"),
        }
        let seen = notifier.seen();
        assert_eq!(seen.last().map(|(_, l)| *l), Some(Level::Error));
    }
}

// ============================================================================
// Rendering
// ============================================================================

mod render {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use userdesk::app::keymap::Keymap;
    use userdesk::app::session::View;
    use userdesk::app::{AppState, Theme};
    use userdesk::form::UserForm;
    use userdesk::ui;

    fn screen(app: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 32)).unwrap();
        terminal.draw(|f| ui::render(f, app)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app_with(view: View) -> AppState {
        let mut app = AppState::new(Theme::mocha(), Keymap::default(), "http://test/api");
        app.set_view(view);
        app
    }

    #[test]
    fn table_lists_users() {
        let mut app = app_with(View {
            users: vec![ann(), bob()],
            loaded: true,
            ..View::default()
        });
        let text = screen(&mut app);
        assert!(text.contains("Full Name"));
        assert!(text.contains("Ann"));
        assert!(text.contains("bob@y.org"));
        assert!(text.contains("Users 1/2"));
    }

    #[test]
    fn submitted_empty_form_shows_errors() {
        let mut form = UserForm::new();
        form.open_create();
        form.touch_all();
        let mut app = app_with(View {
            form,
            loaded: true,
            ..View::default()
        });
        let text = screen(&mut app);
        assert!(text.contains("Add User"));
        assert!(text.contains("Full name is required."));
        assert!(text.contains("Phone number is required."));
        assert!(text.contains("[Enter] Create"));
    }

    #[test]
    fn untouched_form_hides_errors() {
        let mut form = UserForm::new();
        form.open_edit(&UserRecord::default());
        let mut app = app_with(View {
            form,
            loaded: true,
            ..View::default()
        });
        let text = screen(&mut app);
        assert!(!text.contains("is required."));
    }

    #[test]
    fn confirm_prompt_is_drawn() {
        let mut app = app_with(View {
            users: vec![bob()],
            loaded: true,
            ..View::default()
        });
        let (tx, _rx) = tokio::sync::oneshot::channel();
        app.open_confirm(DELETE_PROMPT.to_string(), tx);
        let text = screen(&mut app);
        assert!(text.contains("Confirm"));
        assert!(text.contains("[No]"));
    }
}
