use actix_web::{HttpResponse, Responder, web};
use tracing::{info, warn};

use crate::api::objects::{AppState, SubmitForm};
use crate::calculations::CalculationRecord;

const RECENT_LIMIT: usize = 10;

/// Accepts a submission, enqueues the addition and acknowledges immediately.
/// The caller gets the task id, never the result.
pub async fn handle_submit(
    form: web::Form<SubmitForm>,
    state: web::Data<AppState>,
) -> impl Responder {
    let (x, y) = match form.operands() {
        Ok(operands) => operands,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };
    let server_id = state.config.submit_server_id();
    let task = state.queue.enqueue(x, y, server_id);
    info!(task_id = %task.task_id, server_id, "task submitted: {x} + {y}");
    HttpResponse::Ok().body(format!(
        "Task submitted successfully! Server {server_id} is adding {x} + {y} (task {})",
        task.task_id
    ))
}

/// The display page: submission form plus recent history for this server.
pub async fn handle_home(state: web::Data<AppState>) -> impl Responder {
    let records = recent_records(&state).await;
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_home(&state.config.server_label(), &records))
}

/// Recent history as JSON.
pub async fn handle_recent(state: web::Data<AppState>) -> impl Responder {
    let records = recent_records(&state).await;
    let body = serde_json::to_string(&records).unwrap_or_else(|_| "[]".to_string());
    HttpResponse::Ok()
        .content_type("application/json")
        .body(body)
}

/// Up to the 10 most recent records for the configured server. Degrades to an
/// empty list when the identity is not numeric or the store read fails; the
/// page always renders.
async fn recent_records(state: &AppState) -> Vec<CalculationRecord> {
    let Some(server_id) = state.config.server_id() else {
        return vec![];
    };
    let store = state.registry.resolve_store(server_id);
    match store.recent(server_id, RECENT_LIMIT).await {
        Ok(records) => records,
        Err(e) => {
            warn!(server_id, "failed to read recent calculations: {e}");
            vec![]
        }
    }
}

fn render_home(server_label: &str, records: &[CalculationRecord]) -> String {
    let mut history = String::new();
    if records.is_empty() {
        history.push_str("<p>No calculations yet.</p>\n");
    } else {
        history.push_str("<ul>\n");
        for record in records {
            history.push_str(&format!(
                "<li>{record} (task {}, created {}, processed {}, took {} ms)</li>\n",
                record.task_id.as_deref().unwrap_or("unknown"),
                record.created_at.format("%Y-%m-%d %H:%M:%S"),
                record.processed_at.format("%Y-%m-%d %H:%M:%S"),
                record.processing_duration().num_milliseconds()
            ));
        }
        history.push_str("</ul>\n");
    }
    format!(
        "<html><body>\n<h1>Calculation Server</h1>\n<p>Server identity: {server_label}</p>\n\
         <form method=\"post\" action=\"/\">\n\
         <input name=\"x\" placeholder=\"x\"> + <input name=\"y\" placeholder=\"y\">\n\
         <button type=\"submit\">Add</button>\n</form>\n\
         <h2>Recent calculations</h2>\n{history}</body></html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{App, test};
    use tokio::sync::mpsc;

    use crate::config::AppConfig;
    use crate::db_router::StoreRegistry;
    use crate::tasks_queue::{self, AddTask};

    fn test_state(
        server_identity: Option<&str>,
    ) -> (AppState, mpsc::UnboundedReceiver<AddTask>) {
        let config = AppConfig {
            server_identity: server_identity.map(str::to_string),
            ..AppConfig::default()
        };
        let registry = Arc::new(StoreRegistry::new(&config.configured_servers));
        let (queue, rx) = tasks_queue::channel();
        (
            AppState {
                config,
                queue,
                registry,
            },
            rx,
        )
    }

    #[actix_web::test]
    async fn valid_submission_acks_with_server_and_task_id() {
        let (state, mut rx) = test_state(Some("2"));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .set_form([("x", "3"), ("y", "4")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Server 2"));
        assert!(body.contains("adding 3 + 4"));

        let task = rx.try_recv().unwrap();
        assert_eq!((task.x, task.y, task.server_id), (3, 4, 2));
        assert!(body.contains(&task.task_id));
    }

    #[actix_web::test]
    async fn invalid_operand_is_rejected_and_nothing_is_enqueued() {
        let (state, mut rx) = test_state(Some("1"));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .set_form([("x", "abc"), ("y", "4")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert_eq!(body, "Please enter valid numbers");
        assert!(rx.try_recv().is_err());
    }

    #[actix_web::test]
    async fn missing_operands_submit_as_zero() {
        let (state, mut rx) = test_state(None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .set_form(std::collections::HashMap::<&str, &str>::new())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let task = rx.try_recv().unwrap();
        // Unset identity defaults the submission to server 1.
        assert_eq!((task.x, task.y, task.server_id), (0, 0, 1));
    }

    #[actix_web::test]
    async fn display_with_no_history_renders_empty_list() {
        let (state, _rx) = test_state(Some("1"));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Server identity: 1"));
        assert!(body.contains("No calculations yet."));
    }

    #[actix_web::test]
    async fn display_shows_unknown_when_identity_is_unset() {
        let (state, _rx) = test_state(None);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Server identity: Unknown"));
    }

    #[actix_web::test]
    async fn display_degrades_to_empty_history_when_the_store_read_fails() {
        let (state, _rx) = test_state(Some("1"));
        state.registry.resolve_store(1).set_offline(true);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("No calculations yet."));
    }

    #[actix_web::test]
    async fn recent_endpoint_returns_json_history() {
        let (state, _rx) = test_state(Some("1"));
        let record = crate::calculations::CalculationRecord {
            x: 3,
            y: 4,
            result: 7,
            server_id: 1,
            task_id: Some("abc".to_string()),
            created_at: chrono::Utc::now(),
            processed_at: chrono::Utc::now(),
        };
        state.registry.resolve_store(1).insert(record).await.unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::api::configure),
        )
        .await;
        let req = test::TestRequest::get().uri("/recent").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let records: Vec<crate::calculations::CalculationRecord> =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].result, 7);
    }
}
