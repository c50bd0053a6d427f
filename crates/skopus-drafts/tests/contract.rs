//! End-to-end contract drafting against a mocked generation endpoint.

use skopus_core::{ContractField, ContractInput};
use skopus_drafts::{ContractDraftController, DraftError};
use skopus_genai::{DraftService, GenAiClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRO: &str = "/v1beta/models/gemini-3-pro-preview:generateContent";

fn service(base_url: &str) -> DraftService {
    let client = GenAiClient::with_base_url("test-key", 30, "skopus-test/0.1", base_url)
        .expect("client construction should not fail");
    DraftService::new(client, "gemini-3-pro-preview", 2048)
}

fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

fn filled() -> ContractInput {
    ContractInput {
        service_name: "Gestão de tráfego".into(),
        provider_name: "Ana Souza".into(),
        provider_id: "123.456.789-00".into(),
        client_name: "Loja Aurora".into(),
        client_id: "12.345.678/0001-90".into(),
        value: "2.500,00".into(),
        deadline: "30".into(),
        location: "Recife/PE".into(),
        date: "18/10/2026".into(),
        ..ContractInput::default()
    }
}

fn scratch_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("skopus-drafts-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn contract_is_drafted_laid_out_and_exported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRO))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
            "# CLÁUSULA PRIMEIRA - DO OBJETO\nA **CONTRATADA** prestará o serviço.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = scratch_dir();
    let controller = ContractDraftController::new(service(&server.uri()), &dir);
    let draft = controller.draft(&filled()).await.expect("draft");

    assert!(!draft.text.contains('#'));
    assert_eq!(draft.document.page_count(), 1);
    assert_eq!(draft.file_name(), "contrato_loja_aurora.pdf");

    let heading = draft
        .document
        .lines()
        .find(|l| l.text() == "CLÁUSULA PRIMEIRA - DO OBJETO")
        .expect("heading line");
    assert!(heading.runs.iter().all(|r| r.bold));

    let path = controller.export_pdf(&draft).await.expect("export");
    assert_eq!(path, dir.join("contrato_loja_aurora.pdf"));
    let bytes = tokio::fs::read(&path).await.expect("written file");
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(bytes, draft.to_pdf());

    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
}

#[tokio::test]
async fn invalid_contract_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let controller = ContractDraftController::new(service(&server.uri()), scratch_dir());
    let input = ContractInput {
        client_id: String::new(),
        value: " ".into(),
        ..filled()
    };
    let err = controller.draft(&input).await.expect_err("invalid");
    let DraftError::ContractValidation(validation) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(validation.missing.contains(&ContractField::ClientId));
    assert!(validation.missing.contains(&ContractField::Value));
    assert_eq!(validation.missing.len(), 2);
}

#[tokio::test]
async fn upstream_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRO))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let controller = ContractDraftController::new(service(&server.uri()), scratch_dir());
    let err = controller.draft(&filled()).await.expect_err("upstream");
    assert!(matches!(err, DraftError::Upstream(_)));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn export_into_unwritable_path_is_an_io_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRO))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Texto.")))
        .mount(&server)
        .await;

    // A regular file where the export directory should be.
    let blocker = scratch_dir();
    tokio::fs::write(&blocker, b"not a directory").await.expect("blocker");

    let controller = ContractDraftController::new(service(&server.uri()), blocker.join("out"));
    let draft = controller.draft(&filled()).await.expect("draft");
    let err = controller.export_pdf(&draft).await.expect_err("io");
    assert!(matches!(err, DraftError::Io { .. }));

    tokio::fs::remove_file(&blocker).await.expect("cleanup");
}
