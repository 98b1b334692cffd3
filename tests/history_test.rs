mod common;

use common::{CachedSession, FakeBackend};
use gabarito_core::services::{HistoryService, HISTORY_LIMIT};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn backend_with_rows() -> Arc<FakeBackend> {
    Arc::new(FakeBackend::new(CachedSession::None).with_history(
        json!([
            {"id_prova": 2, "tb_prova": {"titulo": "Matemática", "id_escola": 42}},
            {"id_prova": 2, "tb_prova": {"titulo": "Matemática", "id_escola": 42}},
            {"id_prova": 5, "tb_prova": [{"titulo": "Português", "id_escola": 42}]}
        ]),
        json!([
            {
                "id_folha": 7,
                "nota_final": 8,
                "data_correcao": "2026-03-02T14:30:00Z",
                "status": "CORRIGIDO",
                "id_prova": 2,
                "tb_aluno": {"nome_completo": "Ana"},
                "tb_prova": [{"titulo": "Matemática", "id_escola": 42}]
            },
            {
                "id_folha": 8,
                "nota_final": null,
                "data_correcao": null,
                "status": "CORRIGIDO",
                "id_prova": 5,
                "tb_aluno": [],
                "tb_prova": {"titulo": "Português", "id_escola": 42}
            }
        ]),
    ))
}

#[tokio::test]
async fn test_history_without_school_is_empty() {
    let backend = backend_with_rows();
    let service = HistoryService::new(backend.clone());

    let page = service.load(None, None).await.unwrap();
    assert!(page.records.is_empty());
    assert!(page.exams.is_empty());
    assert_eq!(backend.history_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_history_normalizes_rows() {
    let backend = backend_with_rows();
    let service = HistoryService::new(backend.clone());

    let page = service.load(Some(42), Some(2)).await.unwrap();

    assert_eq!(page.exams.len(), 2);
    assert_eq!(page.exams[0].title, "Matemática");
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[0].student.as_ref().unwrap().nome_completo, "Ana");
    assert_eq!(page.records[0].exam.as_ref().unwrap().titulo, "Matemática");
    assert!(page.records[1].student.is_none());
    assert_eq!(
        *backend.last_history_query.lock().unwrap(),
        Some((42, Some(2), HISTORY_LIMIT))
    );
}
