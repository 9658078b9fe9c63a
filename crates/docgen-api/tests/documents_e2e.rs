//! End-to-end tests for document generation, listing and download

mod common;

use common::{Fixture, PDF_MARKER};
use docgen_core::{
    FileType, NewDocument, NewTemplate, PlaceholderData, Storage, DOCUMENTS_BUCKET,
    TEMPLATES_BUCKET,
};
use rstest::rstest;
use serde_json::{json, Value};

const OFFER: &str = "Dear {name}, your start date is {date}.";

// =============================================================================
// Generate
// =============================================================================

#[tokio::test]
async fn generate_keeps_template_format_by_default() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;

    let response = fx
        .generate(json!({
            "templateId": template_id,
            "placeholderData": {"name": "Ada", "date": "2024-03-01"}
        }))
        .await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    let document = &body["document"];
    assert_eq!(document["id"], 1);
    assert_eq!(document["templateId"], template_id);
    assert_eq!(document["name"], "offer_generated.docx");
    assert_eq!(document["fileType"], "docx");
    assert_eq!(
        document["placeholderData"],
        json!({"date": "2024-03-01", "name": "Ada"})
    );
    assert_eq!(body["downloadUrl"], body["storageFile"]["url"]);
    assert_eq!(body["storageFile"]["bucket"], DOCUMENTS_BUCKET);

    let key = body["storageFile"]["storageId"].as_str().unwrap();
    assert!(fx.blobs.contains(DOCUMENTS_BUCKET, key));
}

#[rstest]
#[case("report.xlsx", None, "excel", "report_generated.xlsx")]
#[case("report.xlsx", Some("pdf"), "pdf", "report_generated.pdf")]
#[case("offer.docx", Some("pdf"), "pdf", "offer_generated.pdf")]
#[case("offer.docx", Some("PDF"), "docx", "offer_generated.docx")]
#[case("offer.docx", Some("docx"), "docx", "offer_generated.docx")]
#[tokio::test]
async fn generate_resolves_output_format(
    #[case] file_name: &str,
    #[case] output_format: Option<&str>,
    #[case] expected_type: &str,
    #[case] expected_name: &str,
) {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template(file_name, "{total}").await;

    let mut request = json!({
        "templateId": template_id,
        "placeholderData": {"total": "10"}
    });
    if let Some(format) = output_format {
        request["outputFormat"] = json!(format);
    }

    let response = fx.generate(request).await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["document"]["fileType"], expected_type);
    assert_eq!(body["document"]["name"], expected_name);
}

#[tokio::test]
async fn generate_accepts_numeric_string_template_id() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;

    let response = fx
        .generate(json!({
            "templateId": template_id.to_string(),
            "placeholderData": {"name": "Ada"}
        }))
        .await;
    assert_eq!(response.status(), 201);
}

#[rstest]
#[case(json!({"placeholderData": {"name": "Ada"}}))]
#[case(json!({"templateId": 1}))]
#[case(json!({}))]
#[tokio::test]
async fn generate_without_required_fields_is_rejected(#[case] request: Value) {
    let fx = Fixture::start().await;
    fx.upload_template("offer.docx", OFFER).await;

    let response = fx.generate(request).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "templateId and placeholderData are required");
    assert_eq!(fx.blobs.count(DOCUMENTS_BUCKET), 0);
}

#[tokio::test]
async fn generate_with_malformed_json_is_rejected() {
    let fx = Fixture::start().await;

    let response = fx
        .server
        .client
        .post(fx.url("/api/documents/generate"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[rstest]
#[case(json!(77))]
#[case(json!("not-a-number"))]
#[tokio::test]
async fn generate_for_unknown_template_is_not_found(#[case] template_id: Value) {
    let fx = Fixture::start().await;

    let response = fx
        .generate(json!({"templateId": template_id, "placeholderData": {}}))
        .await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Template not found");
}

#[tokio::test]
async fn generate_twice_stores_two_documents() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;

    for _ in 0..2 {
        let response = fx
            .generate(json!({"templateId": template_id, "placeholderData": {"name": "Ada"}}))
            .await;
        assert_eq!(response.status(), 201);
    }

    assert_eq!(fx.blobs.count(DOCUMENTS_BUCKET), 2);
    assert_eq!(fx.storage.get_all_documents().await.unwrap().len(), 2);
}

// =============================================================================
// Download
// =============================================================================

#[tokio::test]
async fn download_regenerates_from_template() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;

    let body: Value = fx
        .generate(json!({
            "templateId": template_id,
            "placeholderData": {"name": "Ada", "date": "Monday"}
        }))
        .await
        .json()
        .await
        .unwrap();
    let id = body["document"]["id"].as_i64().unwrap();
    let key = body["storageFile"]["storageId"].as_str().unwrap();

    // The stored file is never read back
    assert!(fx.blobs.remove(DOCUMENTS_BUCKET, key));
    let renders_before = fx.processor.render_count();

    let path = format!("/api/documents/{}/download", id);
    let first = fx.get(&path).await;
    assert_eq!(first.status(), 200);
    assert_eq!(
        first.headers()["content-type"],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert!(first.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("offer_generated.docx"));
    let first = first.bytes().await.unwrap();

    let second = fx.get(&path).await.bytes().await.unwrap();

    assert_eq!(&first[..], b"Dear Ada, your start date is Monday.");
    assert_eq!(first, second);
    assert_eq!(fx.processor.render_count(), renders_before + 2);
}

#[tokio::test]
async fn download_pdf_document_converts_again() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("report.xlsx", "Total {total}").await;

    let body: Value = fx
        .generate(json!({
            "templateId": template_id,
            "placeholderData": {"total": 42},
            "outputFormat": "pdf"
        }))
        .await
        .json()
        .await
        .unwrap();
    let id = body["document"]["id"].as_i64().unwrap();

    let response = fx.get(&format!("/api/documents/{}/download", id)).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/pdf");

    let bytes = response.bytes().await.unwrap();
    assert!(bytes.starts_with(PDF_MARKER));
    assert!(bytes.ends_with(b"Total 42"));
}

#[tokio::test]
async fn download_missing_placeholder_renders_empty() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;

    let body: Value = fx
        .generate(json!({"templateId": template_id, "placeholderData": {"name": "Ada"}}))
        .await
        .json()
        .await
        .unwrap();
    let id = body["document"]["id"].as_i64().unwrap();

    let bytes = fx
        .get(&format!("/api/documents/{}/download", id))
        .await
        .bytes()
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Dear Ada, your start date is .");
}

#[rstest]
#[case("/api/documents/5/download")]
#[case("/api/documents/x/download")]
#[tokio::test]
async fn download_unknown_document_is_not_found(#[case] path: &str) {
    let fx = Fixture::start().await;

    let response = fx.get(path).await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Document not found");
}

#[tokio::test]
async fn download_without_template_blob_is_server_error() {
    let fx = Fixture::start().await;

    let upload: Value = fx
        .upload("offer.docx", OFFER.as_bytes())
        .await
        .json()
        .await
        .unwrap();
    let template_id = upload["template"]["id"].as_i64().unwrap();
    let template_key = upload["storageFile"]["storageId"].as_str().unwrap();

    let body: Value = fx
        .generate(json!({"templateId": template_id, "placeholderData": {}}))
        .await
        .json()
        .await
        .unwrap();
    let id = body["document"]["id"].as_i64().unwrap();

    assert!(fx.blobs.remove(TEMPLATES_BUCKET, template_key));

    let response = fx.get(&format!("/api/documents/{}/download", id)).await;
    assert_eq!(response.status(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to download document");
}

#[tokio::test]
async fn download_for_unsupported_template_type_is_rejected() {
    let fx = Fixture::start().await;

    let template = fx
        .storage
        .create_template(NewTemplate {
            name: "scan".into(),
            original_file_name: "scan.pdf".into(),
            file_type: FileType::Pdf,
            storage_url: "memory://templates/1-scan.pdf".into(),
            storage_id: "1-scan.pdf".into(),
            placeholders: vec![],
        })
        .await
        .unwrap();

    let document = fx
        .storage
        .create_document(NewDocument {
            template_id: template.id,
            name: "scan_generated.pdf".into(),
            file_type: FileType::Pdf,
            storage_url: "memory://generated-docs/1-scan_generated.pdf".into(),
            storage_id: "1-scan_generated.pdf".into(),
            placeholder_data: PlaceholderData::new(),
        })
        .await
        .unwrap();

    let response = fx
        .get(&format!("/api/documents/{}/download", document.id))
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unsupported template file type: pdf");
}

// =============================================================================
// Read and list
// =============================================================================

#[tokio::test]
async fn get_document_includes_both_urls() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;

    let generated: Value = fx
        .generate(json!({"templateId": template_id, "placeholderData": {"name": "Ada"}}))
        .await
        .json()
        .await
        .unwrap();
    let id = generated["document"]["id"].as_i64().unwrap();

    let response = fx.get(&format!("/api/documents/{}", id)).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let document = &body["document"];
    assert_eq!(document["downloadUrl"], format!("/api/documents/{}/download", id));
    assert_eq!(document["viewUrl"], generated["storageFile"]["url"]);
    assert_eq!(document["storageUrl"], generated["storageFile"]["url"]);
}

#[tokio::test]
async fn get_unknown_document_is_not_found() {
    let fx = Fixture::start().await;

    let response = fx.get("/api/documents/3").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn list_documents_is_keyed() {
    let fx = Fixture::start().await;
    let template_id = fx.upload_template("offer.docx", OFFER).await;
    fx.generate(json!({"templateId": template_id, "placeholderData": {"name": "Ada"}}))
        .await;

    let body: Value = fx.get("/api/documents").await.json().await.unwrap();
    assert_eq!(body["API Status"], "Success");
    assert_eq!(body["Total Documents"], 1);

    let entry = &body["Documents"]["Document 1"];
    assert_eq!(entry["ID"], 1);
    assert_eq!(entry["Name"], "offer_generated.docx");
    assert_eq!(entry["Template ID"], template_id);
    assert_eq!(entry["File Type"], "DOCX");
    assert_eq!(entry["Placeholder Data"], json!({"name": "Ada"}));
    assert_eq!(entry["Download Endpoint"], "/api/documents/1/download");
}

#[tokio::test]
async fn list_by_template_filters_documents() {
    let fx = Fixture::start().await;
    let offer = fx.upload_template("offer.docx", OFFER).await;
    let report = fx.upload_template("report.xlsx", "{total}").await;

    for template_id in [offer, report, offer] {
        let response = fx
            .generate(json!({"templateId": template_id, "placeholderData": {}}))
            .await;
        assert_eq!(response.status(), 201);
    }

    let body: Value = fx
        .get(&format!("/api/documents/template/{}", offer))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["templateId"], offer);
    assert_eq!(body["count"], 2);

    let documents = body["documents"].as_array().unwrap();
    assert!(documents.iter().all(|d| d["templateId"] == offer));
    assert_eq!(documents[0]["downloadUrl"], "/api/documents/1/download");
    assert_eq!(documents[1]["downloadUrl"], "/api/documents/3/download");
}

#[tokio::test]
async fn list_by_template_without_documents_is_empty() {
    let fx = Fixture::start().await;

    let response = fx.get("/api/documents/template/9").await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], 0);
    assert_eq!(body["documents"], json!([]));
}

#[tokio::test]
async fn list_by_template_with_invalid_id_is_rejected() {
    let fx = Fixture::start().await;

    let response = fx.get("/api/documents/template/abc").await;
    assert_eq!(response.status(), 400);
}
