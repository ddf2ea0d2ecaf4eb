use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use labelcheck_core::{ExpectedFields, VerifyStatus};
use labelcheck_ocr::{LabelFields, LabelPipeline, LineRecognizer, Verification};
use serde::Serialize;
use tracing::error;

pub type SharedPipeline = Arc<LabelPipeline<Box<dyn LineRecognizer>>>;

pub fn router(pipeline: SharedPipeline) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/verify-label", post(verify_label))
        .with_state(pipeline)
}

/// Wire shape of a `/verify-label` response. Either an error
/// (`status: "error"` plus `message`) or a verdict (`status:
/// "success"` plus result, issues and the extracted data including
/// `raw_lines` for auditability).
#[derive(Debug, Serialize)]
pub struct VerifyLabelResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_result: Option<VerifyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<LabelFields>,
}

impl VerifyLabelResponse {
    fn success(v: Verification) -> Self {
        Self {
            status: "success",
            message: None,
            verification_result: Some(v.report.status),
            issues: Some(v.report.issues),
            data: Some(v.fields),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            verification_result: None,
            issues: None,
            data: None,
        }
    }
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Logistics API Online. Use POST /verify-label to test."
    }))
}

async fn verify_label(
    State(pipeline): State<SharedPipeline>,
    multipart: Multipart,
) -> (StatusCode, Json<VerifyLabelResponse>) {
    let (expected, image) = match read_form(multipart).await {
        Ok(parts) => parts,
        Err(msg) => {
            return (StatusCode::BAD_REQUEST, Json(VerifyLabelResponse::error(msg)));
        }
    };
    let Some(image) = image else {
        return (
            StatusCode::BAD_REQUEST,
            Json(VerifyLabelResponse::error("Missing 'file' part")),
        );
    };

    // Recognition is CPU-bound; keep it off the async executor.
    let outcome =
        tokio::task::spawn_blocking(move || pipeline.verify_label(&image, &expected)).await;

    match outcome {
        Ok(Ok(v)) => (StatusCode::OK, Json(VerifyLabelResponse::success(v))),
        // Pipeline failures are part of the API contract, not HTTP
        // errors: the caller gets a structured `status: "error"`.
        Ok(Err(e)) => (StatusCode::OK, Json(VerifyLabelResponse::error(e.to_string()))),
        Err(e) => {
            error!(error = %e, "verification task panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyLabelResponse::error("Internal error")),
            )
        }
    }
}

/// Pull the expected fields and the image out of the multipart form.
/// Unknown parts are ignored.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(ExpectedFields, Option<Vec<u8>>), String> {
    let mut expected = ExpectedFields::default();
    let mut image = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(format!("Malformed multipart body: {e}")),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.map_err(|e| format!("Reading 'file': {e}"))?;
                image = Some(bytes.to_vec());
            }
            // `expected_product_code` is the name the original intake
            // client sends; `expected_pid` its later revision.
            "expected_pid" | "expected_product_code" | "expected_sku" | "expected_weight"
            | "expected_color" | "expected_dimensions" => {
                let value =
                    field.text().await.map_err(|e| format!("Reading '{name}': {e}"))?;
                let slot = match name.as_str() {
                    "expected_pid" | "expected_product_code" => &mut expected.pid,
                    "expected_sku" => &mut expected.sku,
                    "expected_weight" => &mut expected.weight,
                    "expected_color" => &mut expected.color,
                    _ => &mut expected.dimensions,
                };
                *slot = Some(value);
            }
            _ => {}
        }
    }

    Ok((expected, image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use labelcheck_core::VerificationReport;
    use labelcheck_ocr::{LabelPipeline, MockRecognizer, Verifier};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "label-test-boundary";

    fn test_router(pairs: &[(&str, f32)]) -> Router {
        let recognizer: Box<dyn LineRecognizer> = Box::new(MockRecognizer::from_pairs(pairs));
        router(Arc::new(LabelPipeline::new(recognizer, Verifier::default())))
    }

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    fn text_part(name: &str, value: &str) -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .into_bytes()
    }

    fn file_part(bytes: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"label.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(bytes);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn multipart_request(parts: Vec<Vec<u8>>) -> Request<Body> {
        let mut body = Vec::new();
        for p in parts {
            body.extend(p);
        }
        body.extend(format!("--{BOUNDARY}--\r\n").into_bytes());
        Request::builder()
            .method("POST")
            .uri("/verify-label")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn home_reports_online() {
        let app = test_router(&[]);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["message"].as_str().unwrap().contains("Online"));
    }

    #[tokio::test]
    async fn verify_label_success_round_trip() {
        let app = test_router(&[("SKU: ELEC-552", 0.97), ("PID: 1804", 0.95)]);
        let request = multipart_request(vec![
            text_part("expected_sku", "ELEC-552"),
            // The original intake client's field name for the
            // product identifier.
            text_part("expected_product_code", "PID-1804"),
            file_part(&tiny_png()),
        ]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["verification_result"], "MATCH");
        assert_eq!(json["issues"], serde_json::json!([]));
        assert_eq!(json["data"]["sku"], "ELEC-552");
        assert_eq!(json["data"]["product_code"], "1804");
        assert_eq!(json["data"]["raw_lines"][0], "SKU: ELEC-552");
    }

    #[tokio::test]
    async fn missing_file_part_is_bad_request() {
        let app = test_router(&[("SKU: ELEC-552", 0.97)]);
        let request = multipart_request(vec![text_part("expected_sku", "ELEC-552")]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Missing 'file' part");
    }

    #[tokio::test]
    async fn pipeline_failure_is_structured_error_not_http_error() {
        let app = test_router(&[("irrelevant", 1.0)]);
        let request = multipart_request(vec![
            text_part("expected_sku", "ELEC-552"),
            file_part(b"definitely not an image"),
        ]);

        let response = app.oneshot(request).await.unwrap();
        // Recognizer-level failures are part of the API contract.
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().starts_with("Invalid image file"));
        assert!(json.get("verification_result").is_none());
    }

    #[tokio::test]
    async fn unknown_form_parts_are_ignored() {
        let app = test_router(&[("SKU: ELEC-552", 0.97)]);
        let request = multipart_request(vec![
            text_part("operator_badge", "W-204"),
            text_part("expected_sku", "ELEC-552"),
            file_part(&tiny_png()),
        ]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["verification_result"], "MATCH");
    }

    #[test]
    fn error_response_shape() {
        let json =
            serde_json::to_value(VerifyLabelResponse::error("No text detected")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "No text detected");
        assert!(json.get("verification_result").is_none());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn success_response_shape() {
        let v = Verification {
            report: VerificationReport {
                status: VerifyStatus::Match,
                issues: vec![],
            },
            fields: LabelFields {
                sku: Some("ELEC-552".into()),
                raw_lines: vec!["SKU: ELEC-552".into()],
                ..Default::default()
            },
        };
        let json = serde_json::to_value(VerifyLabelResponse::success(v)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["verification_result"], "MATCH");
        assert_eq!(json["issues"], serde_json::json!([]));
        assert_eq!(json["data"]["raw_lines"][0], "SKU: ELEC-552");
        assert!(json.get("message").is_none());
    }
}
