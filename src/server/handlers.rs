use super::AppState;
use crate::core::{Result, SentimentLabel};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictInput {
    #[serde(default)]
    pub text: Option<String>,
}

/// The `text` of a `/predict` body.
///
/// Form and JSON bodies go through the framework's extractors, so an unreadable
/// or oversized body is a client error. Any other body, or none, is empty text.
#[derive(Debug, Default)]
pub struct PredictText(pub String);

fn is_json(content_type: &str) -> bool {
    content_type == "application/json" || content_type.ends_with("+json")
}

impl FromRequest for PredictText {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let mut payload = payload.take();
        Box::pin(async move {
            let input = match req.content_type() {
                "application/x-www-form-urlencoded" => {
                    web::Form::<PredictInput>::from_request(&req, &mut payload)
                        .await?
                        .into_inner()
                }
                ct if is_json(ct) => {
                    web::Json::<PredictInput>::from_request(&req, &mut payload)
                        .await?
                        .into_inner()
                }
                _ => PredictInput::default(),
            };
            Ok(PredictText(input.text.unwrap_or_default()))
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub sentiment: SentimentLabel,
}

/// Runs the forward pass on the blocking pool; a request waits for it to finish.
async fn classify(state: &AppState, text: String) -> Result<SentimentLabel> {
    let classifier = Arc::clone(&state.classifier);
    web::block(move || classifier.classify(&text)).await?
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(html(state.pages.index("", None)?))
}

/// Form submission from the page. A body without `text` is rejected by the
/// form extractor with 400 before this runs.
pub async fn analyze(
    state: web::Data<AppState>,
    form: web::Form<PageForm>,
) -> Result<HttpResponse> {
    let text = form.into_inner().text;
    let label = classify(&state, text.clone()).await?;
    Ok(html(state.pages.index(&text, Some(label))?))
}

/// JSON API. `text` is taken from a form or JSON body; when absent it is empty.
pub async fn predict(
    state: web::Data<AppState>,
    PredictText(text): PredictText,
) -> Result<web::Json<PredictResponse>> {
    let sentiment = classify(&state, text).await?;
    Ok(web::Json(PredictResponse { sentiment }))
}
