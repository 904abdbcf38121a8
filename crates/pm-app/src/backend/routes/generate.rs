use std::sync::Arc;
use axum::Json;
use axum::extract::{Multipart, State};
use tracing::{debug, info};
use pm_core::generation::parse_duration;
use pm_core::{GenerationRequest, StylePreset, ValidationError};
use crate::backend::routes::upload::FileField;
use crate::backend::schemas::SubmitResponse;
use crate::error::AppError;
use crate::studio::Studio;

#[derive(Default)]
struct GenerateForm {
    image: Option<FileField>,
    style: Option<String>,
    prompt: Option<String>,
    duration: Option<String>,
    wait: bool,
}

impl GenerateForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => form.image = Some(FileField::read(field).await?),
                "style" => form.style = Some(field.text().await?),
                "prompt" => form.prompt = Some(field.text().await?),
                "duration" => form.duration = Some(field.text().await?),
                "wait" => form.wait = matches!(field.text().await?.trim(), "true" | "1"),
                _ => debug!(field = %name, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn take_image(&mut self) -> Result<FileField, ValidationError> {
        self.image.take().ok_or(ValidationError::MissingImage)
    }

    fn style(&self) -> Result<StylePreset, ValidationError> {
        self.style.as_deref().unwrap_or_default().parse()
    }
}

pub async fn submit_image(
    State(studio): State<Arc<Studio>>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut form = GenerateForm::read(multipart).await?;
    let image = form.take_image()?;
    let style = form.style()?;

    let request = GenerationRequest::image(style, form.prompt.take());
    run(&studio, request, image, form.wait).await
}

pub async fn submit_video(
    State(studio): State<Arc<Studio>>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut form = GenerateForm::read(multipart).await?;
    let image = form.take_image()?;
    let style = form.style()?;
    let duration = parse_duration(form.duration.as_deref())?;

    let request = GenerationRequest::video(style, form.prompt.take(), duration.into())?;
    run(&studio, request, image, form.wait).await
}

async fn run(
    studio: &Studio,
    request: GenerationRequest,
    image: FileField,
    wait: bool,
) -> Result<Json<SubmitResponse>, AppError> {
    let upload = image.into_upload()?;
    let kind = request.kind;

    info!(
        kind = kind.as_str(),
        style = %request.style,
        duration = ?request.duration,
        has_prompt = request.prompt.is_some(),
        wait,
        "starting generation"
    );

    if wait {
        let result = studio.generate(request, upload).await?;
        return Ok(Json(SubmitResponse {
            success: true,
            run_id: result.job_id,
            message: format!("{} generation completed", kind.as_str()),
            outputs: Some(result.outputs),
        }));
    }

    let run_id = studio.submit(request, upload).await?;
    Ok(Json(SubmitResponse {
        success: true,
        run_id,
        message: format!("{} generation request submitted successfully", kind.as_str()),
        outputs: None,
    }))
}
