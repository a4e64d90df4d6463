//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use math_mentor_core::domain::{ChatMessage, Sender};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_image_handler,
        solve_math_handler,
        math_tutor_handler,
    ),
    components(
        schemas(
            UploadImageResponse,
            SolveRequest,
            SolveResponse,
            SolvedProblemBody,
            TutorRequest,
            ChatTurn,
            TutorResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "Math Mentor API", description = "API endpoints for the handwritten math solver and tutor.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully storing an uploaded image.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    image_key: String,
}

/// A request to transcribe and solve a previously uploaded image.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    image_key: String,
}

/// The successful result of a solve request.
#[derive(Serialize, ToSchema)]
pub struct SolveResponse {
    success: bool,
    result: SolvedProblemBody,
}

/// The recognized problem and its worked solution. Both fields are "N/A"
/// when the model could not read the image.
#[derive(Serialize, ToSchema)]
pub struct SolvedProblemBody {
    problem: String,
    solution: String,
}

/// One tutor chat turn: the new message plus everything needed to rebuild
/// the conversation, since the server holds no session state.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TutorRequest {
    user_message: String,
    problem: String,
    solution: String,
    conversation_history: Vec<ChatTurn>,
}

/// One prior message of the transcript, as the browser stores it.
#[derive(Deserialize, ToSchema)]
pub struct ChatTurn {
    sender: String,
    text: String,
}

/// The tutor's reply to the latest user message.
#[derive(Serialize, ToSchema)]
pub struct TutorResponse {
    response: String,
}

/// A generic error body; details stay in the server log.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Image MIME types the upload endpoint accepts, with the file extension
/// used when generating the storage key.
const ACCEPTED_IMAGE_TYPES: [(&str, &str); 3] =
    [("image/png", "png"), ("image/jpeg", "jpg"), ("image/webp", "webp")];

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload one image of a handwritten math problem.
///
/// Accepts a multipart/form-data request with a single image file part and
/// stores it in the blob store under a freshly generated key. The returned
/// key is what the solve endpoint expects.
#[utoipa::path(
    post,
    path = "/api/images",
    request_body(content_type = "multipart/form-data", description = "The image to upload."),
    responses(
        (status = 201, description = "Image stored successfully", body = UploadImageResponse),
        (status = 400, description = "Bad request (e.g., missing file or unsupported type)", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_image_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            error!("Failed to read multipart data: {}", e);
            error_response(StatusCode::BAD_REQUEST, "Could not read the uploaded file")
        })?
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "Multipart form must include an image file",
            )
        })?;

    let content_type = field.content_type().unwrap_or_default().to_string();
    let extension = ACCEPTED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                "Only PNG, JPEG, and WebP images are accepted",
            )
        })?;

    let data = field.bytes().await.map_err(|e| {
        error!("Failed to read file bytes: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Could not read the uploaded file")
    })?;

    let image_key = format!("{}.{}", Uuid::new_v4(), extension);
    app_state
        .storage
        .upload(&image_key, &content_type, data.to_vec())
        .await
        .map_err(|e| {
            error!("Failed to upload image '{}': {:?}", image_key, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store image")
        })?;

    Ok((StatusCode::CREATED, Json(UploadImageResponse { image_key })))
}

/// Transcribe and solve a previously uploaded image.
///
/// Resolves the key to a public URL, asks the vision model to extract and
/// solve the problem, records the result, and returns it.
#[utoipa::path(
    post,
    path = "/api/solve-math",
    request_body = SolveRequest,
    responses(
        (status = 200, description = "Problem solved and recorded", body = SolveResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn solve_math_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<SolveRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    match app_state.submission.submit(&req.image_key).await {
        Ok(solved) => Ok(Json(SolveResponse {
            success: true,
            result: SolvedProblemBody {
                problem: solved.problem,
                solution: solved.solution,
            },
        })),
        Err(e) => {
            error!("Error processing math problem '{}': {:?}", req.image_key, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process image",
            ))
        }
    }
}

/// Relay one chat turn to the math tutor.
///
/// The browser owns the conversation; every call carries the full history
/// alongside the problem and its known solution.
#[utoipa::path(
    post,
    path = "/api/math-tutor",
    request_body = TutorRequest,
    responses(
        (status = 200, description = "Tutor reply", body = TutorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn math_tutor_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<TutorRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let history: Vec<ChatMessage> = req
        .conversation_history
        .into_iter()
        .map(|turn| ChatMessage {
            sender: if turn.sender == "user" {
                Sender::User
            } else {
                Sender::Bot
            },
            text: turn.text,
        })
        .collect();

    match app_state
        .tutor
        .reply(&req.user_message, &req.problem, &req.solution, &history)
        .await
    {
        Ok(response) => Ok(Json(TutorResponse { response })),
        Err(e) => {
            error!("Error in math tutor relay: {:?}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process request",
            ))
        }
    }
}
