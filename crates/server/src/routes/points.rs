use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use service::point::domain::{CreatePoint, PointDetail, PointFilter, PointView};
use tracing::{info, warn};

use crate::{errors::JsonApiError, routes::ServerState};

#[utoipa::path(
    get, path = "/points", tag = "points",
    params(
        ("city" = Option<String>, Query, description = "Exact city name"),
        ("uf" = Option<String>, Query, description = "Exact state code"),
        ("items" = Option<String>, Query, description = "Comma-separated item ids, e.g. 1,2")
    ),
    responses(
        (status = 200, description = "Matching points", body = [crate::openapi::PointViewDoc]),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(filter): Query<PointFilter>) -> Result<Json<Vec<PointView>>, JsonApiError> {
    let points = state.points.list(filter).await?;
    Ok(Json(points))
}

#[utoipa::path(
    get, path = "/points/{id}", tag = "points",
    params(("id" = i32, Path, description = "Point ID")),
    responses(
        (status = 200, description = "Point with item titles", body = crate::openapi::PointDetailDoc),
        (status = 400, description = "Point not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn show(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<PointDetail>, JsonApiError> {
    let detail = state.points.show(&id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    post, path = "/points", tag = "points",
    request_body(content = crate::openapi::CreatePointFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = crate::openapi::PointDoc),
        (status = 400, description = "Malformed form", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Create Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, multipart: Multipart) -> Result<Json<models::point::Model>, JsonApiError> {
    let mut form = PointForm::read(multipart).await?;
    let Some((original_name, bytes)) = form.image.take() else {
        return Err(JsonApiError::bad_request("image is required"));
    };
    // 先校验文本字段，避免为无效请求落盘文件
    let mut input = form.into_input()?;

    let image = state.uploads.save(&original_name, &bytes).await?;
    info!(%image, size = bytes.len(), "point_create_request");
    input.image = image.clone();

    match state.points.create(input).await {
        Ok(created) => Ok(Json(created)),
        Err(e) => {
            warn!(%image, "removing upload of failed point");
            state.uploads.remove(&image).await;
            Err(e.into())
        }
    }
}

/// Raw multipart fields of a registration request.
#[derive(Default)]
struct PointForm {
    fields: HashMap<String, String>,
    image: Option<(String, Vec<u8>)>,
}

impl PointForm {
    async fn read(mut multipart: Multipart) -> Result<Self, JsonApiError> {
        let mut form = PointForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| JsonApiError::bad_request(format!("malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else { continue };
            if name == "image" {
                let original = field.file_name().unwrap_or("image").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("cannot read image: {e}")))?;
                form.image = Some((original, bytes.to_vec()));
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("cannot read field {name}: {e}")))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    fn text(&mut self, name: &str) -> Result<String, JsonApiError> {
        self.fields
            .remove(name)
            .ok_or_else(|| JsonApiError::bad_request(format!("missing field {name}")))
    }

    fn number(&mut self, name: &str) -> Result<f64, JsonApiError> {
        let raw = self.text(name)?;
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| JsonApiError::bad_request(format!("field {name} must be a number")))
    }

    /// Text fields as a `CreatePoint`; `image` is filled in once the upload is stored.
    fn into_input(mut self) -> Result<CreatePoint, JsonApiError> {
        Ok(CreatePoint {
            name: self.text("name")?,
            email: self.text("email")?,
            whatsapp: self.text("whatsapp")?,
            latitude: self.number("latitude")?,
            longitude: self.number("longitude")?,
            city: self.text("city")?,
            uf: self.text("uf")?,
            items: self.text("items")?,
            image: String::new(),
        })
    }
}
