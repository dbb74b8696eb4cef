use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub message: String,
    pub detail: Option<String>,
}

#[derive(ToSchema)]
pub struct ItemDoc { pub id: i32, pub title: String, pub image_url: String }

#[derive(ToSchema)]
pub struct PointDoc {
    pub id: i32,
    pub image: String,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub uf: String,
}

#[derive(ToSchema)]
pub struct PointViewDoc {
    pub id: i32,
    pub image: String,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub uf: String,
    pub image_url: String,
}

#[derive(ToSchema)]
pub struct ItemTitleDoc { pub title: String }

#[derive(ToSchema)]
pub struct PointDetailDoc {
    pub point: PointViewDoc,
    pub items: Vec<ItemTitleDoc>,
}

#[derive(ToSchema)]
pub struct CreatePointFormDoc {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub uf: String,
    /// Comma-separated item ids
    pub items: String,
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::items::list,
        crate::routes::points::list,
        crate::routes::points::show,
        crate::routes::points::create,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            ItemDoc,
            PointDoc,
            PointViewDoc,
            ItemTitleDoc,
            PointDetailDoc,
            CreatePointFormDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "items"),
        (name = "points")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for p in ["/health", "/items", "/points", "/points/{id}"] {
            assert!(paths.contains(&p), "missing {p}");
        }
    }
}
