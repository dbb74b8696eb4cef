use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::point;

use super::domain::{parse_point_id, CreatePoint, ItemSelection, ItemTitle, PointDetail, PointFilter, PointView};
use super::repository::PointRepository;
use crate::errors::ServiceError;
use crate::image_url::ImageUrls;

/// Collection point business service independent of web framework
pub struct PointService<R: PointRepository> {
    repo: Arc<R>,
    urls: ImageUrls,
}

impl<R: PointRepository> PointService<R> {
    pub fn new(repo: Arc<R>, urls: ImageUrls) -> Self { Self { repo, urls } }

    pub fn urls(&self) -> &ImageUrls { &self.urls }

    /// Points in the given city and state that accept at least one of the items.
    ///
    /// # Examples
    /// ```
    /// use service::point::{PointService, domain::{CreatePoint, PointFilter}, repository::mock::MockPointRepository};
    /// use service::image_url::ImageUrls;
    /// use std::sync::Arc;
    /// let svc = PointService::new(Arc::new(MockPointRepository::default()), ImageUrls::new("http://localhost:3333"));
    /// let input = CreatePoint {
    ///     name: "EcoPonto A".into(), email: "a@b.com".into(), whatsapp: "41999990000".into(),
    ///     latitude: -25.4, longitude: -49.2, city: "Curitiba".into(), uf: "PR".into(),
    ///     items: "1,2".into(), image: "photo.jpg".into(),
    /// };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// let filter = PointFilter { city: Some("Curitiba".into()), uf: Some("PR".into()), items: Some("2".into()) };
    /// let found = tokio_test::block_on(svc.list(filter)).unwrap();
    /// assert_eq!(found[0].point.id, created.id);
    /// assert_eq!(found[0].image_url, "http://localhost:3333/uploads/photo.jpg");
    /// ```
    #[instrument(skip(self, filter), fields(city = ?filter.city, uf = ?filter.uf))]
    pub async fn list(&self, filter: PointFilter) -> Result<Vec<PointView>, ServiceError> {
        let (Some(city), Some(uf), Some(items)) = (filter.city, filter.uf, filter.items) else {
            return Ok(Vec::new());
        };
        let ids = ItemSelection::parse(&items).matchable_ids();
        let points = self.repo.list_filtered(&city, &uf, &ids).await?;
        info!(count = points.len(), "points_listed");
        Ok(points.into_iter().map(|p| self.view(p)).collect())
    }

    /// A point with the titles of the items it accepts.
    ///
    /// # Examples
    /// ```
    /// use service::point::{PointService, repository::mock::MockPointRepository};
    /// use service::errors::ServiceError;
    /// use service::image_url::ImageUrls;
    /// use std::sync::Arc;
    /// let svc = PointService::new(Arc::new(MockPointRepository::default()), ImageUrls::new("http://localhost:3333"));
    /// let err = tokio_test::block_on(svc.show("99")).unwrap_err();
    /// assert!(matches!(err, ServiceError::NotFound(_)));
    /// ```
    #[instrument(skip(self))]
    pub async fn show(&self, raw_id: &str) -> Result<PointDetail, ServiceError> {
        let Some(id) = parse_point_id(raw_id) else {
            return Err(ServiceError::not_found("Point"));
        };
        let found = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("Point"))?;
        let titles = self.repo.item_titles(found.id).await?;
        Ok(PointDetail {
            point: self.view(found),
            items: titles.into_iter().map(|title| ItemTitle { title }).collect(),
        })
    }

    /// Persist a point and its item associations atomically.
    /// Failures are returned to the caller; nothing is retried.
    #[instrument(skip(self, input), fields(city = %input.city, uf = %input.uf, items = %input.items))]
    pub async fn create(&self, input: CreatePoint) -> Result<point::Model, ServiceError> {
        let (new, items) = input.split();
        match self.repo.create_with_items(new, &items).await {
            Ok(created) => {
                info!(point_id = created.id, items = items.refs().len(), "point_created");
                Ok(created)
            }
            Err(e) => {
                warn!(error = %e, code = e.code(), "point_create_failed");
                Err(e)
            }
        }
    }

    fn view(&self, point: point::Model) -> PointView {
        let image_url = self.urls.url_for(&point.image);
        PointView { point, image_url }
    }
}
