use async_trait::async_trait;

use models::point;

use super::domain::ItemSelection;
use crate::errors::ServiceError;

/// Persistence seam for collection points.
///
/// `create_with_items` must be all-or-nothing: either the point row and one
/// association per selected item are stored, or nothing is.
#[async_trait]
pub trait PointRepository: Send + Sync {
    async fn list_filtered(&self, city: &str, uf: &str, item_ids: &[i32]) -> Result<Vec<point::Model>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<point::Model>, ServiceError>;
    async fn item_titles(&self, point_id: i32) -> Result<Vec<String>, ServiceError>;
    async fn create_with_items(&self, new: point::NewPoint, items: &ItemSelection) -> Result<point::Model, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use crate::point::domain::ItemRef;

    pub struct MockPointRepository {
        items: BTreeMap<i32, String>,
        points: Mutex<Vec<point::Model>>,
        links: Mutex<Vec<(i32, i32)>>, // (point_id, item_id)
    }

    impl MockPointRepository {
        /// Catalog with ids `1..` mapped to the given titles.
        pub fn with_items(titles: &[&str]) -> Self {
            let items = titles.iter().enumerate().map(|(i, t)| (i as i32 + 1, t.to_string())).collect();
            Self { items, points: Mutex::new(Vec::new()), links: Mutex::new(Vec::new()) }
        }

        pub fn point_count(&self) -> usize { self.points.lock().map(|p| p.len()).unwrap_or_default() }

        pub fn link_count(&self) -> usize { self.links.lock().map(|l| l.len()).unwrap_or_default() }
    }

    impl Default for MockPointRepository {
        fn default() -> Self {
            Self::with_items(&[
                "Lâmpadas",
                "Pilhas e Baterias",
                "Papéis e Papelão",
                "Resíduos Eletrônicos",
                "Resíduos Orgânicos",
                "Óleo de Cozinha",
            ])
        }
    }

    fn poisoned<T>(_: T) -> ServiceError { ServiceError::Db("mock lock poisoned".into()) }

    #[async_trait]
    impl PointRepository for MockPointRepository {
        async fn list_filtered(&self, city: &str, uf: &str, item_ids: &[i32]) -> Result<Vec<point::Model>, ServiceError> {
            let points = self.points.lock().map_err(poisoned)?;
            let links = self.links.lock().map_err(poisoned)?;
            Ok(points
                .iter()
                .filter(|p| p.city == city && p.uf == uf)
                .filter(|p| links.iter().any(|(pid, iid)| *pid == p.id && item_ids.contains(iid)))
                .cloned()
                .collect())
        }

        async fn get(&self, id: i32) -> Result<Option<point::Model>, ServiceError> {
            let points = self.points.lock().map_err(poisoned)?;
            Ok(points.iter().find(|p| p.id == id).cloned())
        }

        async fn item_titles(&self, point_id: i32) -> Result<Vec<String>, ServiceError> {
            let links = self.links.lock().map_err(poisoned)?;
            let mut ids: Vec<i32> = links.iter().filter(|(pid, _)| *pid == point_id).map(|(_, iid)| *iid).collect();
            ids.sort_unstable();
            Ok(ids.iter().filter_map(|id| self.items.get(id).cloned()).collect())
        }

        async fn create_with_items(&self, new: point::NewPoint, items: &ItemSelection) -> Result<point::Model, ServiceError> {
            // 先完整校验再写入，保证全有或全无
            for r in items.refs() {
                match r {
                    ItemRef::Id(id) if self.items.contains_key(id) => {}
                    ItemRef::Id(id) => return Err(ServiceError::TransactionFailure(format!("item {id} does not exist"))),
                    ItemRef::Unparsable => return Err(ServiceError::TransactionFailure("item list contains a non-numeric id".into())),
                }
            }
            let mut points = self.points.lock().map_err(poisoned)?;
            let mut links = self.links.lock().map_err(poisoned)?;
            let id = points.iter().map(|p| p.id).max().unwrap_or(0) + 1;
            let model = point::Model {
                id,
                image: new.image,
                name: new.name,
                email: new.email,
                whatsapp: new.whatsapp,
                latitude: new.latitude,
                longitude: new.longitude,
                city: new.city,
                uf: new.uf,
            };
            points.push(model.clone());
            links.extend(items.matchable_ids().into_iter().map(|iid| (id, iid)));
            Ok(model)
        }
    }
}
