use serde::{Deserialize, Serialize};

use models::point;

/// One token of a comma-separated item list after numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Id(i32),
    /// A token that is not a number. It never matches a stored item.
    Unparsable,
}

/// Item ids parsed from the `items` request field, deduplicated in input order.
///
/// Parsing is tolerant: every token is trimmed, an empty token coerces to `0`,
/// integral decimals such as `"2.0"` coerce to their integer, and anything else
/// becomes [`ItemRef::Unparsable`] instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSelection(Vec<ItemRef>);

impl ItemSelection {
    pub fn parse(raw: &str) -> Self {
        let mut refs: Vec<ItemRef> = Vec::new();
        for token in raw.split(',') {
            let r = coerce(token.trim());
            if !refs.contains(&r) {
                refs.push(r);
            }
        }
        Self(refs)
    }

    pub fn refs(&self) -> &[ItemRef] { &self.0 }

    /// Ids that can match a stored item; unparsable tokens are dropped.
    pub fn matchable_ids(&self) -> Vec<i32> {
        self.0
            .iter()
            .filter_map(|r| match r {
                ItemRef::Id(id) => Some(*id),
                ItemRef::Unparsable => None,
            })
            .collect()
    }

    pub fn has_unparsable(&self) -> bool { self.0.contains(&ItemRef::Unparsable) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

fn coerce(token: &str) -> ItemRef {
    if token.is_empty() {
        return ItemRef::Id(0);
    }
    if let Ok(id) = token.parse::<i32>() {
        return ItemRef::Id(id);
    }
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 => ItemRef::Id(v as i32),
        _ => ItemRef::Unparsable,
    }
}

/// Path ids coerce the same way; anything unparsable simply finds nothing.
pub fn parse_point_id(raw: &str) -> Option<i32> {
    match coerce(raw.trim()) {
        ItemRef::Id(id) if !raw.trim().is_empty() => Some(id),
        _ => None,
    }
}

/// Query string of `GET /points`. Absent fields match nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointFilter {
    pub city: Option<String>,
    pub uf: Option<String>,
    pub items: Option<String>,
}

/// Fields of a registration request once the image has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePoint {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub uf: String,
    /// Comma-separated item ids, e.g. `"1,2,6"`.
    pub items: String,
    /// Filename produced by the upload store.
    pub image: String,
}

impl CreatePoint {
    pub fn split(self) -> (point::NewPoint, ItemSelection) {
        let items = ItemSelection::parse(&self.items);
        let new = point::NewPoint {
            image: self.image,
            name: self.name,
            email: self.email,
            whatsapp: self.whatsapp,
            latitude: self.latitude,
            longitude: self.longitude,
            city: self.city,
            uf: self.uf,
        };
        (new, items)
    }
}

/// A point as returned to clients, with its image rewritten to a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointView {
    #[serde(flatten)]
    pub point: point::Model,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTitle {
    pub title: String,
}

/// Body of `GET /points/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointDetail {
    pub point: PointView,
    pub items: Vec<ItemTitle>,
}
