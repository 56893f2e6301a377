use serde::{Deserialize, Serialize};

use granary_core::{DomainError, DomainResult, Entity, ValueObject, WarehouseId};

/// A physical storage location with a fixed maximum total quantity.
///
/// Only `capacity` matters to the consistency core. The rest is display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    /// `"latitude,longitude"`, see [`Location::parse`].
    pub location: String,
    /// Maximum total quantity held across all goods. Always positive.
    pub capacity: i64,
    /// Opaque image reference (file name or URL); never interpreted here.
    pub image: String,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        name: impl Into<String>,
        location: impl Into<String>,
        capacity: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        if capacity <= 0 {
            return Err(DomainError::validation("warehouse capacity must be positive"));
        }

        Ok(Self {
            id,
            name,
            location: location.into(),
            capacity,
            image: String::new(),
        })
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn parse_location(&self) -> DomainResult<Location> {
        Location::parse(&self.location)
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Geographic coordinates of a warehouse.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl ValueObject for Location {}

impl Location {
    /// Parse `"lat,lng"` (whitespace around either part is ignored).
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let (lat, lng) = raw
            .split_once(',')
            .ok_or_else(|| DomainError::invalid_location(format!("missing ',' in {raw:?}")))?;

        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| DomainError::invalid_location(format!("bad latitude in {raw:?}")))?;
        let longitude: f64 = lng
            .trim()
            .parse()
            .map_err(|_| DomainError::invalid_location(format!("bad longitude in {raw:?}")))?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::invalid_location(format!(
                "coordinates out of range in {raw:?}"
            )));
        }

        Ok(Self { latitude, longitude })
    }
}
