use serde::{Deserialize, Serialize};

use crate::domain::{
    optional_string_or_number, require, string_or_number, DomainError, Filter, NoAction,
    Payload, Resource, Simulated, SortValue,
};

/// A restaurant location as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub description: String,
    /// `"1"` is active, anything else inactive.
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lc_url: Option<String>,
    #[serde(default)]
    pub lc_number: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub description: String,
    pub image_url: String,
    pub is_active: bool,
    pub lc_number: String,
    pub lc_url: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationDraft {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub description: String,
    pub image_url: String,
    pub is_active: bool,
    pub lc_number: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub lc_number: Option<String>,
}

/// Sparse wire body for updates.
#[derive(Debug, Default, Serialize)]
struct LocationPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    street: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lc_number: Option<&'a str>,
}

pub(crate) fn status_flag(active: bool) -> &'static str {
    if active {
        "1"
    } else {
        "0"
    }
}

fn coordinates_from_wire(latitude: Option<&str>, longitude: Option<&str>) -> Option<Coordinates> {
    let latitude = latitude?.trim().parse().ok()?;
    let longitude = longitude?.trim().parse().ok()?;
    Some(Coordinates {
        latitude,
        longitude,
    })
}

impl Resource for Location {
    type Wire = LocationWire;
    type Draft = LocationDraft;
    type Changes = LocationChanges;
    type Action = NoAction;

    const NAME: &'static str = "locations";
    const ENDPOINT: &'static str = "/api/v1/locations";
    const LIST_ENDPOINT: &'static str = "/api/v1/admin/locations";
    const SORT_KEYS: &'static [&'static str] = &["name", "city", "state", "createdAt", "created_at", "date", "updatedAt", "updated_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: LocationWire) -> Self {
        let coordinates = coordinates_from_wire(wire.latitude.as_deref(), wire.longitude.as_deref());
        Self {
            id: wire.id,
            name: wire.name,
            address: wire.street,
            city: wire.city,
            state: wire.state,
            zip_code: wire.zip,
            description: wire.description,
            image_url: wire.image_url,
            is_active: wire.status.as_deref() == Some("1"),
            lc_number: wire.lc_number.unwrap_or_default(),
            lc_url: wire.lc_url,
            coordinates,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }

    fn to_wire(&self) -> LocationWire {
        LocationWire {
            id: self.id.clone(),
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            street: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip_code.clone(),
            description: self.description.clone(),
            status: Some(status_flag(self.is_active).to_string()),
            latitude: self.coordinates.map(|c| c.latitude.to_string()),
            longitude: self.coordinates.map(|c| c.longitude.to_string()),
            lc_url: self.lc_url.clone(),
            lc_number: Some(self.lc_number.clone()),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    fn validate_draft(draft: &LocationDraft) -> Result<(), DomainError> {
        require("name", &draft.name)?;
        if let Some(c) = draft.coordinates {
            if !(-90.0..=90.0).contains(&c.latitude) || !(-180.0..=180.0).contains(&c.longitude) {
                return Err(DomainError::validation("coordinates are out of range"));
            }
        }
        Ok(())
    }

    fn validate_changes(changes: &LocationChanges) -> Result<(), DomainError> {
        match &changes.name {
            Some(name) => require("name", name),
            None => Ok(()),
        }
    }

    fn draft_payload(draft: &LocationDraft) -> Payload {
        Payload::json(&serde_json::json!({
            "name": draft.name,
            "street": draft.address,
            "city": draft.city,
            "state": draft.state,
            "zip": draft.zip_code,
            "description": draft.description,
            "image_url": draft.image_url,
            "status": status_flag(draft.is_active),
            "lc_number": draft.lc_number,
            "latitude": draft.coordinates.map(|c| c.latitude.to_string()),
            "longitude": draft.coordinates.map(|c| c.longitude.to_string()),
        }))
    }

    fn changes_payload(changes: &LocationChanges) -> Payload {
        Payload::json(&LocationPatch {
            name: changes.name.as_deref(),
            street: changes.address.as_deref(),
            city: changes.city.as_deref(),
            state: changes.state.as_deref(),
            zip: changes.zip_code.as_deref(),
            description: changes.description.as_deref(),
            image_url: changes.image_url.as_deref(),
            status: changes.is_active.map(status_flag),
            lc_number: changes.lc_number.as_deref(),
        })
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.search_matches(&[&self.name, &self.city, &self.state])
            && Filter::equals(&filter.state, &self.state)
            && filter.is_active.map_or(true, |active| self.is_active == active)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => Some(SortValue::text(&self.name)),
            "city" => Some(SortValue::text(&self.city)),
            "state" => Some(SortValue::text(&self.state)),
            "createdAt" | "created_at" | "date" => Some(SortValue::date(&self.created_at)),
            "updatedAt" | "updated_at" => Some(SortValue::date(&self.updated_at)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Name", "Address", "City", "State", "ZIP Code", "Status"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.address.clone(),
            self.city.clone(),
            self.state.clone(),
            self.zip_code.clone(),
            if self.is_active { "Active" } else { "Inactive" }.to_string(),
        ]
    }
}

impl Simulated for Location {
    fn wire_id(wire: &LocationWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &LocationDraft, now: &str) -> LocationWire {
        LocationWire {
            id,
            name: draft.name.clone(),
            image_url: draft.image_url.clone(),
            street: draft.address.clone(),
            city: draft.city.clone(),
            state: draft.state.clone(),
            zip: draft.zip_code.clone(),
            description: draft.description.clone(),
            status: Some(status_flag(draft.is_active).to_string()),
            latitude: draft.coordinates.map(|c| c.latitude.to_string()),
            longitude: draft.coordinates.map(|c| c.longitude.to_string()),
            lc_url: None,
            lc_number: Some(draft.lc_number.clone()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    fn apply_changes(wire: &mut LocationWire, changes: &LocationChanges, now: &str) {
        if let Some(v) = &changes.name {
            wire.name = v.clone();
        }
        if let Some(v) = &changes.address {
            wire.street = v.clone();
        }
        if let Some(v) = &changes.city {
            wire.city = v.clone();
        }
        if let Some(v) = &changes.state {
            wire.state = v.clone();
        }
        if let Some(v) = &changes.zip_code {
            wire.zip = v.clone();
        }
        if let Some(v) = &changes.description {
            wire.description = v.clone();
        }
        if let Some(v) = &changes.image_url {
            wire.image_url = v.clone();
        }
        if let Some(v) = changes.is_active {
            wire.status = Some(status_flag(v).to_string());
        }
        if let Some(v) = &changes.lc_number {
            wire.lc_number = Some(v.clone());
        }
        wire.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wire() -> LocationWire {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Downtown",
            "image_url": "https://img/7.jpg",
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zip": "62701",
            "description": "Flagship",
            "status": "1",
            "latitude": "39.7817",
            "longitude": "-89.6501",
            "lc_number": "LC-7",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_location_mapping() {
        let local = Location::from_wire(sample_wire());
        assert_eq!(local.id, "7");
        assert_eq!(local.address, "1 Main St");
        assert_eq!(local.zip_code, "62701");
        assert!(local.is_active);
        assert_eq!(
            local.coordinates,
            Some(Coordinates {
                latitude: 39.7817,
                longitude: -89.6501
            })
        );

        let again = Location::from_wire(local.to_wire());
        assert_eq!(again, local);
    }

    #[test]
    fn test_inactive_and_numeric_status() {
        let mut raw = serde_json::to_value(sample_wire()).unwrap();
        raw["status"] = serde_json::json!(0);
        let local = Location::from_wire(serde_json::from_value(raw).unwrap());
        assert!(!local.is_active);
        assert_eq!(local.to_wire().status.as_deref(), Some("0"));
    }

    #[test]
    fn test_changes_payload_is_sparse() {
        let changes = LocationChanges {
            address: Some("2 Side St".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let Payload::Json(body) = Location::changes_payload(&changes) else {
            panic!("expected json payload");
        };
        assert_eq!(body, serde_json::json!({"street": "2 Side St", "status": "0"}));
    }
}
