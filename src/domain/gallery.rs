use serde::{de, Deserialize, Deserializer, Serialize};

use crate::domain::{
    string_or_number, DomainError, Filter, FormPart, InsertPosition, NoAction, Payload, Resource,
    Simulated, SortValue, Upload,
};

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable size with one decimal, e.g. `"1.2 MB"`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

/// Inverse of [`format_size`], up to the precision of the display string.
pub fn parse_size(display: &str) -> Option<u64> {
    let mut parts = display.split_whitespace();
    let value: f64 = parts.next()?.parse().ok()?;
    let factor = match parts.next().unwrap_or("B") {
        "B" => 1.0,
        "KB" => 1024.0,
        "MB" => 1024.0 * 1024.0,
        "GB" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    if value < 0.0 {
        return None;
    }
    Some((value * factor).round() as u64)
}

/// Bytes from either a number or a display string such as `"1.2 MB"`.
fn size_in_bytes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Bytes(u64),
        Float(f64),
        Display(String),
    }

    match RawSize::deserialize(deserializer)? {
        RawSize::Bytes(n) => Ok(n),
        RawSize::Float(n) if n >= 0.0 => Ok(n.round() as u64),
        RawSize::Float(n) => Err(de::Error::custom(format!("invalid size: {}", n))),
        RawSize::Display(text) => match text.trim().parse::<u64>() {
            Ok(n) => Ok(n),
            Err(_) => parse_size(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid size: {}", text))),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImageWire {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub thumbnail_path: String,
    #[serde(default)]
    pub url: String,
    /// Bytes.
    #[serde(default, deserialize_with = "size_in_bytes")]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Nested form some responses use instead of `width` / `height`.
    #[serde(default, skip_serializing)]
    pub dimensions: Option<Dimensions>,
    #[serde(default, alias = "created_at", alias = "uploadedAt")]
    pub uploaded_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: String,
    pub name: String,
    pub file_path: String,
    pub thumbnail_path: String,
    pub url: String,
    /// Display form of `size_bytes`.
    pub size: String,
    pub size_bytes: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub dimensions: Option<Dimensions>,
    pub uploaded_at: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryUpload {
    pub file: Upload,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Uploading,
    Completed,
    Error,
}

/// Progress of one upload, keyed by a client-generated upload id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub id: String,
    pub progress: u8,
    pub file_name: String,
    pub status: UploadState,
    pub error: Option<String>,
}

/// Rejects files the media endpoint would refuse, before any bytes are sent.
pub fn validate_upload(file: &Upload) -> Result<(), DomainError> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime_type.as_str()) {
        return Err(DomainError::validation(format!(
            "unsupported file type {}; expected one of {}",
            file.mime_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }
    if file.bytes.len() as u64 > MAX_UPLOAD_BYTES {
        return Err(DomainError::validation(format!(
            "{} is {}, the limit is {}",
            file.file_name,
            format_size(file.bytes.len() as u64),
            format_size(MAX_UPLOAD_BYTES)
        )));
    }
    Ok(())
}

impl Resource for GalleryImage {
    type Wire = GalleryImageWire;
    type Draft = GalleryUpload;
    type Changes = GalleryChanges;
    type Action = NoAction;

    const NAME: &'static str = "gallery";
    const ENDPOINT: &'static str = "/api/v1/media";
    const SORT_KEYS: &'static [&'static str] = &["name", "date", "uploadedAt", "size"];
    const INSERT: InsertPosition = InsertPosition::Prepend;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_wire(wire: GalleryImageWire) -> Self {
        let dimensions = match (wire.width, wire.height) {
            (Some(width), Some(height)) => Some(Dimensions { width, height }),
            _ => wire.dimensions,
        };
        Self {
            id: wire.id,
            name: wire.name,
            file_path: wire.file_path,
            thumbnail_path: wire.thumbnail_path,
            url: wire.url,
            size: format_size(wire.size),
            size_bytes: wire.size,
            mime_type: wire.mime_type,
            dimensions,
            uploaded_at: wire.uploaded_at,
            tags: wire.tags,
        }
    }

    fn to_wire(&self) -> GalleryImageWire {
        // An edited display size wins over the cached byte count.
        let size = if format_size(self.size_bytes) == self.size {
            self.size_bytes
        } else {
            parse_size(&self.size).unwrap_or(0)
        };
        GalleryImageWire {
            id: self.id.clone(),
            name: self.name.clone(),
            file_path: self.file_path.clone(),
            thumbnail_path: self.thumbnail_path.clone(),
            url: self.url.clone(),
            size,
            mime_type: self.mime_type.clone(),
            width: self.dimensions.map(|d| d.width),
            height: self.dimensions.map(|d| d.height),
            dimensions: None,
            uploaded_at: self.uploaded_at.clone(),
            tags: self.tags.clone(),
        }
    }

    fn validate_draft(draft: &GalleryUpload) -> Result<(), DomainError> {
        validate_upload(&draft.file)
    }

    fn draft_payload(draft: &GalleryUpload) -> Payload {
        let mut parts = vec![FormPart::file("file", draft.file.clone())];
        if !draft.tags.is_empty() {
            parts.push(FormPart::text("tags", draft.tags.join(",")));
        }
        Payload::Multipart(parts)
    }

    fn changes_payload(changes: &GalleryChanges) -> Payload {
        Payload::json(changes)
    }

    fn matches(&self, filter: &Filter) -> bool {
        let search_hit = filter.search_matches(&[&self.name])
            || self.tags.iter().any(|t| filter.search_matches(&[t]));
        let tag_hit = filter.tags.is_empty() || filter.tags.iter().any(|t| self.tags.contains(t));
        search_hit && tag_hit && Filter::equals(&filter.kind, &self.mime_type)
    }

    fn sort_value(&self, key: &str) -> Option<SortValue> {
        match key {
            "name" => Some(SortValue::text(&self.name)),
            "date" | "uploadedAt" => Some(SortValue::date(&self.uploaded_at)),
            "size" => Some(SortValue::Number(self.size_bytes as f64)),
            _ => None,
        }
    }

    fn export_headers() -> &'static [&'static str] {
        &["Name", "Type", "Size", "Uploaded", "Tags", "URL"]
    }

    fn export_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.mime_type.clone(),
            self.size.clone(),
            self.uploaded_at.clone(),
            self.tags.join(";"),
            self.url.clone(),
        ]
    }
}

impl Simulated for GalleryImage {
    fn wire_id(wire: &GalleryImageWire) -> &str {
        &wire.id
    }

    fn wire_from_draft(id: String, draft: &GalleryUpload, now: &str) -> GalleryImageWire {
        let path = format!("/storage/media/{}", draft.file.file_name);
        GalleryImageWire {
            id,
            name: draft.file.file_name.clone(),
            thumbnail_path: path.clone(),
            url: path.clone(),
            file_path: path,
            size: draft.file.bytes.len() as u64,
            mime_type: draft.file.mime_type.clone(),
            width: None,
            height: None,
            dimensions: None,
            uploaded_at: now.to_string(),
            tags: draft.tags.clone(),
        }
    }

    fn apply_changes(wire: &mut GalleryImageWire, changes: &GalleryChanges, _now: &str) {
        if let Some(v) = &changes.name {
            wire.name = v.clone();
        }
        if let Some(v) = &changes.tags {
            wire.tags = v.clone();
        }
    }
}
