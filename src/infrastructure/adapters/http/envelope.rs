//! Response shapes the backend wraps records in.

use serde::Deserialize;

use crate::domain::{Filter, PageMeta};

/// A collection response: a bare array, a Laravel paginator, or `{data: [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<W> {
    Bare(Vec<W>),
    Paginated {
        data: Vec<W>,
        total: u64,
        current_page: u32,
        per_page: u32,
        #[serde(default)]
        last_page: Option<u32>,
    },
    Wrapped {
        data: Vec<W>,
    },
}

impl<W> ListEnvelope<W> {
    /// Records plus pagination. Only the paginator carries server totals.
    pub(crate) fn into_parts(self, filter: &Filter) -> (Vec<W>, Option<PageMeta>) {
        match self {
            ListEnvelope::Bare(records) | ListEnvelope::Wrapped { data: records } => {
                (records, None)
            }
            ListEnvelope::Paginated {
                data,
                total,
                current_page,
                per_page,
                last_page,
            } => {
                let per_page = if per_page == 0 {
                    filter.per_page.unwrap_or(crate::domain::DEFAULT_PER_PAGE)
                } else {
                    per_page
                };
                let total_pages =
                    last_page.unwrap_or_else(|| total.div_ceil(per_page.max(1) as u64) as u32);
                let meta = PageMeta {
                    total,
                    page: current_page.max(1),
                    per_page,
                    total_pages,
                };
                (data, Some(meta))
            }
        }
    }
}

/// A single-record response: `{data: {...}}`, `{user: {...}}`, or the record itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemEnvelope<W> {
    Keyed {
        #[serde(alias = "user")]
        data: W,
    },
    Bare(W),
}

impl<W> ItemEnvelope<W> {
    pub(crate) fn into_inner(self) -> W {
        match self {
            ItemEnvelope::Keyed { data } | ItemEnvelope::Bare(data) => data,
        }
    }
}

/// Error body sent with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InquiryWire, UserWire};

    #[test]
    fn test_list_shapes() {
        let bare: ListEnvelope<InquiryWire> =
            serde_json::from_str(r#"[{"id": 1, "name": "Franchise"}]"#).unwrap();
        let (records, meta) = bare.into_parts(&Filter::new());
        assert_eq!(records[0].id, "1");
        assert!(meta.is_none());

        let wrapped: ListEnvelope<InquiryWire> =
            serde_json::from_str(r#"{"data": [{"id": "7", "name": "Lease"}]}"#).unwrap();
        let (records, meta) = wrapped.into_parts(&Filter::new());
        assert_eq!(records[0].id, "7");
        assert!(meta.is_none());
    }

    #[test]
    fn test_laravel_paginator() {
        let body = r#"{
            "current_page": 2,
            "data": [{"id": 11, "name": "Ana", "email": "ana@pne.test"}],
            "per_page": 10,
            "total": 11,
            "last_page": 2
        }"#;
        let page: ListEnvelope<UserWire> = serde_json::from_str(body).unwrap();
        let (records, meta) = page.into_parts(&Filter::new());
        assert_eq!(records.len(), 1);
        assert_eq!(
            meta,
            Some(PageMeta {
                total: 11,
                page: 2,
                per_page: 10,
                total_pages: 2
            })
        );
    }

    #[test]
    fn test_item_shapes() {
        let keyed: ItemEnvelope<UserWire> =
            serde_json::from_str(r#"{"user": {"id": 3, "name": "Bo", "email": "bo@pne.test"}}"#)
                .unwrap();
        assert_eq!(keyed.into_inner().id, "3");

        let bare: ItemEnvelope<UserWire> =
            serde_json::from_str(r#"{"id": 4, "name": "Cy", "email": "cy@pne.test"}"#).unwrap();
        assert_eq!(bare.into_inner().name, "Cy");
    }
}
