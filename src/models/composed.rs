use serde::Serialize;

/// Secondary data the composition service attaches on a best-effort basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Enrichment {
    Category,
    Comments,
}

/// A value assembled from several store reads.
///
/// The primary read always succeeded. Secondary reads that failed or came back
/// empty-handed are listed in `missing` instead of failing the whole request,
/// so callers can tell a complete view from a partial one.
#[derive(Debug, Clone, Serialize)]
pub struct Composed<T> {
    #[serde(flatten)]
    pub value: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Enrichment>,
}

impl<T> Composed<T> {
    pub fn complete(value: T) -> Self {
        Self { value, missing: Vec::new() }
    }

    pub fn is_partial(&self) -> bool {
        !self.missing.is_empty()
    }

    pub fn is_missing(&self, enrichment: Enrichment) -> bool {
        self.missing.contains(&enrichment)
    }

    pub(crate) fn mark_missing(&mut self, enrichment: Enrichment) {
        if !self.missing.contains(&enrichment) {
            self.missing.push(enrichment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_complete_serializes_flat() {
        let composed = Composed::complete(Item { id: 3 });
        assert!(!composed.is_partial());
        assert_eq!(serde_json::to_value(&composed).unwrap(), json!({"id": 3}));
    }

    #[test]
    fn test_missing_is_deduplicated_and_reported() {
        let mut composed = Composed::complete(Item { id: 3 });
        composed.mark_missing(Enrichment::Category);
        composed.mark_missing(Enrichment::Category);

        assert!(composed.is_partial());
        assert!(composed.is_missing(Enrichment::Category));
        assert!(!composed.is_missing(Enrichment::Comments));
        assert_eq!(
            serde_json::to_value(&composed).unwrap(),
            json!({"id": 3, "missing": ["category"]})
        );
    }
}
