use serde::Deserialize;

/// One ranked organic entry from a Serper search response.
///
/// Serper includes more fields (snippet, date, sitelinks); only the ones the
/// pipeline consumes are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
    pub link: String,
    /// 1-based rank as assigned by the provider.
    pub position: i32,
}

/// The subset of a Serper `/search` response body the pipeline consumes.
///
/// An absent `organic` array is a valid zero-result response, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct SerperResponse {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
    #[serde(default)]
    pub credits: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_full_response() {
        let body = serde_json::json!({
            "searchParameters": { "q": "shoes", "gl": "gb" },
            "organic": [
                { "title": "Shoe Shop", "link": "https://shoes.example.com", "position": 1 },
                { "link": "https://boots.example.com", "position": 2 }
            ],
            "credits": 1
        });

        let response: SerperResponse = serde_json::from_value(body).expect("deserialize");
        assert_eq!(response.organic.len(), 2);
        assert_eq!(response.organic[0].position, 1);
        assert_eq!(response.organic[0].title.as_deref(), Some("Shoe Shop"));
        assert!(response.organic[1].title.is_none());
        assert_eq!(response.credits, Some(1));
    }

    #[test]
    fn missing_organic_deserializes_to_empty_vec() {
        let body = serde_json::json!({ "searchParameters": { "q": "obscure term" } });
        let response: SerperResponse = serde_json::from_value(body).expect("deserialize");
        assert!(response.organic.is_empty());
        assert!(response.credits.is_none());
    }
}
