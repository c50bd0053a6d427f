//! Lead search over the grounded generative service.

use skopus_core::{Lead, LocationDescriptor};

use crate::client::{GenAiClient, GenerateOptions};
use crate::error::GenAiError;
use crate::prompts;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Fetches pages of leads with search grounding and a JSON response schema.
#[derive(Debug, Clone)]
pub struct LeadSearchService {
    client: GenAiClient,
    model: String,
}

impl LeadSearchService {
    #[must_use]
    pub fn new(client: GenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Requests one page of leads for `niche` around `location`.
    ///
    /// Leads are returned in the order the service produced them.
    ///
    /// # Errors
    ///
    /// Propagates [`GenAiClient::generate`] errors, and returns
    /// [`GenAiError::Deserialize`] when the answer is not a JSON array.
    pub async fn search(
        &self,
        niche: &str,
        location: &LocationDescriptor,
        page: u32,
    ) -> Result<Vec<Lead>, GenAiError> {
        let prompt = prompts::lead_search(niche, location, page);
        let options = GenerateOptions {
            response_schema: Some(prompts::lead_schema()),
            search_grounding: true,
            ..GenerateOptions::default()
        };

        let text = self.client.generate(&self.model, &prompt, &options).await?;
        let leads = parse_leads(&text)?;
        tracing::info!(niche, page, count = leads.len(), "lead page received");
        Ok(leads)
    }
}

/// Parses the service's answer into leads.
///
/// A ```` ```json ```` fenced block, when present, is parsed instead of the
/// whole text. Items that do not decode as a [`Lead`] are skipped; ratings
/// outside 0.0–5.0 are cleared.
///
/// # Errors
///
/// Returns [`GenAiError::Deserialize`] if the payload is not a JSON array.
pub fn parse_leads(text: &str) -> Result<Vec<Lead>, GenAiError> {
    let body = fenced_body(text).unwrap_or(text).trim();
    let items: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| GenAiError::Deserialize {
            context: "lead page".to_owned(),
            source: e,
        })?;

    let total = items.len();
    let leads: Vec<Lead> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Lead>(item).ok())
        .map(|mut lead| {
            lead.rating = lead.valid_rating();
            lead
        })
        .collect();

    let skipped = total - leads.len();
    if skipped > 0 {
        tracing::warn!(skipped, total, "skipped malformed lead records");
    }
    Ok(leads)
}

fn fenced_body(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    Some(&rest[..end])
}
