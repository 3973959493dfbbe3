use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BehaviorError;
use crate::fetcher::FragmentFetcher;
use crate::router::MatchedRoute;
use crate::shell::Document;

/// What a page behavior gets to work with once its content is in the document.
pub struct PageContext<'a> {
    pub matched: &'a MatchedRoute,
    pub document: &'a dyn Document,
    pub fetcher: &'a dyn FragmentFetcher,
}

/// PageBehavior
///
/// Page-specific logic attached to a route at registration time. Runs after
/// the route's content has been swapped in; a failure is logged and leaves
/// the rendered content in place.
#[async_trait]
pub trait PageBehavior: Send + Sync {
    fn name(&self) -> &str;
    async fn activate(&self, page: &PageContext<'_>) -> Result<(), BehaviorError>;
}

pub type BehaviorState = Arc<dyn PageBehavior>;

/// ApiDataBehavior
///
/// Loads the record behind a detail page (`/blogs/:id` -> `/api/v1/blogs/{id}`)
/// and embeds it as a JSON data island for the page's client-side widgets.
pub struct ApiDataBehavior {
    name: String,
    api_base_url: String,
    endpoint: String,
    data_id: String,
}

impl ApiDataBehavior {
    /// `endpoint` may reference route params as `{name}`.
    pub fn new(api_base_url: &str, endpoint: &str) -> Self {
        Self {
            name: format!("api-data:{endpoint}"),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            endpoint: endpoint.to_string(),
            data_id: "page-data".to_string(),
        }
    }

    pub fn with_data_id(mut self, data_id: &str) -> Self {
        self.data_id = data_id.to_string();
        self
    }

    pub fn into_state(self) -> BehaviorState {
        Arc::new(self)
    }

    /// Substitutes `{param}` placeholders with the matched route's params.
    fn resolve_endpoint(&self, matched: &MatchedRoute) -> Result<String, BehaviorError> {
        let mut resolved = String::with_capacity(self.endpoint.len());
        let mut rest = self.endpoint.as_str();

        while let Some(open) = rest.find('{') {
            resolved.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| BehaviorError::MissingParam(after.to_string()))?;
            let name = &after[..close];
            let value = matched
                .param(name)
                .ok_or_else(|| BehaviorError::MissingParam(name.to_string()))?;
            resolved.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }
        resolved.push_str(rest);

        Ok(format!("{}{}", self.api_base_url, resolved))
    }
}

#[async_trait]
impl PageBehavior for ApiDataBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    async fn activate(&self, page: &PageContext<'_>) -> Result<(), BehaviorError> {
        let endpoint = self.resolve_endpoint(page.matched)?;
        let body = page.fetcher.fetch_text(&endpoint).await?;

        let payload: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| BehaviorError::InvalidPayload {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        // `</` would terminate the script element early.
        let json = payload.to_string().replace("</", "<\\/");
        page.document.append_content(&format!(
            r#"<script type="application/json" id="{}">{}</script>"#,
            self.data_id, json
        ));

        tracing::debug!(behavior = %self.name, %endpoint, "page data embedded");
        Ok(())
    }
}
