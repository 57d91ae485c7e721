//! External correlation lookups against Wikidata (structured facts about a
//! name) and the French Wikipedia search index (events around a date).
//!
//! Both lookups fail soft: a transport error, a non-success status or an
//! unexpected response shape all collapse to an empty result list. Zero
//! matches and an unavailable service are deliberately indistinguishable to
//! keep the contract simple. Results are memoized per exact input for the
//! lifetime of the client, so repeated identical queries never go back out.

use std::collections::HashMap;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::models::CorrelationResult;

const WIKIDATA_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";
const WIKIPEDIA_API_ENDPOINT: &str = "https://fr.wikipedia.org/w/api.php";

/// Wikidata rejects requests without a browser-like User-Agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

const NO_DESCRIPTION: &str = "No description available";

/// How many bindings the SPARQL query fetches; callers surface fewer via `limit`.
const SPARQL_FETCH_LIMIT: usize = 90;

/// Conventional number of entity results surfaced to a reader.
pub const DEFAULT_RESULT_LIMIT: usize = 15;

const HIGHLIGHT_OPEN: &str = "<span class=\"searchmatch\">";
const HIGHLIGHT_CLOSE: &str = "</span>";

/// Domain policy: football coverage drowns out everything else in the French
/// search index, so it is excluded outright.
const EXCLUDED_TOPIC: &str = "football";

pub struct CorrelationClient {
    http: reqwest::Client,
    sparql_endpoint: String,
    wiki_endpoint: String,
    entity_cache: HashMap<String, Vec<CorrelationResult>>,
    event_cache: HashMap<String, Vec<CorrelationResult>>,
}

impl CorrelationClient {
    pub fn new() -> Self {
        Self::with_endpoints(WIKIDATA_SPARQL_ENDPOINT, WIKIPEDIA_API_ENDPOINT)
    }

    pub fn with_endpoints(sparql: impl Into<String>, wiki: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            sparql_endpoint: sparql.into(),
            wiki_endpoint: wiki.into(),
            entity_cache: HashMap::new(),
            event_cache: HashMap::new(),
        }
    }

    /// Exact-label Wikidata matches for `name` (French labels, fr/en
    /// descriptions), truncated to `limit`. The full fetched batch is cached
    /// so later calls with a different limit reuse it.
    pub async fn entity_lookup(&mut self, name: &str, limit: usize) -> Vec<CorrelationResult> {
        if let Some(cached) = self.entity_cache.get(name) {
            return cached.iter().take(limit).cloned().collect();
        }

        let results = match self.fetch_entities(name).await {
            Ok(results) => results,
            Err(err) => {
                log::warn!("entity lookup for {name:?} failed: {err}");
                Vec::new()
            }
        };

        self.entity_cache.insert(name.to_string(), results.clone());
        results.into_iter().take(limit).collect()
    }

    /// Free-text Wikipedia search results for `date` (typically a surge year),
    /// with highlight markup stripped and football coverage excluded.
    pub async fn event_lookup(&mut self, date: &str) -> Vec<CorrelationResult> {
        if let Some(cached) = self.event_cache.get(date) {
            return cached.clone();
        }

        let results = match self.fetch_events(date).await {
            Ok(results) => results,
            Err(err) => {
                log::warn!("event lookup for {date:?} failed: {err}");
                Vec::new()
            }
        };

        self.event_cache.insert(date.to_string(), results.clone());
        results
    }

    async fn fetch_entities(&self, name: &str) -> reqwest::Result<Vec<CorrelationResult>> {
        let query = entity_query(name);
        let response = self
            .http
            .get(&self.sparql_endpoint)
            .query(&[("query", query.as_str()), ("format", "json")])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(entity_results_from_response(status, &body))
    }

    async fn fetch_events(&self, date: &str) -> reqwest::Result<Vec<CorrelationResult>> {
        let response = self
            .http
            .get(&self.wiki_endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", date),
                ("format", "json"),
            ])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(event_results_from_response(status, &body))
    }
}

impl Default for CorrelationClient {
    fn default() -> Self {
        Self::new()
    }
}

fn entity_query(name: &str) -> String {
    format!(
        r#"SELECT DISTINCT ?item ?itemLabel ?description WHERE {{
  ?item ?label "{name}"@fr.
  OPTIONAL {{ ?item schema:description ?description. FILTER(LANG(?description) = "fr" || LANG(?description) = "en") }}
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "fr,en". }}
}} LIMIT {SPARQL_FETCH_LIMIT}"#
    )
}

fn entity_results_from_response(status: StatusCode, body: &str) -> Vec<CorrelationResult> {
    if !status.is_success() {
        log::warn!("SPARQL endpoint answered {status}");
        return Vec::new();
    }
    entity_results_from_body(body)
}

fn event_results_from_response(status: StatusCode, body: &str) -> Vec<CorrelationResult> {
    if !status.is_success() {
        log::warn!("wiki search endpoint answered {status}");
        return Vec::new();
    }
    event_results_from_body(body)
}

#[derive(Deserialize)]
struct SparqlResponse {
    results: Option<SparqlResults>,
}

#[derive(Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<SparqlBinding>,
}

#[derive(Deserialize)]
struct SparqlBinding {
    #[serde(rename = "itemLabel")]
    item_label: Option<SparqlValue>,
    description: Option<SparqlValue>,
}

#[derive(Deserialize)]
struct SparqlValue {
    value: String,
}

fn entity_results_from_body(body: &str) -> Vec<CorrelationResult> {
    let parsed: SparqlResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("unexpected SPARQL response shape: {err}");
            return Vec::new();
        }
    };

    let bindings = parsed.results.map(|r| r.bindings).unwrap_or_default();
    bindings
        .into_iter()
        .filter_map(|binding| {
            let label = binding.item_label?;
            Some(CorrelationResult {
                headline: label.value,
                description: binding
                    .description
                    .map(|d| d.value)
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            })
        })
        .collect()
}

#[derive(Deserialize)]
struct WikiResponse {
    query: Option<WikiQuery>,
}

#[derive(Deserialize)]
struct WikiQuery {
    #[serde(default)]
    search: Vec<WikiHit>,
}

#[derive(Deserialize)]
struct WikiHit {
    title: String,
    snippet: Option<String>,
}

fn event_results_from_body(body: &str) -> Vec<CorrelationResult> {
    let parsed: WikiResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!("unexpected wiki search response shape: {err}");
            return Vec::new();
        }
    };

    let hits = parsed.query.map(|q| q.search).unwrap_or_default();
    hits.into_iter()
        .filter_map(|hit| {
            let snippet =
                strip_search_markup(&hit.snippet.unwrap_or_else(|| NO_DESCRIPTION.to_string()));
            if mentions_excluded_topic(&hit.title, &snippet) {
                return None;
            }
            Some(CorrelationResult {
                headline: hit.title,
                description: snippet,
            })
        })
        .collect()
}

fn strip_search_markup(snippet: &str) -> String {
    snippet.replace(HIGHLIGHT_OPEN, "").replace(HIGHLIGHT_CLOSE, "")
}

fn mentions_excluded_topic(title: &str, snippet: &str) -> bool {
    title.to_lowercase().contains(EXCLUDED_TOPIC)
        || snippet.to_lowercase().contains(EXCLUDED_TOPIC)
}
