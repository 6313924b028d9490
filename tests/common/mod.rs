//! Common test utilities for search testing
//!
//! [`MemoryIndex`] is an in-process stand-in for the search cluster. It
//! understands the subset of the query DSL the engine emits: `bool` with
//! `must`/`filter`/`should`, `match_all`, top-level `match`, `term`, `terms`,
//! `range`, `geo_distance`, the sort cascade and the `terms`/`avg`/`range`
//! aggregations. Text matching is a small typo-tolerant approximation, good
//! enough to tell matching fixtures from non-matching ones.

#![allow(dead_code)]

use async_trait::async_trait;
use restaurant_search::search::{IndexClient, IndexResponse, SearchError, SearchResult};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

/// Point the nearby scenarios are measured from (Manila)
pub const MANILA: (f64, f64) = (14.5995, 120.9842);

/// Restaurant fixtures around [`MANILA`]
pub fn fixtures() -> Vec<Value> {
    vec![
        restaurant("r1", "Burger Barn", &["American", "Burgers"], 4.6, 49.0, 25.0, true, (14.6010, 120.9850)),
        restaurant("r2", "Pizza Palace", &["Italian", "Pizza"], 4.2, 0.0, 30.0, true, (14.6100, 120.9900)),
        restaurant("r3", "Golden Dragon", &["Chinese"], 4.8, 79.0, 35.0, true, (14.5800, 120.9750)),
        restaurant("r4", "Sakura Sushi", &["Japanese"], 4.5, 99.0, 40.0, false, (14.5990, 120.9840)),
        restaurant("r5", "Lutong Bahay", &["Filipino"], 3.9, 25.0, 20.0, true, (14.6300, 121.0000)),
        restaurant("r6", "Seoul Grill", &["Korean"], 4.7, 120.0, 45.0, true, (14.5500, 121.0300)),
        restaurant("r7", "Brew and Bean Cafe", &["Coffee"], 4.1, 35.0, 15.0, true, (14.5970, 120.9820)),
        restaurant("r8", "Burger Hub", &["American", "Burgers"], 3.5, 59.0, 28.0, true, (14.6050, 120.9880)),
    ]
}

#[allow(clippy::too_many_arguments)]
pub fn restaurant(
    id: &str,
    name: &str,
    cuisine: &[&str],
    rating: f64,
    delivery_fee: f64,
    delivery_time: f64,
    is_open: bool,
    (lat, lon): (f64, f64),
) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{} serving {}", name, cuisine.join(", ")),
        "cuisine": cuisine,
        "rating": rating,
        "deliveryFee": delivery_fee,
        "deliveryTime": delivery_time,
        "isOpen": is_open,
        "address": { "street": "Taft Avenue", "city": "Manila" },
        "location": { "lat": lat, "lon": lon },
    })
}

/// Great-circle distance in kilometres
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * 6371.0 * h.sqrt().asin()
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for i in 1..=a.len() {
        let mut cur = vec![i; b.len() + 1];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
        }
        prev = cur;
    }
    prev[b.len()]
}

/// In-memory index evaluating request bodies against fixture documents
pub struct MemoryIndex {
    docs: Vec<Value>,
    bodies: Mutex<Vec<Value>>,
    failing: AtomicBool,
}

impl MemoryIndex {
    pub fn new(docs: Vec<Value>) -> Self {
        Self {
            docs,
            bodies: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_fixtures() -> Self {
        Self::new(fixtures())
    }

    /// Make every following call fail with a 503
    pub fn fail(&self) {
        self.failing.store(true, AtomicOrdering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    /// Evaluate a body into a raw `_search` response
    pub fn evaluate(&self, body: &Value) -> Value {
        let query = &body["query"];
        let mut matched: Vec<(&Value, f64)> = self
            .docs
            .iter()
            .filter_map(|doc| score(query, doc).map(|s| (doc, s)))
            .collect();

        let sort = body["sort"].as_array().cloned().unwrap_or_default();
        let keyed: Vec<(&Value, f64, Vec<Option<f64>>)> = {
            let mut keyed: Vec<_> = matched
                .drain(..)
                .map(|(doc, s)| {
                    let keys: Vec<Option<f64>> = sort.iter().map(|clause| sort_key(clause, doc, s)).collect();
                    (doc, s, keys)
                })
                .collect();
            keyed.sort_by(|a, b| compare_keys(&sort, &a.2, &b.2));
            keyed
        };

        let aggregations = body["aggs"]
            .as_object()
            .map(|aggs| aggregate(aggs, keyed.iter().map(|(doc, _, _)| *doc)))
            .unwrap_or_else(|| json!({}));

        let from = body["from"].as_u64().unwrap_or(0) as usize;
        let size = body["size"].as_u64().unwrap_or(10) as usize;
        let hits: Vec<Value> = keyed
            .iter()
            .skip(from)
            .take(size)
            .map(|(doc, s, keys)| {
                let source = match body["_source"].as_array() {
                    Some(include) => {
                        let mut projected = Map::new();
                        for field in include.iter().filter_map(Value::as_str) {
                            projected.insert(field.to_string(), doc[field].clone());
                        }
                        Value::Object(projected)
                    }
                    None => (*doc).clone(),
                };
                json!({
                    "_id": doc["id"],
                    "_score": s,
                    "_source": source,
                    "sort": keys.iter().map(|k| json!(k)).collect::<Vec<_>>(),
                })
            })
            .collect();

        json!({
            "took": 1,
            "hits": {
                "total": { "value": keyed.len(), "relation": "eq" },
                "hits": hits,
            },
            "aggregations": aggregations,
        })
    }
}

#[async_trait]
impl IndexClient for MemoryIndex {
    async fn search(&self, body: &Value) -> SearchResult<IndexResponse> {
        self.bodies.lock().unwrap().push(body.clone());
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(SearchError::Status {
                status: 503,
                body: "cluster unavailable".to_string(),
            });
        }
        Ok(serde_json::from_value(self.evaluate(body))?)
    }
}

/// Index stub answering from a queue of canned responses
#[derive(Default)]
pub struct ScriptedIndex {
    responses: Mutex<Vec<SearchResult<Value>>>,
    bodies: Mutex<Vec<Value>>,
}

impl ScriptedIndex {
    pub fn new(responses: Vec<SearchResult<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexClient for ScriptedIndex {
    async fn search(&self, body: &Value) -> SearchResult<IndexResponse> {
        self.bodies.lock().unwrap().push(body.clone());
        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(json!({ "hits": { "total": { "value": 0 }, "hits": [] } }))
            } else {
                responses.remove(0)
            }
        };
        Ok(serde_json::from_value(next?)?)
    }
}

/// Aggregation-only response with the given name and cuisine buckets
pub fn suggestion_response(names: &[&str], cuisines: &[&str]) -> Value {
    let buckets = |keys: &[&str]| -> Vec<Value> {
        keys.iter().map(|k| json!({ "key": k, "doc_count": 1 })).collect()
    };
    json!({
        "hits": { "total": { "value": names.len() }, "hits": [] },
        "aggregations": {
            "restaurant_names": { "buckets": buckets(names) },
            "cuisines": { "buckets": buckets(cuisines) },
        }
    })
}

/// Raw-hit response carrying only names
pub fn name_hits_response(names: &[&str]) -> Value {
    let hits: Vec<Value> = names
        .iter()
        .enumerate()
        .map(|(i, n)| json!({ "_id": format!("h{}", i), "_score": 1.0, "_source": { "name": n } }))
        .collect();
    json!({ "hits": { "total": { "value": hits.len() }, "hits": hits } })
}

fn field<'a>(doc: &'a Value, path: &str) -> &'a Value {
    let path = path.trim_end_matches(".keyword");
    doc.pointer(&format!("/{}", path.replace('.', "/")))
        .unwrap_or(&Value::Null)
}

fn score(query: &Value, doc: &Value) -> Option<f64> {
    if query.get("match_all").is_some() {
        return Some(1.0);
    }

    if let Some(m) = query.get("match").and_then(Value::as_object) {
        let mut needles = Vec::new();
        collect_needles(&Value::Object(m.clone()), &mut needles);
        let hits = needles.iter().filter(|n| text_matches(n, doc)).count();
        return (hits > 0).then_some(hits as f64);
    }

    let bool_query = query.get("bool")?;

    for clause in bool_query["filter"].as_array().into_iter().flatten() {
        if !filter_matches(clause, doc) {
            return None;
        }
    }

    let mut total = 0.0;
    for clause in bool_query["must"].as_array().into_iter().flatten() {
        total += score(clause, doc)?;
    }

    if let Some(should) = bool_query["should"].as_array().filter(|s| !s.is_empty()) {
        let matching = should
            .iter()
            .filter(|clause| {
                let mut needles = Vec::new();
                collect_needles(clause, &mut needles);
                needles.iter().any(|n| text_matches(n, doc))
            })
            .count();
        let minimum = bool_query["minimum_should_match"].as_u64().unwrap_or(0) as usize;
        if matching < minimum.max(1) {
            return None;
        }
        total += matching as f64;
    }

    Some(total.max(1.0))
}

fn collect_needles(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("query" | "value", Value::String(s)) => {
                        let cleaned: String = s.chars().filter(|c| !matches!(c, '*' | '\\')).collect();
                        out.push(cleaned.to_lowercase());
                    }
                    _ => collect_needles(v, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_needles(v, out)),
        _ => {}
    }
}

fn doc_words(doc: &Value) -> Vec<String> {
    let mut words: Vec<String> = doc["name"]
        .as_str()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    for cuisine in doc["cuisine"].as_array().into_iter().flatten().filter_map(Value::as_str) {
        words.extend(cuisine.split_whitespace().map(str::to_lowercase));
    }
    words
}

fn text_matches(needle: &str, doc: &Value) -> bool {
    let words = doc_words(doc);
    needle.split_whitespace().any(|token| {
        let allowed = if token.chars().count() > 4 { 2 } else { 1 };
        words
            .iter()
            .any(|w| w.contains(token) || levenshtein(token, w) <= allowed)
    })
}

fn filter_matches(clause: &Value, doc: &Value) -> bool {
    if let Some(term) = clause.get("term").and_then(Value::as_object) {
        return term.iter().all(|(f, v)| field(doc, f) == v);
    }

    if let Some(terms) = clause.get("terms").and_then(Value::as_object) {
        return terms.iter().all(|(f, wanted)| {
            let wanted = wanted.as_array().cloned().unwrap_or_default();
            match field(doc, f) {
                Value::Array(values) => values.iter().any(|v| wanted.contains(v)),
                other => wanted.contains(other),
            }
        });
    }

    if let Some(range) = clause.get("range").and_then(Value::as_object) {
        return range.iter().all(|(f, bounds)| {
            let Some(v) = field(doc, f).as_f64() else {
                return false;
            };
            let check = |op: &str, ok: fn(f64, f64) -> bool| {
                bounds.get(op).and_then(Value::as_f64).map_or(true, |b| ok(v, b))
            };
            check("gte", |v, b| v >= b)
                && check("lte", |v, b| v <= b)
                && check("gt", |v, b| v > b)
                && check("lt", |v, b| v < b)
        });
    }

    if let Some(geo) = clause.get("geo_distance").and_then(Value::as_object) {
        let max_km = parse_km(geo["distance"].as_str().unwrap_or_default());
        return geo.iter().filter(|(k, _)| k.as_str() != "distance").all(|(f, origin)| {
            match (point(origin), point(field(doc, f))) {
                (Some(o), Some(p)) => haversine_km(o, p) <= max_km,
                _ => false,
            }
        });
    }

    panic!("unsupported filter clause: {}", clause);
}

fn point(value: &Value) -> Option<(f64, f64)> {
    Some((value["lat"].as_f64()?, value["lon"].as_f64()?))
}

fn parse_km(distance: &str) -> f64 {
    let digits: String = distance.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    let amount: f64 = digits.parse().unwrap_or(0.0);
    match &distance[digits.len()..] {
        "m" => amount / 1000.0,
        "mi" => amount * 1.609_344,
        _ => amount,
    }
}

fn sort_key(clause: &Value, doc: &Value, score: f64) -> Option<f64> {
    let (key, def) = clause.as_object()?.iter().next()?;
    match key.as_str() {
        "_score" => Some(score),
        "_geo_distance" => {
            let (f, origin) = def
                .as_object()?
                .iter()
                .find(|(k, _)| !matches!(k.as_str(), "order" | "unit"))?;
            Some(haversine_km(point(origin)?, point(field(doc, f))?))
        }
        f => field(doc, f).as_f64(),
    }
}

fn sort_order(clause: &Value) -> &str {
    clause
        .as_object()
        .and_then(|m| m.values().next())
        .and_then(|def| def["order"].as_str())
        .unwrap_or("asc")
}

fn compare_keys(sort: &[Value], a: &[Option<f64>], b: &[Option<f64>]) -> Ordering {
    for (i, clause) in sort.iter().enumerate() {
        let ordering = match (a[i], b[i]) {
            (Some(x), Some(y)) => {
                let o = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                if sort_order(clause) == "desc" {
                    o.reverse()
                } else {
                    o
                }
            }
            // Missing values sort last either way
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn aggregate<'a>(aggs: &Map<String, Value>, docs: impl Iterator<Item = &'a Value> + Clone) -> Value {
    let mut out = Map::new();

    for (name, def) in aggs {
        if let Some(terms) = def.get("terms") {
            let f = terms["field"].as_str().unwrap_or_default();
            let size = terms["size"].as_u64().unwrap_or(10) as usize;
            let mut counts: Vec<(String, u64)> = Vec::new();
            for doc in docs.clone() {
                let values = match field(doc, f) {
                    Value::Array(values) => values.clone(),
                    Value::Null => Vec::new(),
                    other => vec![other.clone()],
                };
                for value in values.iter().filter_map(Value::as_str) {
                    match counts.iter_mut().find(|(k, _)| k == value) {
                        Some((_, c)) => *c += 1,
                        None => counts.push((value.to_string(), 1)),
                    }
                }
            }
            counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            counts.truncate(size);
            let buckets: Vec<Value> = counts
                .into_iter()
                .map(|(key, count)| json!({ "key": key, "doc_count": count }))
                .collect();
            out.insert(name.clone(), json!({ "buckets": buckets }));
        } else if let Some(avg) = def.get("avg") {
            let f = avg["field"].as_str().unwrap_or_default();
            let values: Vec<f64> = docs.clone().filter_map(|d| field(d, f).as_f64()).collect();
            let value = if values.is_empty() {
                Value::Null
            } else {
                json!(values.iter().sum::<f64>() / values.len() as f64)
            };
            out.insert(name.clone(), json!({ "value": value }));
        } else if let Some(range) = def.get("range") {
            let f = range["field"].as_str().unwrap_or_default();
            let buckets: Vec<Value> = range["ranges"]
                .as_array()
                .into_iter()
                .flatten()
                .map(|r| {
                    let from = r["from"].as_f64().unwrap_or(f64::NEG_INFINITY);
                    let to = r["to"].as_f64().unwrap_or(f64::INFINITY);
                    let count = docs
                        .clone()
                        .filter_map(|d| field(d, f).as_f64())
                        .filter(|v| *v >= from && *v < to)
                        .count();
                    json!({ "key": r["key"], "doc_count": count })
                })
                .collect();
            out.insert(name.clone(), json!({ "buckets": buckets }));
        }
    }

    Value::Object(out)
}
