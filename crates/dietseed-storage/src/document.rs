//! Document store: MongoDB connection, readiness probe and bulk loader.
//!
//! Records become one document per record with `_id` set to the record id.
//! Relationships have no separate representation here; they are projected
//! onto the documents as foreign-key fields and embedded lists so both
//! stores describe the same data.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use chrono::{TimeZone, Utc};
use dietseed_dataset::{
    parse_date, Dataset, DatasetError, EntityKind, Field, MealItem, NodeRef, Relationship, Value,
};
use futures::TryStreamExt;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use crate::config::DocumentConfig;
use crate::error::{LoadError, StoreError};
use crate::report::LoadReport;
use crate::retry::{retry_until, RetryExhausted, RetryPolicy};
use crate::Engine;

/// The subset of a database handle the loader and verifier need.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Drop every collection; returns how many were dropped.
    async fn drop_all(&self) -> Result<usize, StoreError>;

    /// Insert documents into one collection; returns how many were stored.
    async fn insert_many(&self, collection: &str, docs: Vec<Document>)
        -> Result<usize, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// Run a pipeline ending in `{"$count": "count"}` and read the count.
    /// An empty result counts as zero.
    async fn aggregate_count(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<u64, StoreError>;
}

// ============================================================================
// MongoDB
// ============================================================================

pub struct MongoStore {
    client: mongodb::Client,
    db: mongodb::Database,
    timeout: Duration,
}

impl MongoStore {
    pub async fn connect(config: &DocumentConfig, timeout: Duration) -> Result<Self, StoreError> {
        let mut options = with_timeout(timeout, mongodb::options::ClientOptions::parse(&config.uri))
            .await?
            .map_err(|e| StoreError::connect(Engine::Document, e))?;
        options.server_selection_timeout = Some(config.server_selection_timeout);
        options.app_name = Some("dietseed".to_string());

        let client = mongodb::Client::with_options(options)
            .map_err(|e| StoreError::connect(Engine::Document, e))?;
        let db = client.database(&config.database);
        Ok(Self {
            client,
            db,
            timeout,
        })
    }

    /// `ping` against the `admin` database.
    pub async fn ping(&self) -> Result<bool, StoreError> {
        let reply = with_timeout(
            self.timeout,
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 }, None),
        )
        .await?
        .map_err(|e| StoreError::request(Engine::Document, e))?;
        Ok(read_number(&reply, "ok") == Some(1))
    }

    /// Close every pooled connection.
    pub async fn close(self) {
        self.client.shutdown().await;
    }
}

async fn with_timeout<F: Future>(after: Duration, fut: F) -> Result<F::Output, StoreError> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| StoreError::Timeout {
            engine: Engine::Document,
            after,
        })
}

/// Integer view of a numeric field, whatever width the server chose.
fn read_number(doc: &Document, key: &str) -> Option<i64> {
    match doc.get(key)? {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn drop_all(&self) -> Result<usize, StoreError> {
        let names = with_timeout(self.timeout, self.db.list_collection_names(None))
            .await?
            .map_err(|e| StoreError::request(Engine::Document, e))?;
        for name in &names {
            with_timeout(
                self.timeout,
                self.db.collection::<Document>(name).drop(None),
            )
            .await?
            .map_err(|e| StoreError::request(Engine::Document, e))?;
            tracing::debug!(collection = %name, "collection dropped");
        }
        Ok(names.len())
    }

    async fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> Result<usize, StoreError> {
        let result = with_timeout(
            self.timeout,
            self.db.collection::<Document>(collection).insert_many(docs, None),
        )
        .await?
        .map_err(|e| StoreError::request(Engine::Document, e))?;
        Ok(result.inserted_ids.len())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        with_timeout(
            self.timeout,
            self.db
                .collection::<Document>(collection)
                .count_documents(doc! {}, None),
        )
        .await?
        .map_err(|e| StoreError::request(Engine::Document, e))
    }

    async fn aggregate_count(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<u64, StoreError> {
        let fetch = async {
            match self
                .db
                .collection::<Document>(collection)
                .aggregate(pipeline, None)
                .await
            {
                Ok(cursor) => cursor.try_collect::<Vec<Document>>().await,
                Err(e) => Err(e),
            }
        };
        let rows = with_timeout(self.timeout, fetch)
            .await?
            .map_err(|e| StoreError::request(Engine::Document, e))?;

        match rows.first() {
            None => Ok(0),
            Some(row) => read_number(row, "count")
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| StoreError::UnexpectedResult {
                    engine: Engine::Document,
                    message: format!("aggregate on `{collection}` returned {row}"),
                }),
        }
    }
}

// ============================================================================
// Readiness
// ============================================================================

/// One `ping` on a fresh client, shut down before returning.
pub async fn probe_once(config: &DocumentConfig, timeout: Duration) -> Result<bool, StoreError> {
    let store = MongoStore::connect(config, timeout).await?;
    let ok = store.ping().await;
    store.close().await;
    ok
}

/// Poll the document store until `ping` answers `ok: 1`.
pub async fn wait_until_ready(
    config: &DocumentConfig,
    policy: &RetryPolicy,
    timeout: Duration,
) -> Result<(), RetryExhausted> {
    retry_until(
        policy,
        "MongoDB",
        |_| probe_once(config, timeout),
        |ok| *ok,
    )
    .await?;
    tracing::info!(database = %config.database, "MongoDB connection established");
    Ok(())
}

// ============================================================================
// Projection
// ============================================================================

fn id_bson(id: u32) -> Bson {
    Bson::Int64(i64::from(id))
}

fn date_bson(text: &str) -> Result<Bson, DatasetError> {
    let date = parse_date(text)?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DatasetError::InvalidDate(text.to_string()))?;
    let millis = Utc.from_utc_datetime(&midnight).timestamp_millis();
    Ok(Bson::DateTime(bson::DateTime::from_millis(millis)))
}

/// Encode a property value. Dates become BSON datetimes at UTC midnight.
pub fn value_bson(value: &Value) -> Result<Bson, DatasetError> {
    Ok(match value {
        Value::Int(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Text(s) => Bson::String((*s).to_string()),
        Value::TextList(items) => {
            Bson::Array(items.iter().map(|s| Bson::String((*s).to_string())).collect())
        }
        Value::Date(s) => date_bson(s)?,
    })
}

/// Foreign-key fields collected from the relationship list, per record.
#[derive(Default)]
struct Links {
    fields: BTreeMap<NodeRef, Document>,
}

impl Links {
    fn set(&mut self, node: NodeRef, key: &str, value: Bson) {
        self.fields.entry(node).or_default().insert(key, value);
    }

    fn push(&mut self, node: NodeRef, key: &str, value: Bson) {
        let doc = self.fields.entry(node).or_default();
        match doc.get_mut(key) {
            Some(Bson::Array(items)) => items.push(value),
            _ => {
                doc.insert(key, Bson::Array(vec![value]));
            }
        }
    }

    fn collect(dataset: &Dataset) -> Self {
        use EntityKind as K;
        let mut links = Links::default();
        let node = NodeRef::new;

        for rel in &dataset.relationships {
            match *rel {
                Relationship::Treats {
                    nutritionist,
                    patient,
                } => links.set(
                    node(K::Patient, patient),
                    "nutritionist_id",
                    id_bson(nutritionist),
                ),
                Relationship::Creates { nutritionist, plan } => links.set(
                    node(K::DietPlan, plan),
                    "nutritionist_id",
                    id_bson(nutritionist),
                ),
                Relationship::Follows { patient, plan } => {
                    links.set(node(K::DietPlan, plan), "patient_id", id_bson(patient))
                }
                Relationship::PlanIncludes { plan, food } => {
                    links.push(node(K::DietPlan, plan), "recommended_foods", id_bson(food))
                }
                Relationship::Recommends { plan, recipe } => links.push(
                    node(K::DietPlan, plan),
                    "recommended_recipes",
                    id_bson(recipe),
                ),
                Relationship::Contains {
                    recipe,
                    food,
                    quantity,
                } => links.push(
                    node(K::Recipe, recipe),
                    "ingredients",
                    Bson::Document(doc! { "food_id": id_bson(food), "quantity": quantity }),
                ),
                Relationship::Consumes { patient, meal } => {
                    links.set(node(K::Meal, meal), "patient_id", id_bson(patient))
                }
                Relationship::MealIncludes { meal, item } => match item {
                    MealItem::Food(id) => links.push(node(K::Meal, meal), "foods", id_bson(id)),
                    MealItem::Recipe(id) => {
                        links.push(node(K::Meal, meal), "recipes", id_bson(id))
                    }
                },
                Relationship::HasMeasurement {
                    patient,
                    measurement,
                } => links.set(
                    node(K::BodyMeasurement, measurement),
                    "patient_id",
                    id_bson(patient),
                ),
                Relationship::Exchange { message, from, to } => {
                    let msg = node(K::Message, message);
                    links.set(msg, "from_id", id_bson(from.id()));
                    links.set(msg, "from_kind", Bson::String(from.kind_tag().to_string()));
                    links.set(msg, "to_id", id_bson(to.id()));
                    links.set(msg, "to_kind", Bson::String(to.kind_tag().to_string()));
                }
                Relationship::Schedules {
                    appointment,
                    patient,
                    nutritionist,
                } => {
                    let appt = node(K::Appointment, appointment);
                    links.set(appt, "patient_id", id_bson(patient));
                    links.set(appt, "nutritionist_id", id_bson(nutritionist));
                }
            }
        }
        links
    }
}

/// List fields every document of a kind carries, even when empty.
fn list_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Recipe => &["ingredients"],
        EntityKind::DietPlan => &["recommended_foods", "recommended_recipes"],
        EntityKind::Meal => &["foods", "recipes"],
        _ => &[],
    }
}

/// Build every document, grouped by kind in load order.
pub fn project(dataset: &Dataset) -> Result<Vec<(EntityKind, Vec<Document>)>, DatasetError> {
    let links = Links::collect(dataset);
    let mut out = Vec::with_capacity(EntityKind::ALL.len());

    for kind in EntityKind::ALL {
        let mut docs = Vec::new();
        for (id, fields) in dataset.records(kind) {
            let mut doc = doc! { "_id": id_bson(id) };
            for field in &fields {
                match field {
                    Field::Scalar(name, value) => {
                        doc.insert(*name, value_bson(value)?);
                    }
                    Field::Group(name, members) => {
                        let mut sub = Document::new();
                        for (key, value) in members {
                            sub.insert(*key, value_bson(value)?);
                        }
                        doc.insert(*name, sub);
                    }
                }
            }
            for key in list_fields(kind) {
                doc.insert(*key, Bson::Array(Vec::new()));
            }
            if let Some(extra) = links.fields.get(&NodeRef::new(kind, id)) {
                for (key, value) in extra {
                    doc.insert(key.clone(), value.clone());
                }
            }
            docs.push(doc);
        }
        out.push((kind, docs));
    }
    Ok(out)
}

// ============================================================================
// Bulk load
// ============================================================================

/// Drop every collection, then insert each kind with one `insert_many`.
///
/// Documents are built before anything is dropped, so a dataset that cannot
/// be encoded leaves the store untouched.
pub async fn load(
    store: &dyn DocumentStore,
    dataset: &Dataset,
) -> Result<LoadReport, LoadError> {
    let projected = project(dataset)?;
    let mut report = LoadReport::new(Engine::Document);

    let dropped = store.drop_all().await.map_err(LoadError::Wipe)?;
    tracing::info!(collections = dropped, "document store cleared");

    for (kind, docs) in projected {
        if docs.is_empty() {
            continue;
        }
        let collection = kind.collection();
        let count = store
            .insert_many(collection, docs)
            .await
            .map_err(|source| LoadError::Insert { kind, source })?;
        tracing::info!(collection, count, "documents inserted");
        report.inserted.push((kind, count));
    }
    Ok(report)
}

/// Connect, load and shut the client down on every path.
pub async fn connect_and_load(
    config: &DocumentConfig,
    timeout: Duration,
    dataset: &Dataset,
) -> Result<LoadReport, LoadError> {
    let store = MongoStore::connect(config, timeout).await?;
    let result = load(&store, dataset).await;
    store.close().await;
    result
}

/// `dietPlans` whose `patient_id` resolves to a stored patient.
pub fn plans_with_patient_pipeline() -> Vec<Document> {
    vec![
        doc! { "$lookup": {
            "from": EntityKind::Patient.collection(),
            "localField": "patient_id",
            "foreignField": "_id",
            "as": "patient",
        }},
        doc! { "$match": { "patient": { "$ne": [] } } },
        doc! { "$count": "count" },
    ]
}
