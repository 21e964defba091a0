//! Dietseed sample dataset
//!
//! The fixed records and relationships both stores are seeded with:
//!
//! ```text
//!   Nutritionist ──TREATS──► Patient ──FOLLOWS──► DietPlan ──INCLUDES──► Food
//!        │                     │  │                   │                    ▲
//!        └──CREATES────────────┼──┼──────────────────►┘                    │
//!                              │  └─CONSUMES─► Meal ──INCLUDES──► Recipe ──CONTAINS
//!                              └─HAS_MEASUREMENT─► BodyMeasurement
//!   (Nutritionist|Patient) ─SENDS─► Message ─TO─► (Patient|Nutritionist)
//!   Patient ─SCHEDULES─► Appointment ─WITH─► Nutritionist
//! ```
//!
//! Identifiers are unique within a kind and shared by both stores, so the
//! patient with id 1 is node `(:Patient {id: 1})` in the graph store and
//! document `{_id: 1}` in `patients`.

pub mod model;
pub mod sample;


pub use model::{
    Appointment, BodyMeasurement, DietPlan, Edge, EntityKind, Field, Food, Macronutrients, Meal,
    MealItem, Message, NodeRef, Nutritionist, Party, Patient, Recipe, Record, RelKind,
    Relationship, Value,
};

use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: EntityKind, id: u32 },

    #[error("relationship `{relationship}` references missing {missing}")]
    DanglingReference {
        relationship: String,
        missing: NodeRef,
    },

    #[error("invalid calendar date `{0}`")]
    InvalidDate(String),
}

/// The complete dataset, grouped by kind.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub nutritionists: Vec<Nutritionist>,
    pub patients: Vec<Patient>,
    pub foods: Vec<Food>,
    pub recipes: Vec<Recipe>,
    pub diet_plans: Vec<DietPlan>,
    pub meals: Vec<Meal>,
    pub measurements: Vec<BodyMeasurement>,
    pub messages: Vec<Message>,
    pub appointments: Vec<Appointment>,
    /// Relationship instances in load order.
    pub relationships: Vec<Relationship>,
}

impl Dataset {
    /// The fixed demo dataset.
    pub fn sample() -> Self {
        sample::sample()
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.ids(kind).len()
    }

    /// Identifiers of one kind, in dataset order.
    pub fn ids(&self, kind: EntityKind) -> Vec<u32> {
        fn ids_of<R: Record>(records: &[R]) -> Vec<u32> {
            records.iter().map(Record::id).collect()
        }
        match kind {
            EntityKind::Nutritionist => ids_of(&self.nutritionists),
            EntityKind::Patient => ids_of(&self.patients),
            EntityKind::Food => ids_of(&self.foods),
            EntityKind::Recipe => ids_of(&self.recipes),
            EntityKind::DietPlan => ids_of(&self.diet_plans),
            EntityKind::Meal => ids_of(&self.meals),
            EntityKind::BodyMeasurement => ids_of(&self.measurements),
            EntityKind::Message => ids_of(&self.messages),
            EntityKind::Appointment => ids_of(&self.appointments),
        }
    }

    /// `(id, fields)` for every record of one kind.
    pub fn records(&self, kind: EntityKind) -> Vec<(u32, Vec<Field>)> {
        fn rows<R: Record>(records: &[R]) -> Vec<(u32, Vec<Field>)> {
            records.iter().map(|r| (r.id(), r.fields())).collect()
        }
        match kind {
            EntityKind::Nutritionist => rows(&self.nutritionists),
            EntityKind::Patient => rows(&self.patients),
            EntityKind::Food => rows(&self.foods),
            EntityKind::Recipe => rows(&self.recipes),
            EntityKind::DietPlan => rows(&self.diet_plans),
            EntityKind::Meal => rows(&self.meals),
            EntityKind::BodyMeasurement => rows(&self.measurements),
            EntityKind::Message => rows(&self.messages),
            EntityKind::Appointment => rows(&self.appointments),
        }
    }

    /// All edges, in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        self.relationships.iter().flat_map(Relationship::edges).collect()
    }

    /// Number of edges of one relationship type.
    pub fn edge_count(&self, rel: RelKind) -> usize {
        self.edges().iter().filter(|e| e.rel == rel).count()
    }

    /// Check that ids are unique per kind and that every relationship only
    /// references records present in the dataset.
    pub fn check_references(&self) -> Result<(), DatasetError> {
        let mut known: BTreeSet<NodeRef> = BTreeSet::new();
        for kind in EntityKind::ALL {
            for id in self.ids(kind) {
                if !known.insert(NodeRef::new(kind, id)) {
                    return Err(DatasetError::DuplicateId { kind, id });
                }
            }
        }

        for rel in &self.relationships {
            if let Some(missing) = rel.endpoints().into_iter().find(|n| !known.contains(n)) {
                return Err(DatasetError::DanglingReference {
                    relationship: rel.describe(),
                    missing,
                });
            }
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date field.
pub fn parse_date(text: &str) -> Result<chrono::NaiveDate, DatasetError> {
    chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| DatasetError::InvalidDate(text.to_string()))
}
