//! Record and relationship types for the diet-tracking dataset.
//!
//! Records carry no foreign keys. Links between records live only in
//! [`Relationship`], and each store projects them in its own shape: edges
//! in the graph store, embedded ids and sub-lists in the document store.

use serde::Serialize;
use std::fmt;

// ============================================================================
// Entity kinds
// ============================================================================

/// The nine record kinds, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum EntityKind {
    Nutritionist,
    Patient,
    Food,
    Recipe,
    DietPlan,
    Meal,
    BodyMeasurement,
    Message,
    Appointment,
}

impl EntityKind {
    /// Every kind, in the order the loaders insert them.
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Nutritionist,
        EntityKind::Patient,
        EntityKind::Food,
        EntityKind::Recipe,
        EntityKind::DietPlan,
        EntityKind::Meal,
        EntityKind::BodyMeasurement,
        EntityKind::Message,
        EntityKind::Appointment,
    ];

    /// Node label in the graph store.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Nutritionist => "Nutritionist",
            EntityKind::Patient => "Patient",
            EntityKind::Food => "Food",
            EntityKind::Recipe => "Recipe",
            EntityKind::DietPlan => "DietPlan",
            EntityKind::Meal => "Meal",
            EntityKind::BodyMeasurement => "BodyMeasurement",
            EntityKind::Message => "Message",
            EntityKind::Appointment => "Appointment",
        }
    }

    /// Collection name in the document store.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Nutritionist => "nutritionists",
            EntityKind::Patient => "patients",
            EntityKind::Food => "foods",
            EntityKind::Recipe => "recipes",
            EntityKind::DietPlan => "dietPlans",
            EntityKind::Meal => "meals",
            EntityKind::BodyMeasurement => "measurements",
            EntityKind::Message => "messages",
            EntityKind::Appointment => "appointments",
        }
    }

    /// Short variable name used when rendering graph statements.
    pub fn var_prefix(self) -> &'static str {
        match self {
            EntityKind::Nutritionist => "n",
            EntityKind::Patient => "p",
            EntityKind::Food => "f",
            EntityKind::Recipe => "r",
            EntityKind::DietPlan => "dp",
            EntityKind::Meal => "ml",
            EntityKind::BodyMeasurement => "bm",
            EntityKind::Message => "msg",
            EntityKind::Appointment => "ap",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Field values
// ============================================================================

/// A property value, independent of either store's encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(&'static str),
    TextList(&'static [&'static str]),
    /// Calendar date as `YYYY-MM-DD`.
    Date(&'static str),
}

/// A named field of a record.
///
/// Groups are flattened into top-level properties on graph nodes and become
/// sub-documents in the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(&'static str, Value),
    Group(&'static str, Vec<(&'static str, Value)>),
}

/// Common view over every record kind.
pub trait Record {
    const KIND: EntityKind;

    fn id(&self) -> u32;

    /// Fields in declaration order, excluding the identifier.
    fn fields(&self) -> Vec<Field>;
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Nutritionist {
    pub id: u32,
    pub name: &'static str,
    pub specialty: &'static str,
    pub years_experience: i64,
    pub email: &'static str,
    pub phone: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: u32,
    pub name: &'static str,
    pub age: i64,
    pub gender: &'static str,
    pub height_cm: i64,
    pub initial_weight_kg: f64,
    pub email: &'static str,
    pub phone: &'static str,
    pub restrictions: &'static [&'static str],
    pub allergies: &'static [&'static str],
    pub goal: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Food {
    pub id: u32,
    pub name: &'static str,
    pub portion: &'static str,
    pub calories: i64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub group: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub id: u32,
    pub name: &'static str,
    pub instructions: &'static str,
    pub prep_minutes: i64,
    pub difficulty: &'static str,
    pub calories: i64,
}

/// Share of daily calories per macronutrient, e.g. `"30%"`.
#[derive(Debug, Clone, Serialize)]
pub struct Macronutrients {
    pub protein: &'static str,
    pub carbs: &'static str,
    pub fat: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DietPlan {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub goal: &'static str,
    pub duration_days: i64,
    pub daily_calories: i64,
    pub macronutrients: Macronutrients,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meal {
    pub id: u32,
    pub meal_type: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub calories: i64,
    pub adherence: &'static str,
    pub photo_logged: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyMeasurement {
    pub id: u32,
    pub date: &'static str,
    pub weight_kg: f64,
    pub bmi: f64,
    pub body_fat_pct: f64,
    pub waist_cm: f64,
    pub hips_cm: f64,
    pub blood_pressure: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: u32,
    pub content: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Appointment {
    pub id: u32,
    pub date: &'static str,
    pub time: &'static str,
    pub status: &'static str,
    pub notes: &'static str,
}

fn scalar(name: &'static str, value: Value) -> Field {
    Field::Scalar(name, value)
}

impl Record for Nutritionist {
    const KIND: EntityKind = EntityKind::Nutritionist;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("name", Value::Text(self.name)),
            scalar("specialty", Value::Text(self.specialty)),
            scalar("years_experience", Value::Int(self.years_experience)),
            scalar("email", Value::Text(self.email)),
            scalar("phone", Value::Text(self.phone)),
        ]
    }
}

impl Record for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("name", Value::Text(self.name)),
            scalar("age", Value::Int(self.age)),
            scalar("gender", Value::Text(self.gender)),
            scalar("height_cm", Value::Int(self.height_cm)),
            scalar("initial_weight_kg", Value::Float(self.initial_weight_kg)),
            scalar("email", Value::Text(self.email)),
            scalar("phone", Value::Text(self.phone)),
            scalar("restrictions", Value::TextList(self.restrictions)),
            scalar("allergies", Value::TextList(self.allergies)),
            scalar("goal", Value::Text(self.goal)),
        ]
    }
}

impl Record for Food {
    const KIND: EntityKind = EntityKind::Food;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("name", Value::Text(self.name)),
            scalar("portion", Value::Text(self.portion)),
            scalar("calories", Value::Int(self.calories)),
            scalar("protein_g", Value::Float(self.protein_g)),
            scalar("carbs_g", Value::Float(self.carbs_g)),
            scalar("fat_g", Value::Float(self.fat_g)),
            scalar("fiber_g", Value::Float(self.fiber_g)),
            scalar("group", Value::Text(self.group)),
        ]
    }
}

impl Record for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("name", Value::Text(self.name)),
            scalar("instructions", Value::Text(self.instructions)),
            scalar("prep_minutes", Value::Int(self.prep_minutes)),
            scalar("difficulty", Value::Text(self.difficulty)),
            scalar("calories", Value::Int(self.calories)),
        ]
    }
}

impl Record for DietPlan {
    const KIND: EntityKind = EntityKind::DietPlan;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("name", Value::Text(self.name)),
            scalar("description", Value::Text(self.description)),
            scalar("goal", Value::Text(self.goal)),
            scalar("duration_days", Value::Int(self.duration_days)),
            scalar("daily_calories", Value::Int(self.daily_calories)),
            Field::Group(
                "macronutrients",
                vec![
                    ("protein", Value::Text(self.macronutrients.protein)),
                    ("carbs", Value::Text(self.macronutrients.carbs)),
                    ("fat", Value::Text(self.macronutrients.fat)),
                ],
            ),
        ]
    }
}

impl Record for Meal {
    const KIND: EntityKind = EntityKind::Meal;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("meal_type", Value::Text(self.meal_type)),
            scalar("date", Value::Date(self.date)),
            scalar("time", Value::Text(self.time)),
            scalar("calories", Value::Int(self.calories)),
            scalar("adherence", Value::Text(self.adherence)),
            scalar("photo_logged", Value::Bool(self.photo_logged)),
        ]
    }
}

impl Record for BodyMeasurement {
    const KIND: EntityKind = EntityKind::BodyMeasurement;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("date", Value::Date(self.date)),
            scalar("weight_kg", Value::Float(self.weight_kg)),
            scalar("bmi", Value::Float(self.bmi)),
            scalar("body_fat_pct", Value::Float(self.body_fat_pct)),
            Field::Group(
                "measurements",
                vec![
                    ("waist_cm", Value::Float(self.waist_cm)),
                    ("hips_cm", Value::Float(self.hips_cm)),
                ],
            ),
            scalar("blood_pressure", Value::Text(self.blood_pressure)),
        ]
    }
}

impl Record for Message {
    const KIND: EntityKind = EntityKind::Message;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("content", Value::Text(self.content)),
            scalar("date", Value::Date(self.date)),
            scalar("time", Value::Text(self.time)),
            scalar("read", Value::Bool(self.read)),
        ]
    }
}

impl Record for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;

    fn id(&self) -> u32 {
        self.id
    }

    fn fields(&self) -> Vec<Field> {
        vec![
            scalar("date", Value::Date(self.date)),
            scalar("time", Value::Text(self.time)),
            scalar("status", Value::Text(self.status)),
            scalar("notes", Value::Text(self.notes)),
        ]
    }
}

// ============================================================================
// Relationships
// ============================================================================

/// Graph relationship types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RelKind {
    Treats,
    Creates,
    Follows,
    Includes,
    Recommends,
    Contains,
    Consumes,
    HasMeasurement,
    Sends,
    To,
    Schedules,
    With,
}

impl RelKind {
    pub const ALL: [RelKind; 12] = [
        RelKind::Treats,
        RelKind::Creates,
        RelKind::Follows,
        RelKind::Includes,
        RelKind::Recommends,
        RelKind::Contains,
        RelKind::Consumes,
        RelKind::HasMeasurement,
        RelKind::Sends,
        RelKind::To,
        RelKind::Schedules,
        RelKind::With,
    ];

    pub fn rel_type(self) -> &'static str {
        match self {
            RelKind::Treats => "TREATS",
            RelKind::Creates => "CREATES",
            RelKind::Follows => "FOLLOWS",
            RelKind::Includes => "INCLUDES",
            RelKind::Recommends => "RECOMMENDS",
            RelKind::Contains => "CONTAINS",
            RelKind::Consumes => "CONSUMES",
            RelKind::HasMeasurement => "HAS_MEASUREMENT",
            RelKind::Sends => "SENDS",
            RelKind::To => "TO",
            RelKind::Schedules => "SCHEDULES",
            RelKind::With => "WITH",
        }
    }
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rel_type())
    }
}

/// A participant in a message exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Party {
    Nutritionist(u32),
    Patient(u32),
}

impl Party {
    pub fn node(self) -> NodeRef {
        match self {
            Party::Nutritionist(id) => NodeRef::new(EntityKind::Nutritionist, id),
            Party::Patient(id) => NodeRef::new(EntityKind::Patient, id),
        }
    }

    /// Lower-case kind tag stored next to the id in message documents.
    pub fn kind_tag(self) -> &'static str {
        match self {
            Party::Nutritionist(_) => "nutritionist",
            Party::Patient(_) => "patient",
        }
    }

    pub fn id(self) -> u32 {
        match self {
            Party::Nutritionist(id) | Party::Patient(id) => id,
        }
    }
}

/// What a meal was made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MealItem {
    Food(u32),
    Recipe(u32),
}

impl MealItem {
    pub fn node(self) -> NodeRef {
        match self {
            MealItem::Food(id) => NodeRef::new(EntityKind::Food, id),
            MealItem::Recipe(id) => NodeRef::new(EntityKind::Recipe, id),
        }
    }
}

/// A typed reference to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeRef {
    pub kind: EntityKind,
    pub id: u32,
}

impl NodeRef {
    pub const fn new(kind: EntityKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// One directed edge between two records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub from: NodeRef,
    pub rel: RelKind,
    pub to: NodeRef,
    /// Optional attribute, e.g. the quantity on a CONTAINS edge.
    pub attribute: Option<(&'static str, &'static str)>,
}

/// A relationship instance as the dataset defines it.
///
/// Message and appointment relationships each span three records and
/// expand into two edges; everything else is a single edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Relationship {
    Treats { nutritionist: u32, patient: u32 },
    Creates { nutritionist: u32, plan: u32 },
    Follows { patient: u32, plan: u32 },
    PlanIncludes { plan: u32, food: u32 },
    Recommends { plan: u32, recipe: u32 },
    Contains { recipe: u32, food: u32, quantity: &'static str },
    Consumes { patient: u32, meal: u32 },
    MealIncludes { meal: u32, item: MealItem },
    HasMeasurement { patient: u32, measurement: u32 },
    Exchange { message: u32, from: Party, to: Party },
    Schedules { appointment: u32, patient: u32, nutritionist: u32 },
}

impl Relationship {
    /// The edges this relationship creates, in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        use EntityKind as K;
        let edge = |from: NodeRef, rel: RelKind, to: NodeRef| Edge {
            from,
            rel,
            to,
            attribute: None,
        };
        match *self {
            Relationship::Treats {
                nutritionist,
                patient,
            } => vec![edge(
                NodeRef::new(K::Nutritionist, nutritionist),
                RelKind::Treats,
                NodeRef::new(K::Patient, patient),
            )],
            Relationship::Creates { nutritionist, plan } => vec![edge(
                NodeRef::new(K::Nutritionist, nutritionist),
                RelKind::Creates,
                NodeRef::new(K::DietPlan, plan),
            )],
            Relationship::Follows { patient, plan } => vec![edge(
                NodeRef::new(K::Patient, patient),
                RelKind::Follows,
                NodeRef::new(K::DietPlan, plan),
            )],
            Relationship::PlanIncludes { plan, food } => vec![edge(
                NodeRef::new(K::DietPlan, plan),
                RelKind::Includes,
                NodeRef::new(K::Food, food),
            )],
            Relationship::Recommends { plan, recipe } => vec![edge(
                NodeRef::new(K::DietPlan, plan),
                RelKind::Recommends,
                NodeRef::new(K::Recipe, recipe),
            )],
            Relationship::Contains {
                recipe,
                food,
                quantity,
            } => vec![Edge {
                from: NodeRef::new(K::Recipe, recipe),
                rel: RelKind::Contains,
                to: NodeRef::new(K::Food, food),
                attribute: Some(("quantity", quantity)),
            }],
            Relationship::Consumes { patient, meal } => vec![edge(
                NodeRef::new(K::Patient, patient),
                RelKind::Consumes,
                NodeRef::new(K::Meal, meal),
            )],
            Relationship::MealIncludes { meal, item } => vec![edge(
                NodeRef::new(K::Meal, meal),
                RelKind::Includes,
                item.node(),
            )],
            Relationship::HasMeasurement {
                patient,
                measurement,
            } => vec![edge(
                NodeRef::new(K::Patient, patient),
                RelKind::HasMeasurement,
                NodeRef::new(K::BodyMeasurement, measurement),
            )],
            Relationship::Exchange { message, from, to } => {
                let msg = NodeRef::new(K::Message, message);
                vec![
                    edge(from.node(), RelKind::Sends, msg),
                    edge(msg, RelKind::To, to.node()),
                ]
            }
            Relationship::Schedules {
                appointment,
                patient,
                nutritionist,
            } => {
                let appt = NodeRef::new(K::Appointment, appointment);
                vec![
                    edge(NodeRef::new(K::Patient, patient), RelKind::Schedules, appt),
                    edge(appt, RelKind::With, NodeRef::new(K::Nutritionist, nutritionist)),
                ]
            }
        }
    }

    /// Every record this relationship touches, without duplicates.
    pub fn endpoints(&self) -> Vec<NodeRef> {
        let mut nodes = Vec::new();
        for edge in self.edges() {
            for node in [edge.from, edge.to] {
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        }
        nodes
    }

    /// Human-readable form used in progress and failure logs.
    pub fn describe(&self) -> String {
        let edges = self.edges();
        let mut out = String::new();
        for (i, edge) in edges.iter().enumerate() {
            if i == 0 {
                out.push_str(&edge.from.to_string());
            }
            out.push_str(&format!(" -[{}]-> {}", edge.rel, edge.to));
        }
        out
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
