//! Cypher statement rendering for the graph loader.
//!
//! The dataset is static, so statements are rendered with inline literals
//! rather than parameters. Strings are escaped for single-quoted Cypher
//! literals.

use dietseed_dataset::{Dataset, Edge, EntityKind, Field, NodeRef, RelKind, Relationship, Value};
use std::fmt::Write;

/// Removes every node and relationship.
pub const WIPE: &str = "MATCH (n) DETACH DELETE n";

/// Liveness query; returns a single row with `num = 1`.
pub const LIVENESS: &str = "RETURN 1 AS num";

/// Quote a string as a single-quoted Cypher literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render a property value as a Cypher literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => {
            // Keep a decimal point so the value is stored as a float.
            if f.fract() == 0.0 && f.is_finite() {
                format!("{f:.1}")
            } else {
                f.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Text(s) | Value::Date(s) => quote(s),
        Value::TextList(items) => {
            let parts: Vec<String> = items.iter().map(|s| quote(s)).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// `{id: 1, name: '...', ...}` with groups flattened into top-level keys.
pub fn property_map(id: u32, fields: &[Field]) -> String {
    let mut out = format!("{{id: {id}");
    for field in fields {
        match field {
            Field::Scalar(name, value) => {
                let _ = write!(out, ", {name}: {}", literal(value));
            }
            Field::Group(_, members) => {
                for (name, value) in members {
                    let _ = write!(out, ", {name}: {}", literal(value));
                }
            }
        }
    }
    out.push('}');
    out
}

/// One `CREATE` statement holding every record of `kind`, or `None` when
/// the dataset has no records of that kind.
pub fn create_nodes(dataset: &Dataset, kind: EntityKind) -> Option<String> {
    let records = dataset.records(kind);
    if records.is_empty() {
        return None;
    }
    let prefix = kind.var_prefix();
    let label = kind.label();
    let lines: Vec<String> = records
        .iter()
        .map(|(id, fields)| {
            format!(
                "CREATE ({prefix}{id}:{label} {})",
                property_map(*id, fields)
            )
        })
        .collect();
    Some(lines.join("\n"))
}

fn node_var(node: &NodeRef) -> String {
    format!("{}{}", node.kind.var_prefix(), node.id)
}

fn edge_pattern(edge: &Edge) -> String {
    let attrs = match edge.attribute {
        Some((key, value)) => format!(" {{{key}: {}}}", quote(value)),
        None => String::new(),
    };
    format!("-[:{}{attrs}]->({})", edge.rel.rel_type(), node_var(&edge.to))
}

/// `MATCH` the endpoints of one relationship and `CREATE` its edges.
///
/// Returns `created`: 1 when every endpoint matched, 0 when any is missing.
pub fn create_relationship(rel: &Relationship) -> String {
    let matches: Vec<String> = rel
        .endpoints()
        .iter()
        .map(|n| format!("({}:{} {{id: {}}})", node_var(n), n.kind.label(), n.id))
        .collect();

    let edges = rel.edges();
    let mut path = String::new();
    if let Some(first) = edges.first() {
        let _ = write!(path, "({})", node_var(&first.from));
    }
    for edge in &edges {
        path.push_str(&edge_pattern(edge));
    }

    format!(
        "MATCH {}\nCREATE {}\nRETURN count(*) AS created",
        matches.join(", "),
        path
    )
}

/// `count` of nodes with the kind's label.
pub fn count_nodes(kind: EntityKind) -> String {
    format!("MATCH (n:{}) RETURN count(n) AS count", kind.label())
}

/// `count` of edges of one type, whatever their endpoints.
pub fn count_relationships(rel: RelKind) -> String {
    format!("MATCH ()-[r:{}]->() RETURN count(r) AS count", rel.rel_type())
}

/// `count` of `(from)-[rel]->(to)` paths.
pub fn count_edges(from: EntityKind, rel: &str, to: EntityKind) -> String {
    format!(
        "MATCH (:{})-[r:{rel}]->(:{}) RETURN count(r) AS count",
        from.label(),
        to.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dietseed_dataset::{MealItem, Party};
    use proptest::prelude::*;

    #[test]
    fn test_literals() {
        assert_eq!(literal(&Value::Int(8)), "8");
        assert_eq!(literal(&Value::Float(92.0)), "92.0");
        assert_eq!(literal(&Value::Float(0.5)), "0.5");
        assert_eq!(literal(&Value::Bool(false)), "false");
        assert_eq!(literal(&Value::Text("Maçã")), "'Maçã'");
        assert_eq!(literal(&Value::Date("2023-10-18")), "'2023-10-18'");
        assert_eq!(literal(&Value::TextList(&[])), "[]");
        assert_eq!(
            literal(&Value::TextList(&["Glúten", "Nozes"])),
            "['Glúten', 'Nozes']"
        );
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote("line\nbreak"), r"'line\nbreak'");
    }

    #[test]
    fn test_nutritionist_batch() {
        let data = Dataset::sample();
        let stmt = create_nodes(&data, EntityKind::Nutritionist).unwrap();
        let lines: Vec<&str> = stmt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("CREATE (n1:Nutritionist {id: 1, name: 'Ana Silva'"));
        assert!(lines[2].contains("years_experience: 12"));
    }

    #[test]
    fn test_groups_are_flattened() {
        let data = Dataset::sample();
        let stmt = create_nodes(&data, EntityKind::DietPlan).unwrap();
        assert!(stmt.contains("protein: '30%', carbs: '40%', fat: '30%'"));
        assert!(!stmt.contains("macronutrients"));

        let stmt = create_nodes(&data, EntityKind::BodyMeasurement).unwrap();
        assert!(stmt.contains("waist_cm: 102.0, hips_cm: 106.0"));
    }

    #[test]
    fn test_simple_relationship() {
        let stmt = create_relationship(&Relationship::Treats {
            nutritionist: 1,
            patient: 3,
        });
        assert_eq!(
            stmt,
            "MATCH (n1:Nutritionist {id: 1}), (p3:Patient {id: 3})\n\
             CREATE (n1)-[:TREATS]->(p3)\n\
             RETURN count(*) AS created"
        );
    }

    #[test]
    fn test_edge_attribute() {
        let stmt = create_relationship(&Relationship::Contains {
            recipe: 1,
            food: 9,
            quantity: "5ml",
        });
        assert!(stmt.contains("CREATE (r1)-[:CONTAINS {quantity: '5ml'}]->(f9)"));
    }

    #[test]
    fn test_three_node_relationship() {
        let stmt = create_relationship(&Relationship::Exchange {
            message: 2,
            from: Party::Patient(1),
            to: Party::Nutritionist(1),
        });
        assert!(stmt.starts_with(
            "MATCH (p1:Patient {id: 1}), (msg2:Message {id: 2}), (n1:Nutritionist {id: 1})"
        ));
        assert!(stmt.contains("CREATE (p1)-[:SENDS]->(msg2)-[:TO]->(n1)"));
    }

    #[test]
    fn test_meal_item_target() {
        let stmt = create_relationship(&Relationship::MealIncludes {
            meal: 3,
            item: MealItem::Food(7),
        });
        assert!(stmt.contains("(ml3)-[:INCLUDES]->(f7)"));
    }

    #[test]
    fn test_count_queries() {
        assert_eq!(
            count_nodes(EntityKind::Patient),
            "MATCH (n:Patient) RETURN count(n) AS count"
        );
        assert_eq!(
            count_edges(EntityKind::Nutritionist, "TREATS", EntityKind::Patient),
            "MATCH (:Nutritionist)-[r:TREATS]->(:Patient) RETURN count(r) AS count"
        );
        assert_eq!(
            count_relationships(RelKind::HasMeasurement),
            "MATCH ()-[r:HAS_MEASUREMENT]->() RETURN count(r) AS count"
        );
    }

    proptest! {
        #[test]
        fn quoted_strings_have_no_bare_quotes(s in ".*") {
            let q = quote(&s);
            let inner = &q[1..q.len() - 1];
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    // Every backslash starts an escape pair.
                    prop_assert!(chars.next().is_some());
                } else {
                    prop_assert!(c != '\'');
                }
            }
        }
    }
}
