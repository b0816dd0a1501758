//! Render a predicate tree against a table aliased `n`.
//!
//! Values and JSON paths are always bound parameters; the only text spliced
//! into the SQL are column names taken from [`Feature::column`].

use gramlens_core::predicate::Predicate;
use gramlens_core::types::Feature;

use super::SqlFragment;

/// `$[position]`, the JSON path of one token slot.
pub fn json_path(position: u32) -> String {
    format!("$[{position}]")
}

/// Render `predicate` as a boolean SQL expression over alias `n`.
pub fn render_predicate(predicate: &Predicate) -> SqlFragment {
    let mut out = SqlFragment::default();
    render_into(predicate, &mut out);
    out
}

fn render_into(predicate: &Predicate, out: &mut SqlFragment) {
    match predicate {
        Predicate::Const(true) => {
            out.push_sql("1");
        }
        Predicate::Const(false) => {
            out.push_sql("0");
        }
        Predicate::All(parts) => join(parts, " AND ", "1", out),
        Predicate::Any(parts) => join(parts, " OR ", "0", out),
        Predicate::Not(inner) => {
            out.push_sql("NOT (");
            render_into(inner, out);
            out.push_sql(")");
        }
        Predicate::HasPosition { feature, position } => match feature.column() {
            Some(col) => {
                out.push_sql(&format!("json_array_length(n.{col}) > "));
                out.push_param(i64::from(*position));
            }
            None => {
                out.push_sql("0");
            }
        },
        Predicate::ValueIn {
            feature,
            position,
            values,
        } => match feature.column() {
            Some(col) if !feature.is_set_valued() => {
                out.push_sql(&format!("json_extract(n.{col}, "));
                out.push_param(json_path(*position));
                out.push_sql(") IN ");
                out.push_list(values.iter().cloned());
            }
            _ => {
                out.push_sql("0");
            }
        },
        Predicate::SetIntersects {
            feature,
            position,
            values,
        } => {
            if *feature == Feature::Morph {
                out.push_sql("EXISTS (SELECT 1 FROM json_each(n.morph, ");
                out.push_param(json_path(*position));
                out.push_sql(") AS m WHERE m.value IN ");
                out.push_list(values.iter().cloned());
                out.push_sql(")");
            } else {
                out.push_sql("0");
            }
        }
        Predicate::LengthIn(lengths) => {
            out.push_sql("n.len IN ");
            out.push_list(lengths.iter().map(|&l| i64::from(l)));
        }
    }
}

fn join(parts: &[Predicate], separator: &str, empty: &str, out: &mut SqlFragment) {
    if parts.is_empty() {
        out.push_sql(empty);
        return;
    }
    out.push_sql("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_sql(separator);
        }
        render_into(part, out);
    }
    out.push_sql(")");
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use gramlens_core::filter::FilterModel;
    use gramlens_core::predicate::compile;
    use rusqlite::types::Value;

    use super::*;

    #[test]
    fn values_are_never_interpolated() {
        let model = FilterModel::new().toggle_value(0, Feature::Token, "it's'); DROP TABLE ngrams; --");
        let lengths: BTreeSet<u32> = [2].into_iter().collect();
        let frag = render_predicate(&compile(&model, &lengths, None));
        assert!(!frag.sql.contains("DROP"));
        assert!(frag
            .params
            .contains(&Value::Text("it's'); DROP TABLE ngrams; --".to_string())));
        assert_eq!(frag.sql.matches('?').count(), frag.params.len());
    }

    #[test]
    fn morph_renders_as_json_each_exists() {
        let model = FilterModel::new().toggle_value(1, Feature::Morph, "Case=Nom");
        let frag = render_predicate(&compile(&model, &BTreeSet::new(), None));
        assert!(frag.sql.contains("json_each(n.morph, ?)"));
        assert_eq!(frag.params[1], Value::Text("$[1]".to_string()));
    }

    #[test]
    fn trivial_predicate_renders_true() {
        let frag = render_predicate(&Predicate::Const(true));
        assert_eq!(frag.sql, "1");
        assert!(frag.params.is_empty());
    }
}
