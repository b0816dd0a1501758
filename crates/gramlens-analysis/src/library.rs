//! Named filter sets and block templates.

use gramlens_core::errors::GramlensResult;
use gramlens_core::filter::{BlockTemplate, FilterSet};
use gramlens_storage::queries::saved_filters::{self, Library};
use gramlens_storage::DatabaseManager;

pub fn save_filter_set(db: &DatabaseManager, name: &str, set: &FilterSet) -> GramlensResult<()> {
    let json = set.to_json()?;
    db.with_writer(|conn| saved_filters::save(conn, Library::FilterSets, name, &json))?;
    tracing::info!(name, "filter set saved");
    Ok(())
}

pub fn load_filter_set(db: &DatabaseManager, name: &str) -> GramlensResult<Option<FilterSet>> {
    let json = db.with_reader(|conn| saved_filters::load(conn, Library::FilterSets, name))?;
    Ok(json.map(|j| FilterSet::from_json(&j)).transpose()?)
}

pub fn filter_set_names(db: &DatabaseManager) -> GramlensResult<Vec<String>> {
    Ok(db.with_reader(|conn| saved_filters::names(conn, Library::FilterSets))?)
}

/// Returns whether a set of that name existed.
pub fn delete_filter_set(db: &DatabaseManager, name: &str) -> GramlensResult<bool> {
    Ok(db.with_writer(|conn| saved_filters::delete(conn, Library::FilterSets, name))?)
}

pub fn save_block_template(db: &DatabaseManager, name: &str, template: &BlockTemplate) -> GramlensResult<()> {
    let json = template.to_json()?;
    db.with_writer(|conn| saved_filters::save(conn, Library::Blocks, name, &json))?;
    tracing::info!(name, "block template saved");
    Ok(())
}

pub fn load_block_template(db: &DatabaseManager, name: &str) -> GramlensResult<Option<BlockTemplate>> {
    let json = db.with_reader(|conn| saved_filters::load(conn, Library::Blocks, name))?;
    Ok(json.map(|j| BlockTemplate::from_json(&j)).transpose()?)
}

pub fn block_template_names(db: &DatabaseManager) -> GramlensResult<Vec<String>> {
    Ok(db.with_reader(|conn| saved_filters::names(conn, Library::Blocks))?)
}

pub fn delete_block_template(db: &DatabaseManager, name: &str) -> GramlensResult<bool> {
    Ok(db.with_writer(|conn| saved_filters::delete(conn, Library::Blocks, name))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramlens_core::filter::FilterModel;
    use gramlens_core::types::Feature;

    #[test]
    fn filter_sets_round_trip_by_name() {
        let db = DatabaseManager::open_in_memory().unwrap();
        let model = FilterModel::new().toggle_value(1, Feature::Lemma, "run");
        let set = FilterSet::new([2, 3].into_iter().collect(), model);

        save_filter_set(&db, "verbs", &set).unwrap();
        assert_eq!(load_filter_set(&db, "verbs").unwrap(), Some(set));
        assert_eq!(filter_set_names(&db).unwrap(), vec!["verbs".to_string()]);
        assert!(delete_filter_set(&db, "verbs").unwrap());
        assert_eq!(load_filter_set(&db, "verbs").unwrap(), None);
    }

    #[test]
    fn block_templates_upsert_on_name() {
        let db = DatabaseManager::open_in_memory().unwrap();
        let first = BlockTemplate {
            position: 0,
            rules: Vec::new(),
        };
        let second = BlockTemplate {
            position: 2,
            rules: Vec::new(),
        };
        save_block_template(&db, "subject", &first).unwrap();
        save_block_template(&db, "subject", &second).unwrap();
        assert_eq!(load_block_template(&db, "subject").unwrap(), Some(second));
        assert_eq!(block_template_names(&db).unwrap().len(), 1);
        assert!(!delete_block_template(&db, "object").unwrap());
    }
}
