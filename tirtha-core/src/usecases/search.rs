use super::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub cities: Vec<City>,
    pub points: Vec<Point>,
    pub routes: Vec<Route>,
    pub events: Vec<Event>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.cities.len() + self.points.len() + self.routes.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Case-insensitive substring search in the names of all entities.
///
/// Every language is searched regardless of the active one.
pub async fn search(db: &dyn Backend, sink: &dyn DiagnosticsSink, text: &str) -> SearchResults {
    let text = text.trim();
    if text.is_empty() {
        return SearchResults::default();
    }
    let (cities, points, routes, events) = tokio::join!(
        load_all::<City>(db, sink, Select::table(tables::CITIES)),
        load_all::<Point>(db, sink, Select::table(tables::SPOTS)),
        load_all::<Route>(db, sink, Select::table(tables::ROUTES)),
        load_all::<Event>(db, sink, Select::table(tables::EVENTS)),
    );
    let matching = |name: &LocalizedText| name.contains_ignore_case(text);
    SearchResults {
        cities: cities.into_iter().filter(|e| matching(&e.name)).collect(),
        points: points.into_iter().filter(|e| matching(&e.name)).collect(),
        routes: routes.into_iter().filter(|e| matching(&e.name)).collect(),
        events: events.into_iter().filter(|e| matching(&e.name)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::tests::*;
    use serde_json::json;

    #[tokio::test]
    async fn search_all_languages() {
        let db = MockBackend::new()
            .with(
                tables::CITIES,
                vec![json!({ "id": "c", "name": { "en": "Varanasi", "ru": "Варанаси", "hi": "वाराणसी" } })],
            )
            .with(
                tables::SPOTS,
                vec![json!({ "id": 1, "name": { "en": "Manikarnika Ghat", "ru": "Маникарника", "hi": "मणिकर्णिका घाट" } })],
            )
            .with(
                tables::EVENTS,
                vec![json!({ "id": "e", "name": { "en": "Ganga Aarti", "ru": "Ганга Арати", "hi": "गंगा आरती" } })],
            );
        let sink = sink();
        assert_eq!(search(&db, &sink, "варан").await.cities.len(), 1);
        assert_eq!(search(&db, &sink, "GHAT").await.points.len(), 1);
        assert_eq!(search(&db, &sink, "आरती").await.events.len(), 1);
        assert!(search(&db, &sink, "kund").await.is_empty());
    }

    #[tokio::test]
    async fn blank_search_does_not_query() {
        let db = MockBackend::new();
        assert!(search(&db, &sink(), "  ").await.is_empty());
        assert_eq!(db.select_count(tables::CITIES), 0);
    }
}
